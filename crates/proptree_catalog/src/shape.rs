use std::any::TypeId;

use bevy::reflect::{TypeInfo, TypeRegistry, VariantInfo};

/// How the traversal treats a declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeShape {
    /// Ordered, indexable, growable collection over a single item type.
    List { item: TypeId },
    /// `Option<T>` wrapping something expandable or list-like.
    Nullable { inner: TypeId },
    /// Reference-like compound value that is recursed into.
    Expandable,
    /// Leaf value. `editable` leaves get a text field.
    Leaf { editable: bool },
}

impl TypeShape {
    pub fn of(info: &TypeInfo, registry: &TypeRegistry) -> Self {
        match info {
            TypeInfo::List(list) => TypeShape::List {
                item: list.item_ty().id(),
            },
            TypeInfo::Struct(_) | TypeInfo::TupleStruct(_) | TypeInfo::Tuple(_) => {
                TypeShape::Expandable
            }
            TypeInfo::Enum(_) => {
                if let Some(inner) = option_payload(info) {
                    let inner_shape = registry
                        .get_type_info(inner)
                        .map(|inner_info| TypeShape::of(inner_info, registry));
                    return match inner_shape {
                        Some(TypeShape::Expandable | TypeShape::List { .. }) => {
                            TypeShape::Nullable { inner }
                        }
                        _ => TypeShape::Leaf { editable: false },
                    };
                }
                if is_unit_only_enum(info) {
                    TypeShape::Leaf { editable: true }
                } else {
                    TypeShape::Expandable
                }
            }
            TypeInfo::Opaque(_) => TypeShape::Leaf {
                editable: is_text_editable(info.type_id()),
            },
            _ => TypeShape::Leaf { editable: false },
        }
    }

    /// Looks the type up in the registry first. Unregistered types are opaque.
    pub fn of_type(type_id: TypeId, registry: &TypeRegistry) -> Self {
        registry
            .get_type_info(type_id)
            .map(|info| TypeShape::of(info, registry))
            .unwrap_or(TypeShape::Leaf {
                editable: is_text_editable(type_id),
            })
    }
}

/// Primitive types that round-trip through their textual form.
pub fn is_text_editable(type_id: TypeId) -> bool {
    [
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<usize>(),
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<String>(),
    ]
    .contains(&type_id)
}

/// `Some(T)` payload type when `info` describes an `Option<T>`.
pub fn option_payload(info: &TypeInfo) -> Option<TypeId> {
    let TypeInfo::Enum(enum_info) = info else {
        return None;
    };
    if !info.type_path().starts_with("core::option::Option<") {
        return None;
    }
    match enum_info.variant("Some")? {
        VariantInfo::Tuple(tuple) => tuple.field_at(0).map(|field| field.type_id()),
        _ => None,
    }
}

pub fn is_unit_only_enum(info: &TypeInfo) -> bool {
    let TypeInfo::Enum(enum_info) = info else {
        return false;
    };
    enum_info
        .iter()
        .all(|variant| matches!(variant, VariantInfo::Unit(_)))
}
