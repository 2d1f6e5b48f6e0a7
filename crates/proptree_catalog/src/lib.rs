//! Candidate-type discovery and custom editor bindings for the property tree.
//!
//! The catalog answers one question for the inspector: "which concrete,
//! default-constructible values could fill a slot of this type?". Answers are
//! cached per target type until [`TypeCatalog::clear_cache`] is called.

mod custom_edit;
mod shape;

pub use custom_edit::{CustomPropertyEdit, EditorFactory, ReflectCustomPropertyEdit};
pub use shape::{TypeShape, is_text_editable, is_unit_only_enum, option_payload};

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bevy::{
    ecs::reflect::AppTypeRegistry,
    prelude::*,
    reflect::{
        DynamicEnum, DynamicList, DynamicStruct, DynamicTuple, DynamicVariant, ReflectFromReflect, TypeInfo,
        TypeRegistry, VariantInfo,
    },
};
use custom_edit::EditorBindings;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("type {0:?} is not registered")]
    Unregistered(TypeId),
    #[error("`{0}` has no default constructor")]
    NotConstructible(String),
    #[error("`{type_path}` has no variant `{variant}`")]
    UnknownVariant {
        type_path: &'static str,
        variant: String,
    },
}

/// A concrete value that can be created for a slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CandidateType {
    /// Name shown in type pickers.
    pub name: String,
    /// The type of the value that gets constructed.
    pub type_id: TypeId,
    /// For enum-typed slots, the variant that gets constructed.
    pub variant: Option<&'static str>,
}

struct CatalogInner {
    registry: AppTypeRegistry,
    cache: RwLock<HashMap<TypeId, Arc<[CandidateType]>>>,
    editors: RwLock<EditorBindings>,
}

/// Shared handle to the candidate cache and the custom editor table.
///
/// Cloning is cheap and shares state; build a second catalog with
/// [`TypeCatalog::new`] for an independent one.
#[derive(Resource, Clone)]
pub struct TypeCatalog(Arc<CatalogInner>);

impl TypeCatalog {
    pub fn new(registry: AppTypeRegistry) -> Self {
        Self(Arc::new(CatalogInner {
            registry,
            cache: RwLock::default(),
            editors: RwLock::default(),
        }))
    }

    pub fn registry(&self) -> &AppTypeRegistry {
        &self.0.registry
    }

    /// True when both handles point at the same catalog state.
    pub fn shares_state_with(&self, other: &TypeCatalog) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Candidate types for a slot of type `target`, computed once per type.
    pub fn candidates(&self, target: TypeId) -> Arc<[CandidateType]> {
        if let Some(cached) = self
            .0
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
        {
            return cached.clone();
        }

        let discovered: Arc<[CandidateType]> = {
            let registry = self.0.registry.read();
            discover_candidates(target, &registry).into()
        };
        debug!(
            "Discovered {} candidate type(s) for {target:?}",
            discovered.len()
        );

        // Racing populations compute the same list, so last write wins.
        self.0
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target, discovered.clone());
        discovered
    }

    pub fn clear_cache(&self) {
        self.0
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Build a fresh value for `candidate`.
    pub fn instantiate(
        &self,
        candidate: &CandidateType,
    ) -> Result<Box<dyn PartialReflect>, CatalogError> {
        let registry = self.0.registry.read();
        match candidate.variant {
            Some(variant) => instantiate_variant(candidate.type_id, variant, &registry),
            None => instantiate_default(candidate.type_id, &registry),
        }
    }

    /// Bind an external editor to values of exactly type `T`.
    pub fn add_custom_editor<T: 'static, E: CustomPropertyEdit + Default>(&self) {
        self.add_custom_editor_with(TypeId::of::<T>(), || Box::new(E::default()));
    }

    pub fn add_custom_editor_with(
        &self,
        type_id: TypeId,
        factory: impl Fn() -> Box<dyn CustomPropertyEdit> + Send + Sync + 'static,
    ) {
        self.0
            .editors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_id, Arc::new(factory));
    }

    pub fn has_custom_editor(&self, type_id: TypeId) -> bool {
        self.0
            .editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(type_id)
    }

    /// A new instance of the editor bound to `type_id`, if any.
    pub fn create_custom_editor(&self, type_id: TypeId) -> Option<Box<dyn CustomPropertyEdit>> {
        self.0
            .editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .create(type_id)
    }
}

fn discover_candidates(target: TypeId, registry: &TypeRegistry) -> Vec<CandidateType> {
    let Some(mut info) = registry.get_type_info(target) else {
        return Vec::new();
    };
    if let Some(inner) = option_payload(info) {
        let Some(inner_info) = registry.get_type_info(inner) else {
            return Vec::new();
        };
        info = inner_info;
    }

    let shape = TypeShape::of(info, registry);
    match (shape, info) {
        (TypeShape::Leaf { .. }, _) => vec![self_candidate(info)],
        (TypeShape::Expandable, TypeInfo::Enum(enum_info)) => enum_info
            .iter()
            .filter(|variant| variant_is_constructible(variant, registry))
            .map(|variant| CandidateType {
                name: variant.name().to_string(),
                type_id: info.type_id(),
                variant: Some(variant.name()),
            })
            .collect(),
        (TypeShape::List { .. }, _)
            if registry
                .get_type_data::<ReflectFromReflect>(info.type_id())
                .is_some() =>
        {
            vec![self_candidate(info)]
        }
        _ => {
            if has_default(info.type_id(), registry) {
                vec![self_candidate(info)]
            } else {
                Vec::new()
            }
        }
    }
}

fn self_candidate(info: &TypeInfo) -> CandidateType {
    CandidateType {
        name: info.type_path_table().short_path().to_string(),
        type_id: info.type_id(),
        variant: None,
    }
}

fn has_default(type_id: TypeId, registry: &TypeRegistry) -> bool {
    type_id == TypeId::of::<String>()
        || registry.get_type_data::<ReflectDefault>(type_id).is_some()
}

fn variant_is_constructible(variant: &VariantInfo, registry: &TypeRegistry) -> bool {
    match variant {
        VariantInfo::Unit(_) => true,
        VariantInfo::Tuple(tuple) => (0..tuple.field_len()).all(|i| {
            tuple
                .field_at(i)
                .is_some_and(|field| has_default(field.type_id(), registry))
        }),
        VariantInfo::Struct(fields) => (0..fields.field_len()).all(|i| {
            fields
                .field_at(i)
                .is_some_and(|field| has_default(field.type_id(), registry))
        }),
    }
}

fn default_value(
    type_id: TypeId,
    registry: &TypeRegistry,
) -> Result<Box<dyn PartialReflect>, CatalogError> {
    if type_id == TypeId::of::<String>() {
        return Ok(Box::new(String::new()));
    }
    let Some(registration) = registry.get(type_id) else {
        return Err(CatalogError::Unregistered(type_id));
    };
    match registration.data::<ReflectDefault>() {
        Some(reflect_default) => Ok(reflect_default.default().into_partial_reflect()),
        None => Err(CatalogError::NotConstructible(
            registration.type_info().type_path().to_string(),
        )),
    }
}

fn instantiate_default(
    type_id: TypeId,
    registry: &TypeRegistry,
) -> Result<Box<dyn PartialReflect>, CatalogError> {
    match default_value(type_id, registry) {
        Ok(value) => Ok(value),
        Err(err) => {
            let Some(info) = registry.get_type_info(type_id) else {
                return Err(err);
            };
            match info {
                TypeInfo::List(_) => empty_list(info, registry),
                // Unit-only enums without `Default` start at their first variant.
                TypeInfo::Enum(enum_info) => match enum_info.variant_at(0) {
                    Some(first) if is_unit_only_enum(info) => {
                        instantiate_variant(type_id, first.name(), registry)
                    }
                    _ => Err(err),
                },
                _ => Err(err),
            }
        }
    }
}

/// Lists carry no `ReflectDefault`, so they are built empty and converted.
fn empty_list(
    info: &'static TypeInfo,
    registry: &TypeRegistry,
) -> Result<Box<dyn PartialReflect>, CatalogError> {
    let mut list = DynamicList::default();
    list.set_represented_type(Some(info));
    registry
        .get_type_data::<ReflectFromReflect>(info.type_id())
        .and_then(|from_reflect| from_reflect.from_reflect(&list))
        .map(|concrete| concrete.into_partial_reflect())
        .ok_or_else(|| CatalogError::NotConstructible(info.type_path().to_string()))
}

fn instantiate_variant(
    type_id: TypeId,
    variant: &str,
    registry: &TypeRegistry,
) -> Result<Box<dyn PartialReflect>, CatalogError> {
    let Some(info) = registry.get_type_info(type_id) else {
        return Err(CatalogError::Unregistered(type_id));
    };
    let TypeInfo::Enum(enum_info) = info else {
        return Err(CatalogError::UnknownVariant {
            type_path: info.type_path(),
            variant: variant.to_string(),
        });
    };
    let Some(variant_info) = enum_info.variant(variant) else {
        return Err(CatalogError::UnknownVariant {
            type_path: info.type_path(),
            variant: variant.to_string(),
        });
    };

    let dynamic_variant = match variant_info {
        VariantInfo::Unit(_) => DynamicVariant::Unit,
        VariantInfo::Tuple(tuple_info) => {
            let mut tuple = DynamicTuple::default();
            for i in 0..tuple_info.field_len() {
                if let Some(field) = tuple_info.field_at(i) {
                    tuple.insert_boxed(default_value(field.type_id(), registry)?);
                }
            }
            DynamicVariant::Tuple(tuple)
        }
        VariantInfo::Struct(struct_info) => {
            let mut fields = DynamicStruct::default();
            for i in 0..struct_info.field_len() {
                if let Some(field) = struct_info.field_at(i) {
                    fields.insert_boxed(field.name(), default_value(field.type_id(), registry)?);
                }
            }
            DynamicVariant::Struct(fields)
        }
    };

    let mut value = DynamicEnum::new(variant, dynamic_variant);
    value.set_represented_type(Some(info));

    // Prefer a concrete value so list pushes and `Option` fills accept it.
    match registry.get_type_data::<ReflectFromReflect>(type_id) {
        Some(from_reflect) => from_reflect
            .from_reflect(&value)
            .map(|concrete| concrete.into_partial_reflect())
            .ok_or_else(|| CatalogError::NotConstructible(info.type_path().to_string())),
        None => Ok(Box::new(value)),
    }
}
