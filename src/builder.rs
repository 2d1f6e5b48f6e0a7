//! Depth-first walk of the bound value producing one token per visible row.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use bevy::{
    prelude::*,
    reflect::{ReflectRef, TypeInfo, TypeRegistry, VariantInfo, VariantType},
};
use proptree_catalog::{ReflectCustomPropertyEdit, TypeCatalog, TypeShape};

use crate::{
    token::{ObjectId, PropertyKey, PropertyToken, ReadOnly, RootId, RowKind, RuntimeType, field_path},
    value::is_none_option,
};

pub(crate) struct BuildContext<'a> {
    pub registry: &'a TypeRegistry,
    pub catalog: &'a TypeCatalog,
    pub root: RootId,
    pub max_depth: usize,
}

/// Tokens for every row of `root`, parents before children, siblings in
/// declaration order, list elements in list order followed by the inserter.
pub(crate) fn build_tokens(root: &dyn PartialReflect, cx: &BuildContext) -> Vec<Arc<PropertyToken>> {
    let mut walker = TokenWalker {
        cx,
        ancestors: HashSet::new(),
        tokens: Vec::new(),
    };
    walker.visit_object(root, String::new(), None, 0);
    walker.tokens
}

struct Property<'v> {
    name: String,
    value: &'v dyn PartialReflect,
    writable: bool,
}

struct TokenWalker<'a, 'c> {
    cx: &'c BuildContext<'a>,
    /// Objects on the path from the root to the one being visited.
    ancestors: HashSet<(usize, TypeId)>,
    tokens: Vec<Arc<PropertyToken>>,
}

impl TokenWalker<'_, '_> {
    fn visit_object(
        &mut self,
        value: &dyn PartialReflect,
        path: String,
        parent: Option<&Arc<PropertyToken>>,
        depth: usize,
    ) {
        let (value, path) = see_through(value, path);
        let Some(info) = value.get_represented_type_info() else {
            return;
        };
        if depth > self.cx.max_depth {
            debug!("Not descending into `{path}`: deeper than {}", self.cx.max_depth);
            return;
        }
        // Only the ancestors are tracked: zero-sized siblings share an address.
        let key = (value as *const dyn PartialReflect as *const () as usize, info.type_id());
        if !self.ancestors.insert(key) {
            debug!("Not descending into `{path}`: it contains itself");
            return;
        }

        for property in properties(value, info) {
            self.visit_property(&path, info.type_id(), property, parent, depth);
        }
        self.ancestors.remove(&key);
    }

    fn visit_property(
        &mut self,
        owner_path: &str,
        owner_type: TypeId,
        property: Property,
        parent: Option<&Arc<PropertyToken>>,
        depth: usize,
    ) {
        let Some(declared) = property.value.get_represented_type_info() else {
            return;
        };
        let shape = TypeShape::of(declared, self.cx.registry);
        let kind = self.classify(declared.type_id(), shape, property.value);
        let path = field_path(owner_path, &property.name);

        let token = Arc::new(PropertyToken::property(
            PropertyKey {
                owner_type,
                name: property.name,
                declared: declared.type_id(),
                declared_path: declared.type_path(),
                writable: property.writable,
            },
            ObjectId {
                root: self.cx.root,
                path: owner_path.to_string(),
            },
            parent.cloned(),
            kind,
            path.clone(),
        ));
        self.tokens.push(token.clone());

        match shape {
            TypeShape::List { .. } => self.visit_list(property.value, &path, &token, depth),
            TypeShape::Nullable { .. } => {
                if let ReflectRef::Enum(option) = property.value.reflect_ref()
                    && let Some(inner) = option.field_at(0)
                {
                    let inner_path = format!("{path}.0");
                    if matches!(inner.reflect_ref(), ReflectRef::List(_)) {
                        self.visit_list(inner, &inner_path, &token, depth);
                    } else {
                        self.visit_object(inner, inner_path, Some(&token), depth + 1);
                    }
                }
            }
            TypeShape::Expandable => {
                self.visit_object(property.value, path, Some(&token), depth + 1);
            }
            TypeShape::Leaf { .. } => {}
        }
    }

    fn visit_list(
        &mut self,
        value: &dyn PartialReflect,
        list_path: &str,
        token: &Arc<PropertyToken>,
        depth: usize,
    ) {
        let ReflectRef::List(list) = value.reflect_ref() else {
            return;
        };
        for (index, element) in list.iter().enumerate() {
            let element_token = Arc::new(PropertyToken::element(
                token,
                list_path,
                index,
                runtime_type(element),
            ));
            self.tokens.push(element_token.clone());
            self.visit_object(
                element,
                element_token.value_path().to_string(),
                Some(&element_token),
                depth + 1,
            );
        }
        self.tokens
            .push(Arc::new(PropertyToken::inserter(token, list_path)));
    }

    fn classify(&self, declared: TypeId, shape: TypeShape, value: &dyn PartialReflect) -> RowKind {
        if matches!(shape, TypeShape::Nullable { .. }) && is_none_option(value) {
            RowKind::NullReference
        } else if self
            .cx
            .registry
            .get_type_data::<ReflectCustomPropertyEdit>(declared)
            .is_some()
        {
            RowKind::CustomEdit
        } else if self.cx.catalog.has_custom_editor(declared) {
            RowKind::CustomEditorBound
        } else {
            RowKind::Basic
        }
    }
}

/// Skip over `Some(..)` and newtype variants to the value they carry.
fn see_through(mut value: &dyn PartialReflect, mut path: String) -> (&dyn PartialReflect, String) {
    while let ReflectRef::Enum(enum_ref) = value.reflect_ref()
        && enum_ref.variant_type() == VariantType::Tuple
        && enum_ref.field_len() == 1
        && let Some(inner) = enum_ref.field_at(0)
    {
        value = inner;
        path.push_str(".0");
    }
    (value, path)
}

pub(crate) fn runtime_type(value: &dyn PartialReflect) -> RuntimeType {
    let type_id = value
        .get_represented_type_info()
        .map(TypeInfo::type_id)
        .unwrap_or(TypeId::of::<()>());
    let variant = match value.reflect_ref() {
        ReflectRef::Enum(enum_ref) => Some(enum_ref.variant_index()),
        _ => None,
    };
    RuntimeType { type_id, variant }
}

fn properties<'v>(value: &'v dyn PartialReflect, info: &TypeInfo) -> Vec<Property<'v>> {
    let mut properties = Vec::new();
    match value.reflect_ref() {
        ReflectRef::Struct(s) => {
            let struct_info = info.as_struct().ok();
            for i in 0..s.field_len() {
                let (Some(name), Some(field)) = (s.name_at(i), s.field_at(i)) else {
                    continue;
                };
                let writable = struct_info
                    .and_then(|info| info.field(name))
                    .is_none_or(|field| !field.has_attribute::<ReadOnly>());
                properties.push(Property {
                    name: name.to_string(),
                    value: field,
                    writable,
                });
            }
        }
        ReflectRef::TupleStruct(s) => {
            let tuple_info = info.as_tuple_struct().ok();
            for i in 0..s.field_len() {
                let Some(field) = s.field(i) else {
                    continue;
                };
                let writable = tuple_info
                    .and_then(|info| info.field_at(i))
                    .is_none_or(|field| !field.has_attribute::<ReadOnly>());
                properties.push(Property {
                    name: i.to_string(),
                    value: field,
                    writable,
                });
            }
        }
        ReflectRef::Tuple(t) => {
            for i in 0..t.field_len() {
                if let Some(field) = t.field(i) {
                    properties.push(Property {
                        name: i.to_string(),
                        value: field,
                        writable: true,
                    });
                }
            }
        }
        ReflectRef::Enum(e) => {
            let variant_info = info
                .as_enum()
                .ok()
                .and_then(|info| info.variant(e.variant_name()));
            for i in 0..e.field_len() {
                let Some(field) = e.field_at(i) else {
                    continue;
                };
                let (name, read_only) = match variant_info {
                    Some(VariantInfo::Struct(variant)) => {
                        let name = e.name_at(i).unwrap_or_default();
                        let read_only = variant
                            .field(name)
                            .is_some_and(|field| field.has_attribute::<ReadOnly>());
                        (name.to_string(), read_only)
                    }
                    Some(VariantInfo::Tuple(variant)) => {
                        let read_only = variant
                            .field_at(i)
                            .is_some_and(|field| field.has_attribute::<ReadOnly>());
                        (i.to_string(), read_only)
                    }
                    _ => (e.name_at(i).map_or_else(|| i.to_string(), str::to_string), false),
                };
                properties.push(Property {
                    name,
                    value: field,
                    writable: !read_only,
                });
            }
        }
        _ => {}
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::RowSlot;
    use bevy::ecs::reflect::AppTypeRegistry;

    #[derive(Reflect, Default)]
    #[reflect(Default)]
    struct Circle {
        radius: f32,
    }

    #[derive(Reflect, Default)]
    #[reflect(Default)]
    struct Square {
        side: f32,
    }

    #[derive(Reflect)]
    enum Shape {
        Circle(Circle),
        Square(Square),
    }

    #[derive(Reflect, Default)]
    #[reflect(Default)]
    struct Engine {
        cylinders: u32,
    }

    #[derive(Reflect, Default)]
    struct Car {
        name: String,
        #[reflect(@ReadOnly)]
        serial: u64,
        engine: Option<Engine>,
        shapes: Vec<Shape>,
        #[reflect(ignore)]
        #[allow(dead_code)]
        scratch: u8,
    }

    fn registry() -> AppTypeRegistry {
        let registry = AppTypeRegistry::default();
        registry.write().register::<Car>();
        registry
    }

    fn build(car: &Car, max_depth: usize) -> Vec<Arc<PropertyToken>> {
        build_with(registry(), car, max_depth)
    }

    fn build_with(
        registry: AppTypeRegistry,
        root: &dyn PartialReflect,
        max_depth: usize,
    ) -> Vec<Arc<PropertyToken>> {
        let catalog = TypeCatalog::new(registry.clone());
        let registry = registry.read();
        build_tokens(
            root,
            &BuildContext {
                registry: &registry,
                catalog: &catalog,
                root: RootId(1),
                max_depth,
            },
        )
    }

    fn describe(tokens: &[Arc<PropertyToken>]) -> Vec<(String, RowKind, usize)> {
        tokens
            .iter()
            .map(|t| (t.value_path().to_string(), t.kind, t.depth()))
            .collect()
    }

    #[test]
    fn walks_properties_in_declaration_order() {
        let tokens = build(&Car::default(), 8);
        assert_eq!(
            describe(&tokens),
            vec![
                (".name".to_string(), RowKind::Basic, 0),
                (".serial".to_string(), RowKind::Basic, 0),
                (".engine".to_string(), RowKind::NullReference, 0),
                (".shapes".to_string(), RowKind::Basic, 0),
                (".shapes".to_string(), RowKind::ListInserter, 1),
            ]
        );
        assert!(tokens[0].property.writable);
        assert!(!tokens[1].property.writable);
    }

    #[test]
    fn filled_options_and_variants_are_transparent() {
        let car = Car {
            engine: Some(Engine { cylinders: 8 }),
            shapes: vec![Shape::Square(Square { side: 2.0 })],
            ..default()
        };
        let tokens = build(&car, 8);
        let paths: Vec<_> = tokens.iter().map(|t| t.value_path()).collect();
        assert_eq!(
            paths,
            [
                ".name",
                ".serial",
                ".engine",
                ".engine.0.cylinders",
                ".shapes",
                ".shapes[0]",
                ".shapes[0].0.side",
                ".shapes",
            ]
        );
        assert_eq!(tokens[2].kind, RowKind::Basic);
        assert_eq!(tokens[5].slot, RowSlot::Element(0));
        assert_eq!(
            tokens[5].element_type,
            Some(RuntimeType {
                type_id: TypeId::of::<Shape>(),
                variant: Some(1),
            })
        );
        assert_eq!(tokens[6].owner.path, ".shapes[0].0");
        assert_eq!(tokens[7].slot, RowSlot::Inserter);
    }

    #[test]
    fn depth_limit_keeps_the_row_but_stops_recursion() {
        let car = Car {
            engine: Some(Engine::default()),
            ..default()
        };
        let tokens = build(&car, 0);
        assert!(tokens.iter().any(|t| t.value_path() == ".engine"));
        assert!(!tokens.iter().any(|t| t.value_path() == ".engine.0.cylinders"));
    }

    #[test]
    fn rebuilding_yields_equal_tokens() {
        let car = Car {
            shapes: vec![Shape::Circle(Circle::default())],
            ..default()
        };
        assert_eq!(build(&car, 8), build(&car, 8));
    }

    #[derive(Reflect, Default)]
    enum Only {
        #[default]
        Only,
    }

    #[derive(Reflect, Default)]
    struct Tag {
        mode: Only,
    }

    #[derive(Reflect, Default)]
    struct Tags {
        tags: Vec<Tag>,
    }

    #[test]
    fn zero_sized_siblings_are_all_walked() {
        let registry = AppTypeRegistry::default();
        registry.write().register::<Tags>();
        let tags = Tags {
            tags: vec![Tag::default(), Tag::default()],
        };
        let tokens = build_with(registry, &tags, 8);
        let paths: Vec<_> = tokens.iter().map(|t| t.value_path()).collect();
        assert_eq!(
            paths,
            [
                ".tags",
                ".tags[0]",
                ".tags[0].mode",
                ".tags[1]",
                ".tags[1].mode",
                ".tags",
            ]
        );
    }
}
