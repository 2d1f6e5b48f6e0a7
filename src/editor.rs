use std::collections::HashMap;
use std::sync::Arc;

use bevy::{ecs::reflect::AppTypeRegistry, prelude::*};
use proptree_catalog::TypeCatalog;
use proptree_widgets::TreeView;

use crate::{
    InspectorError,
    sync::{SyncReport, resynchronize},
    token::{PropertyToken, RootId},
    value::{value_at, value_at_mut},
};

/// Size of the area an editor draws into.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    /// The editor never gets shorter than this.
    pub nominal_height: f32,
    /// Height needed for every usable row, at least `nominal_height`.
    pub content_height: f32,
    /// Left edge of the affordance column.
    pub label_column: f32,
}

pub struct PropertyEditorConfig {
    pub width: f32,
    pub nominal_height: f32,
    /// Catalog to use instead of the app-wide one.
    pub catalog: Option<TypeCatalog>,
}

impl Default for PropertyEditorConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            nominal_height: 240.0,
            catalog: None,
        }
    }
}

/// A property tree bound to an owned reflected value.
#[derive(Component)]
pub struct PropertyEditor {
    root: Option<Box<dyn Reflect>>,
    root_id: RootId,
    pub(crate) rows: HashMap<Arc<PropertyToken>, Entity>,
    pub(crate) usable: Vec<Entity>,
    pub(crate) viewport: Viewport,
    catalog: TypeCatalog,
    tree: Entity,
    overlay: Entity,
}

impl PropertyEditor {
    pub fn root(&self) -> Option<&dyn Reflect> {
        self.root.as_deref()
    }

    /// Mutable access for the host. Call [`mark_dirty`] afterwards.
    pub fn root_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.root.as_deref_mut()
    }

    pub fn root_id(&self) -> RootId {
        self.root_id
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Container the top-level rows are parented to.
    pub fn tree(&self) -> Entity {
        self.tree
    }

    /// Container the affordances are parented to.
    pub fn overlay(&self) -> Entity {
        self.overlay
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Rows whose ancestors are all expanded, top to bottom.
    pub fn usable_rows(&self) -> &[Entity] {
        &self.usable
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_for(&self, token: &PropertyToken) -> Option<Entity> {
        self.rows.get(token).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&PropertyToken, Entity)> {
        self.rows.iter().map(|(token, &row)| (token.as_ref(), row))
    }

    pub(crate) fn value(&self, path: &str) -> Result<&dyn PartialReflect, InspectorError> {
        let root = self.root.as_deref().ok_or(InspectorError::NoRoot)?;
        value_at(root.as_partial_reflect(), path)
    }

    pub(crate) fn value_mut(&mut self, path: &str) -> Result<&mut dyn PartialReflect, InspectorError> {
        let root = self.root.as_deref_mut().ok_or(InspectorError::NoRoot)?;
        value_at_mut(root.as_partial_reflect_mut(), path)
    }
}

/// The editor resynchronizes in the next `PreUpdate`.
#[derive(Component, Default)]
pub struct RebuildPending;

/// Parent of every affordance of one editor.
#[derive(Component, Default)]
pub struct AffordanceOverlay;

pub fn spawn_property_editor(world: &mut World, config: PropertyEditorConfig) -> Entity {
    let catalog = match config.catalog {
        Some(catalog) => catalog,
        None => match world.get_resource::<TypeCatalog>() {
            Some(catalog) => catalog.clone(),
            None => TypeCatalog::new(world.get_resource_or_init::<AppTypeRegistry>().clone()),
        },
    };

    let editor = world
        .spawn((
            Name::new("Property Editor"),
            Node {
                position_type: PositionType::Relative,
                width: px(config.width),
                min_height: px(config.nominal_height),
                ..default()
            },
        ))
        .id();
    let tree = world.spawn((TreeView, ChildOf(editor))).id();
    // Affordance placements are relative to the editor's top-left corner.
    let overlay = world
        .spawn((
            AffordanceOverlay,
            Node {
                position_type: PositionType::Absolute,
                left: px(0),
                top: px(0),
                width: percent(100),
                height: percent(100),
                ..default()
            },
            ChildOf(editor),
        ))
        .id();
    world.entity_mut(editor).insert(PropertyEditor {
        root: None,
        root_id: RootId::default(),
        rows: HashMap::new(),
        usable: Vec::new(),
        viewport: Viewport {
            width: config.width,
            nominal_height: config.nominal_height,
            content_height: config.nominal_height,
            label_column: 0.0,
        },
        catalog,
        tree,
        overlay,
    });
    editor
}

/// Bind `root` to `editor` and resynchronize immediately.
///
/// Every row of the previous root is replaced, even when the new value is equal.
pub fn set_root<T: Reflect>(
    world: &mut World,
    editor: Entity,
    root: T,
) -> Result<SyncReport, InspectorError> {
    set_root_boxed(world, editor, Box::new(root))
}

pub fn set_root_boxed(
    world: &mut World,
    editor: Entity,
    root: Box<dyn Reflect>,
) -> Result<SyncReport, InspectorError> {
    rebind(world, editor, Some(root))?;
    resynchronize(world, editor)
}

/// Unbind the editor's root, removing every row.
pub fn clear_root(world: &mut World, editor: Entity) -> Result<SyncReport, InspectorError> {
    rebind(world, editor, None)?;
    resynchronize(world, editor)
}

fn rebind(
    world: &mut World,
    editor: Entity,
    root: Option<Box<dyn Reflect>>,
) -> Result<(), InspectorError> {
    let mut property_editor = world
        .get_mut::<PropertyEditor>(editor)
        .ok_or(InspectorError::NotAnEditor(editor))?;
    property_editor.root = root;
    property_editor.root_id = RootId(property_editor.root_id.0 + 1);
    Ok(())
}

/// Request a resynchronization of `editor` at the start of the next frame.
pub fn mark_dirty(commands: &mut Commands, editor: Entity) {
    if let Ok(mut entity) = commands.get_entity(editor) {
        entity.insert(RebuildPending);
    }
}

pub(crate) fn rebuild_dirty_editors(
    world: &mut World,
    dirty: &mut QueryState<Entity, With<RebuildPending>>,
) -> Result<(), BevyError> {
    let editors: Vec<Entity> = dirty.iter(world).collect();
    for editor in editors {
        world.entity_mut(editor).remove::<RebuildPending>();
        let report = resynchronize(world, editor).inspect_err(|err| {
            error!("Resynchronizing {editor} failed: {err}");
        })?;
        debug!("Rebuilt {editor}: {report:?}");
    }
    Ok(())
}
