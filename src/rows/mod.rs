//! Row variants: how each kind of row is labelled, which affordances it
//! gets, where they go and how edits flow back into the bound value.

mod basic;
mod custom;
mod element;
mod picker;

pub use custom::CustomValueCommitted;

use std::sync::Arc;

use bevy::{ecs::world::CommandQueue, prelude::*};
use proptree_catalog::{CandidateType, CustomPropertyEdit};
use proptree_widgets::{ActionButton, Placement, Selector, TextField, TreeRow, TreeRowLabel};

use crate::{
    InspectorError,
    editor::PropertyEditor,
    settings::PropertyEditorSettings,
    token::{PropertyToken, RowKind},
};

/// State of one live row of a property editor.
#[derive(Component)]
pub struct PropertyRow {
    pub token: Arc<PropertyToken>,
    pub editor: Entity,
    pub affordances: Vec<Entity>,
    /// Label bounds from the last layout, in editor pixels.
    pub bounds: Rect,
    pub usable: bool,
    /// Label before a custom editor rewrote it.
    default_label: String,
    /// Text last written into the value field from the model.
    synced_text: Option<String>,
    candidates: Arc<[CandidateType]>,
}

/// Links an affordance to the row it edits.
#[derive(Component, Clone, Copy, Debug)]
pub struct AffordanceOf {
    pub row: Entity,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffordanceRole {
    Value,
    TypeSelector,
    Create,
    Insert,
    Erase,
    Custom,
}

/// The custom editor driving a row.
#[derive(Component)]
pub(crate) struct CustomEditSlot(pub(crate) Box<dyn CustomPropertyEdit>);

pub(crate) enum AffordanceSpec {
    Field { text: String, enabled: bool },
    Selector(Vec<String>),
    Button {
        label: &'static str,
        role: AffordanceRole,
    },
}

/// Everything needed to spawn a row, read from the bound value up front.
pub(crate) struct RowDraft {
    label: String,
    default_label: String,
    affordances: Vec<AffordanceSpec>,
    /// Used when the custom editor creates no affordances.
    fallback: Vec<AffordanceSpec>,
    custom: Option<Box<dyn CustomPropertyEdit>>,
    candidates: Arc<[CandidateType]>,
    synced_text: Option<String>,
}

impl RowDraft {
    fn new(label: String) -> Self {
        Self {
            default_label: label.clone(),
            label,
            affordances: Vec::new(),
            fallback: Vec::new(),
            custom: None,
            candidates: Arc::from([]),
            synced_text: None,
        }
    }
}

pub(crate) fn plugin(app: &mut App) {
    app.add_observer(basic::validate_field_text)
        .add_observer(basic::commit_field_text)
        .add_observer(picker::fill_slot)
        .add_observer(element::erase_element)
        .add_observer(custom::apply_custom_value);
}

fn draft_row(editor: &PropertyEditor, token: &PropertyToken) -> Result<RowDraft, InspectorError> {
    let value = editor.value(token.value_path())?;
    match token.kind {
        RowKind::Basic => Ok(basic::draft(token, value, editor.catalog())),
        RowKind::NullReference => Ok(picker::draft_create(token, editor.catalog())),
        RowKind::ListInserter => picker::draft_insert(token, value, editor.catalog()),
        RowKind::ListElement => Ok(element::draft(token, editor.catalog())),
        RowKind::CustomEdit | RowKind::CustomEditorBound => {
            Ok(custom::draft(token, value, editor.catalog()))
        }
    }
}

/// Spawn the row for `token` and its affordances. The row is not parented yet.
pub(crate) fn spawn_row(
    world: &mut World,
    editor: Entity,
    token: Arc<PropertyToken>,
) -> Result<Entity, InspectorError> {
    let (draft, overlay) = {
        let property_editor = world
            .get::<PropertyEditor>(editor)
            .ok_or(InspectorError::NotAnEditor(editor))?;
        (draft_row(property_editor, &token)?, property_editor.overlay())
    };
    let RowDraft {
        label,
        default_label,
        affordances: specs,
        fallback,
        custom,
        candidates,
        synced_text,
    } = draft;

    let row = world
        .spawn((
            TreeRow::default(),
            TreeRowLabel(label),
            Name::new(format!("Row {}", token.value_path())),
        ))
        .id();

    let mut affordances = Vec::new();
    let mut specs = specs;
    if let Some(mut custom) = custom {
        let mut queue = CommandQueue::default();
        affordances = custom.create_edit_affordances(&mut Commands::new(&mut queue, world));
        queue.apply(world);
        if affordances.is_empty() {
            specs = fallback;
        } else {
            for &affordance in &affordances {
                if let Ok(mut entity) = world.get_entity_mut(affordance) {
                    entity.insert((
                        AffordanceOf { row },
                        AffordanceRole::Custom,
                        Placement::default(),
                        ChildOf(overlay),
                    ));
                }
            }
        }
        world.entity_mut(row).insert(CustomEditSlot(custom));
    }

    for spec in specs {
        let (widget, role) = match spec {
            AffordanceSpec::Field { text, enabled } => {
                let field = if enabled {
                    TextField::new(text)
                } else {
                    TextField::read_only(text)
                };
                (world.spawn(field).id(), AffordanceRole::Value)
            }
            AffordanceSpec::Selector(options) => (
                world.spawn(Selector::new(options)).id(),
                AffordanceRole::TypeSelector,
            ),
            AffordanceSpec::Button { label, role } => {
                (world.spawn(ActionButton::new(label)).id(), role)
            }
        };
        world.entity_mut(widget).insert((
            AffordanceOf { row },
            role,
            Placement::default(),
            ChildOf(overlay),
        ));
        affordances.push(widget);
    }

    world.entity_mut(row).insert(PropertyRow {
        token,
        editor,
        affordances,
        bounds: Rect::default(),
        usable: false,
        default_label,
        synced_text,
        candidates,
    });
    Ok(row)
}

/// Bring a retained row up to date with the bound value.
pub(crate) fn refresh_row(world: &mut World, row: Entity) -> Result<(), InspectorError> {
    let Some(kind) = world.get::<PropertyRow>(row).map(|r| r.token.kind) else {
        return Ok(());
    };
    match kind {
        RowKind::Basic => basic::refresh(world, row),
        RowKind::CustomEdit | RowKind::CustomEditorBound => custom::refresh(world, row),
        _ => Ok(()),
    }
}

/// Geometry shared by every row during one layout pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RowGeometry {
    pub width: f32,
    pub label_column: f32,
}

/// Place and show the affordances of a usable row.
pub(crate) fn place_affordances(
    world: &mut World,
    row: Entity,
    geometry: RowGeometry,
    settings: &PropertyEditorSettings,
) {
    let Some((bounds, affordances, kind)) = world
        .get::<PropertyRow>(row)
        .map(|r| (r.bounds, r.affordances.clone(), r.token.kind))
    else {
        return;
    };
    let top = bounds.min.y + settings.vertical_inset;
    let height = settings.row_height;

    let mut queue = CommandQueue::default();
    if let Some(CustomEditSlot(custom)) = world.get::<CustomEditSlot>(row)
        && affordances
            .iter()
            .any(|&a| role_of(world, a) == Some(AffordanceRole::Custom))
    {
        let region = Rect::from_corners(
            Vec2::new(geometry.label_column, bounds.min.y),
            Vec2::new(geometry.width.max(geometry.label_column), bounds.min.y + height),
        );
        custom.position_edit_affordances(&affordances, region, &mut Commands::new(&mut queue, world));
    } else {
        let has_selector = affordances
            .iter()
            .any(|&a| role_of(world, a) == Some(AffordanceRole::TypeSelector));
        // Inserter rows have an empty label and start their picker at the row itself.
        let picker_left = match kind {
            RowKind::ListInserter => bounds.min.x,
            _ => geometry.label_column,
        };
        let selector_width =
            (geometry.width - picker_left - settings.selector_reserve).max(0.0);
        for &affordance in &affordances {
            let Some(role) = role_of(world, affordance) else {
                continue;
            };
            let (left, width) = match role {
                AffordanceRole::Value | AffordanceRole::Custom => (
                    geometry.label_column,
                    geometry.width - geometry.label_column,
                ),
                AffordanceRole::TypeSelector => (picker_left, selector_width),
                AffordanceRole::Create | AffordanceRole::Insert => {
                    let left = if has_selector {
                        picker_left + selector_width + settings.picker_gap
                    } else {
                        picker_left
                    };
                    (left, geometry.width - left)
                }
                AffordanceRole::Erase => (
                    geometry.width - settings.erase_button_width,
                    settings.erase_button_width,
                ),
            };
            if let Some(mut placement) = world.get_mut::<Placement>(affordance) {
                placement.place(Vec2::new(left, top), Vec2::new(width.max(0.0), height));
            }
        }
    }
    queue.apply(world);

    for affordance in affordances {
        if let Some(mut placement) = world.get_mut::<Placement>(affordance) {
            placement.show();
        }
    }
}

pub(crate) fn hide_affordances(world: &mut World, row: Entity) {
    let Some(property_row) = world.get::<PropertyRow>(row) else {
        return;
    };
    for affordance in property_row.affordances.clone() {
        if let Some(mut placement) = world.get_mut::<Placement>(affordance) {
            placement.hide();
        }
    }
}

fn role_of(world: &World, affordance: Entity) -> Option<AffordanceRole> {
    world.get::<AffordanceRole>(affordance).copied()
}

/// Resolve an affordance to its row, if it belongs to one with the given role.
fn row_of(
    affordance: Entity,
    role: AffordanceRole,
    affordances: &Query<(&AffordanceOf, &AffordanceRole)>,
) -> Option<Entity> {
    affordances
        .get(affordance)
        .ok()
        .filter(|(_, r)| **r == role)
        .map(|(of, _)| of.row)
}
