//! Rows handed over to a [`CustomPropertyEdit`] implementation.

use bevy::{prelude::*, reflect::ReflectFromReflect};
use proptree_catalog::{CustomPropertyEdit, ReflectCustomPropertyEdit, TypeCatalog};
use proptree_widgets::TreeRowLabel;

use super::{AffordanceOf, CustomEditSlot, PropertyRow, RowDraft, basic};
use crate::{
    InspectorError,
    editor::{PropertyEditor, mark_dirty},
    token::{PropertyToken, RowKind},
    value::format_value,
};

/// Sent by a custom editor's affordance to store a new property value.
#[derive(EntityEvent)]
pub struct CustomValueCommitted {
    pub entity: Entity,
    pub value: Box<dyn PartialReflect>,
}

pub(super) fn draft(
    token: &PropertyToken,
    value: &dyn PartialReflect,
    catalog: &TypeCatalog,
) -> RowDraft {
    let mut draft = RowDraft::new(token.property.name.clone());
    draft.fallback = basic::field_spec(token, value, catalog);
    if !draft.fallback.is_empty() {
        draft.synced_text = Some(format_value(value));
    }
    match create_editor(token, value, catalog) {
        Some(mut editor) => {
            editor.bind_target(value);
            draft.label = editor.edit_node_text(&draft.default_label);
            draft.custom = Some(editor);
        }
        None => {
            warn!("No custom editor could be created for `{}`", token.value_path());
            draft.affordances = std::mem::take(&mut draft.fallback);
        }
    }
    draft
}

fn create_editor(
    token: &PropertyToken,
    value: &dyn PartialReflect,
    catalog: &TypeCatalog,
) -> Option<Box<dyn CustomPropertyEdit>> {
    let declared = token.property.declared;
    if token.kind != RowKind::CustomEdit {
        return catalog.create_custom_editor(declared);
    }
    let registry = catalog.registry().read();
    let reflect_edit = registry.get_type_data::<ReflectCustomPropertyEdit>(declared)?;
    let owned = match value.reflect_clone() {
        Ok(owned) => owned,
        Err(_) => registry
            .get_type_data::<ReflectFromReflect>(declared)?
            .from_reflect(value)?,
    };
    reflect_edit.get_boxed(owned).ok()
}

/// Re-bind the row's editor to the current value and regenerate its label.
pub(super) fn refresh(world: &mut World, row: Entity) -> Result<(), InspectorError> {
    basic::refresh(world, row)?;

    let Some((editor, path, default_label)) = world
        .get::<PropertyRow>(row)
        .map(|r| (r.editor, r.token.value_path().to_string(), r.default_label.clone()))
    else {
        return Ok(());
    };
    let Ok([mut row_entity, editor_entity]) = world.get_entity_mut([row, editor]) else {
        return Err(InspectorError::NotAnEditor(editor));
    };
    let property_editor = editor_entity
        .get::<PropertyEditor>()
        .ok_or(InspectorError::NotAnEditor(editor))?;
    let value = property_editor.value(&path)?;
    let Some(mut slot) = row_entity.get_mut::<CustomEditSlot>() else {
        return Ok(());
    };
    slot.0.bind_target(value);
    let label = slot.0.edit_node_text(&default_label);

    if let Some(mut row_label) = row_entity.get_mut::<TreeRowLabel>()
        && row_label.0 != label
    {
        row_label.0 = label;
    }
    Ok(())
}

pub(super) fn apply_custom_value(
    committed: On<CustomValueCommitted>,
    affordances: Query<&AffordanceOf>,
    rows: Query<&PropertyRow>,
    mut editors: Query<&mut PropertyEditor>,
    mut commands: Commands,
) -> Result<(), BevyError> {
    let Ok(of) = affordances.get(committed.entity) else {
        return Ok(());
    };
    let row = rows.get(of.row)?;
    let path = row.token.value_path();
    if !row.token.property.writable {
        warn!("{}", InspectorError::ReadOnly { path: path.to_string() });
        return Ok(());
    }

    let mut editor = editors.get_mut(row.editor)?;
    let target = editor.value_mut(path)?;
    if target.try_apply(&*committed.value).is_err() {
        warn!(
            "{}",
            InspectorError::Apply {
                path: path.to_string(),
                type_path: committed.value.reflect_type_path().to_string(),
            }
        );
        return Ok(());
    }
    mark_dirty(&mut commands, row.editor);
    Ok(())
}
