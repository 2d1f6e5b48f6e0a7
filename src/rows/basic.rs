use bevy::prelude::*;
use proptree_catalog::{TypeCatalog, TypeShape};
use proptree_widgets::{FieldState, TextCommitted, TextEdited, TextField};

use super::{AffordanceOf, AffordanceRole, AffordanceSpec, PropertyRow, RowDraft, row_of};
use crate::{
    InspectorError,
    editor::PropertyEditor,
    token::PropertyToken,
    value::{format_value, parse_into_reflect, text_converts},
};

pub(super) fn draft(
    token: &PropertyToken,
    value: &dyn PartialReflect,
    catalog: &TypeCatalog,
) -> RowDraft {
    let mut draft = RowDraft::new(token.property.name.clone());
    draft.affordances = field_spec(token, value, catalog);
    if !draft.affordances.is_empty() {
        draft.synced_text = Some(format_value(value));
    }
    draft
}

/// The value field of an editable leaf, or nothing.
pub(super) fn field_spec(
    token: &PropertyToken,
    value: &dyn PartialReflect,
    catalog: &TypeCatalog,
) -> Vec<AffordanceSpec> {
    let shape = {
        let registry = catalog.registry().read();
        TypeShape::of_type(token.property.declared, &registry)
    };
    if shape != (TypeShape::Leaf { editable: true }) {
        return Vec::new();
    }
    vec![AffordanceSpec::Field {
        text: format_value(value),
        enabled: token.property.writable,
    }]
}

pub(super) fn validate_field_text(
    edited: On<TextEdited>,
    affordances: Query<(&AffordanceOf, &AffordanceRole)>,
    rows: Query<&PropertyRow>,
    editors: Query<&PropertyEditor>,
    mut fields: Query<&mut TextField>,
) -> Result<(), BevyError> {
    let Some(row) = row_of(edited.entity, AffordanceRole::Value, &affordances) else {
        return Ok(());
    };
    let row = rows.get(row)?;
    let value = editors.get(row.editor)?.value(row.token.value_path())?;
    let mut field = fields.get_mut(edited.entity)?;
    field.state = if text_converts(value, &edited.value) {
        FieldState::Valid
    } else {
        FieldState::Invalid
    };
    Ok(())
}

pub(super) fn commit_field_text(
    committed: On<TextCommitted>,
    affordances: Query<(&AffordanceOf, &AffordanceRole)>,
    mut rows: Query<&mut PropertyRow>,
    mut editors: Query<&mut PropertyEditor>,
    mut fields: Query<&mut TextField>,
) -> Result<(), BevyError> {
    let Some(row_entity) = row_of(committed.entity, AffordanceRole::Value, &affordances) else {
        return Ok(());
    };
    let mut row = rows.get_mut(row_entity)?;
    let mut field = fields.get_mut(committed.entity)?;
    let path = row.token.value_path().to_string();

    if !row.token.property.writable {
        warn!("{}", InspectorError::ReadOnly { path });
        if let Some(text) = row.synced_text.clone() {
            field.reset(text);
        }
        return Ok(());
    }

    let mut editor = editors.get_mut(row.editor)?;
    match store_text(editor.value_mut(&path)?, &committed.value, &path) {
        Ok(text) => {
            field.reset(text.clone());
            row.synced_text = Some(text);
        }
        Err(err) => {
            debug!("{err}");
            field.state = FieldState::Invalid;
        }
    }
    Ok(())
}

/// Parse `input` into `target`, returning the canonical text of the stored value.
fn store_text(
    target: &mut dyn PartialReflect,
    input: &str,
    path: &str,
) -> Result<String, InspectorError> {
    if parse_into_reflect(target, input) {
        Ok(format_value(target))
    } else {
        Err(InspectorError::Format {
            path: path.to_string(),
            input: input.to_string(),
            type_path: target.reflect_type_path().to_string(),
        })
    }
}

/// Copy the model's text into the value field if it changed behind our back.
///
/// Fields holding uncommitted input are left alone.
pub(super) fn refresh(world: &mut World, row: Entity) -> Result<(), InspectorError> {
    let Some((editor, path, synced, affordances)) = world.get::<PropertyRow>(row).map(|r| {
        (
            r.editor,
            r.token.value_path().to_string(),
            r.synced_text.clone(),
            r.affordances.clone(),
        )
    }) else {
        return Ok(());
    };
    let Some(field) = affordances
        .into_iter()
        .find(|&a| super::role_of(world, a) == Some(AffordanceRole::Value))
    else {
        return Ok(());
    };

    let text = world
        .get::<PropertyEditor>(editor)
        .ok_or(InspectorError::NotAnEditor(editor))?
        .value(&path)
        .map(format_value)?;
    if synced.as_deref() == Some(text.as_str()) {
        return Ok(());
    }
    let Some(mut text_field) = world.get_mut::<TextField>(field) else {
        return Ok(());
    };
    if text_field.state != FieldState::Normal {
        return Ok(());
    }
    text_field.reset(text.clone());
    if let Some(mut property_row) = world.get_mut::<PropertyRow>(row) {
        property_row.synced_text = Some(text);
    }
    Ok(())
}
