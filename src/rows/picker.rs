//! NullReference and ListInserter rows: pick a candidate type, then create it.

use bevy::{
    prelude::*,
    reflect::{DynamicEnum, DynamicTuple, DynamicVariant, ReflectMut, TypeInfo},
};
use proptree_catalog::{CandidateType, TypeCatalog};
use proptree_widgets::{ButtonClicked, Selector};

use super::{AffordanceOf, AffordanceRole, AffordanceSpec, PropertyRow, RowDraft};
use crate::{
    InspectorError,
    editor::{PropertyEditor, mark_dirty},
    token::PropertyToken,
};

pub(super) fn draft_create(token: &PropertyToken, catalog: &TypeCatalog) -> RowDraft {
    let mut draft = RowDraft::new(format!("{} - null", token.property.name));
    let candidates = catalog.candidates(token.property.declared);
    draft.affordances = picker_specs(token, &candidates, "Create", AffordanceRole::Create);
    draft.candidates = candidates;
    draft
}

pub(super) fn draft_insert(
    token: &PropertyToken,
    list: &dyn PartialReflect,
    catalog: &TypeCatalog,
) -> Result<RowDraft, InspectorError> {
    let Some(TypeInfo::List(list_info)) = list.get_represented_type_info() else {
        return Err(InspectorError::NotAList {
            path: token.value_path().to_string(),
        });
    };
    let mut draft = RowDraft::new(String::new());
    let candidates = catalog.candidates(list_info.item_ty().id());
    draft.affordances = picker_specs(token, &candidates, "Insert", AffordanceRole::Insert);
    draft.candidates = candidates;
    Ok(draft)
}

fn picker_specs(
    token: &PropertyToken,
    candidates: &[CandidateType],
    label: &'static str,
    role: AffordanceRole,
) -> Vec<AffordanceSpec> {
    if candidates.is_empty() {
        debug!(
            "{}",
            InspectorError::MissingCandidateType {
                path: token.value_path().to_string()
            }
        );
        return Vec::new();
    }
    let mut specs = Vec::new();
    if candidates.len() > 1 {
        specs.push(AffordanceSpec::Selector(
            candidates.iter().map(|c| c.name.clone()).collect(),
        ));
    }
    specs.push(AffordanceSpec::Button { label, role });
    specs
}

/// Create the selected candidate and store it in the row's slot.
pub(super) fn fill_slot(
    clicked: On<ButtonClicked>,
    affordances: Query<(&AffordanceOf, &AffordanceRole)>,
    rows: Query<&PropertyRow>,
    selectors: Query<&Selector>,
    mut editors: Query<&mut PropertyEditor>,
    mut commands: Commands,
) -> Result<(), BevyError> {
    let Ok((of, &role)) = affordances.get(clicked.entity) else {
        return Ok(());
    };
    if !matches!(role, AffordanceRole::Create | AffordanceRole::Insert) {
        return Ok(());
    }
    let row = rows.get(of.row)?;
    let path = row.token.value_path();
    if !row.token.property.writable {
        warn!("{}", InspectorError::ReadOnly { path: path.to_string() });
        return Ok(());
    }

    let selected = row
        .affordances
        .iter()
        .find_map(|&a| selectors.get(a).ok())
        .map_or(0, |selector| selector.selected);
    let Some(candidate) = row.candidates.get(selected) else {
        return Ok(());
    };

    let mut editor = editors.get_mut(row.editor)?;
    let value = match editor.catalog().instantiate(candidate) {
        Ok(value) => value,
        Err(err) => {
            warn!("Cannot create `{}` for `{path}`: {err}", candidate.name);
            return Ok(());
        }
    };
    let target = editor.value_mut(path)?;
    let stored = match role {
        AffordanceRole::Create => fill_option(target, value, path),
        _ => push_element(target, value, path),
    };
    if let Err(err) = stored {
        warn!("{err}");
        return Ok(());
    }
    mark_dirty(&mut commands, row.editor);
    Ok(())
}

/// Turn a `None` into `Some(value)`.
fn fill_option(
    target: &mut dyn PartialReflect,
    value: Box<dyn PartialReflect>,
    path: &str,
) -> Result<(), InspectorError> {
    let type_path = value.reflect_type_path().to_string();
    let Some(info @ TypeInfo::Enum(_)) = target.get_represented_type_info() else {
        return Err(InspectorError::Apply {
            path: path.to_string(),
            type_path,
        });
    };
    let mut payload = DynamicTuple::default();
    payload.insert_boxed(value);
    let mut some = DynamicEnum::new("Some", DynamicVariant::Tuple(payload));
    some.set_represented_type(Some(info));
    target.try_apply(&some).map_err(|_| InspectorError::Apply {
        path: path.to_string(),
        type_path,
    })
}

fn push_element(
    target: &mut dyn PartialReflect,
    value: Box<dyn PartialReflect>,
    path: &str,
) -> Result<(), InspectorError> {
    let ReflectMut::List(list) = target.reflect_mut() else {
        return Err(InspectorError::NotAList {
            path: path.to_string(),
        });
    };
    let item = list.get_represented_list_info().map(|info| info.item_ty().id());
    let actual = value.get_represented_type_info().map(|info| info.type_id());
    if item.is_none() || item != actual {
        return Err(InspectorError::Apply {
            path: path.to_string(),
            type_path: value.reflect_type_path().to_string(),
        });
    }
    list.push(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Reflect, Default, Debug, PartialEq)]
    struct Engine {
        cylinders: u8,
    }

    #[test]
    fn fills_an_empty_option() {
        let mut slot: Option<Engine> = None;
        fill_option(&mut slot, Box::new(Engine { cylinders: 6 }), ".engine").unwrap();
        assert_eq!(slot, Some(Engine { cylinders: 6 }));
    }

    #[test]
    fn pushes_matching_elements_only() {
        let mut list: Vec<u32> = vec![1];
        push_element(&mut list, Box::new(2u32), ".items").unwrap();
        assert_eq!(list, vec![1, 2]);

        let err = push_element(&mut list, Box::new(String::from("3")), ".items").unwrap_err();
        assert!(matches!(err, InspectorError::Apply { .. }));
        assert_eq!(list.len(), 2);
    }
}
