use bevy::{
    prelude::*,
    reflect::{ReflectMut, TypeInfo},
};
use proptree_catalog::TypeCatalog;
use proptree_widgets::ButtonClicked;

use super::{AffordanceOf, AffordanceRole, AffordanceSpec, PropertyRow, RowDraft, row_of};
use crate::{
    InspectorError,
    editor::{PropertyEditor, mark_dirty},
    token::{PropertyToken, RuntimeType},
};

pub(super) fn draft(token: &PropertyToken, catalog: &TypeCatalog) -> RowDraft {
    let index = token.element_index().unwrap_or_default();
    let mut label = format!("[{index}]");
    if let Some(element_type) = token.element_type
        && catalog.candidates(element_type.type_id).len() > 1
    {
        label.push(' ');
        label.push_str(&runtime_type_name(catalog, element_type));
    }
    let mut draft = RowDraft::new(label);
    draft.affordances = vec![AffordanceSpec::Button {
        label: "X",
        role: AffordanceRole::Erase,
    }];
    draft
}

/// Variant name for enum elements, short type name otherwise.
fn runtime_type_name(catalog: &TypeCatalog, runtime: RuntimeType) -> String {
    let registry = catalog.registry().read();
    let Some(info) = registry.get_type_info(runtime.type_id) else {
        return String::from("?");
    };
    match (info, runtime.variant) {
        (TypeInfo::Enum(enum_info), Some(variant)) => enum_info
            .variant_at(variant)
            .map(|v| v.name().to_string())
            .unwrap_or_else(|| info.type_path_table().short_path().to_string()),
        _ => info.type_path_table().short_path().to_string(),
    }
}

pub(super) fn erase_element(
    clicked: On<ButtonClicked>,
    affordances: Query<(&AffordanceOf, &AffordanceRole)>,
    rows: Query<&PropertyRow>,
    mut editors: Query<&mut PropertyEditor>,
    mut commands: Commands,
) -> Result<(), BevyError> {
    let Some(row) = row_of(clicked.entity, AffordanceRole::Erase, &affordances) else {
        return Ok(());
    };
    let row = rows.get(row)?;
    let Some(index) = row.token.element_index() else {
        return Ok(());
    };
    let path = row.token.value_path();
    let suffix = format!("[{index}]");
    let list_path = path.strip_suffix(suffix.as_str()).unwrap_or(path);
    if !row.token.property.writable {
        warn!("{}", InspectorError::ReadOnly { path: list_path.to_string() });
        return Ok(());
    }

    let mut editor = editors.get_mut(row.editor)?;
    if let Err(err) = remove_element(editor.value_mut(list_path)?, index, list_path) {
        warn!("{err}");
        return Ok(());
    }
    mark_dirty(&mut commands, row.editor);
    Ok(())
}

fn remove_element(
    target: &mut dyn PartialReflect,
    index: usize,
    path: &str,
) -> Result<(), InspectorError> {
    let ReflectMut::List(list) = target.reflect_mut() else {
        return Err(InspectorError::NotAList {
            path: path.to_string(),
        });
    };
    if index >= list.len() {
        return Err(InspectorError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: list.len(),
        });
    }
    list.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_by_index() {
        let mut list = vec![1u32, 2, 3];
        remove_element(&mut list, 1, ".items").unwrap();
        assert_eq!(list, vec![1, 3]);
    }

    #[test]
    fn stale_indices_are_rejected() {
        let mut list = vec![1u32];
        let err = remove_element(&mut list, 4, ".items").unwrap_err();
        assert!(matches!(
            err,
            InspectorError::IndexOutOfRange { index: 4, len: 1, .. }
        ));
        assert_eq!(list, vec![1]);
    }
}
