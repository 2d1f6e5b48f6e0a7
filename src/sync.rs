//! Reconciliation of the live rows of an editor against freshly built tokens.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bevy::prelude::*;
use proptree_widgets::child_rows;

use crate::{
    InspectorError,
    builder::{BuildContext, build_tokens},
    editor::PropertyEditor,
    layout::relayout,
    rows::{PropertyRow, refresh_row, spawn_row},
    settings::PropertyEditorSettings,
    token::PropertyToken,
};

/// What one resynchronization changed. All zeros means the tree already
/// matched the bound value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: usize,
    pub added: usize,
    /// Rows given a parent for the first time.
    pub attached: usize,
    /// Rows moved to a different parent.
    pub moved: usize,
    /// Parents whose children were put back in order.
    pub reordered: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        *self == SyncReport::default()
    }
}

/// Rebuild the tokens of `editor` from its bound value and bring the rows in line.
pub fn resynchronize(world: &mut World, editor: Entity) -> Result<SyncReport, InspectorError> {
    let max_depth = world
        .get_resource::<PropertyEditorSettings>()
        .map(|settings| settings.max_depth)
        .unwrap_or_else(|| PropertyEditorSettings::default().max_depth);

    let tokens = {
        let property_editor = world
            .get::<PropertyEditor>(editor)
            .ok_or(InspectorError::NotAnEditor(editor))?;
        match property_editor.root() {
            Some(root) => {
                let catalog = property_editor.catalog();
                let registry = catalog.registry().read();
                build_tokens(
                    root.as_partial_reflect(),
                    &BuildContext {
                        registry: &registry,
                        catalog,
                        root: property_editor.root_id(),
                        max_depth,
                    },
                )
            }
            None => Vec::new(),
        }
    };

    let retained: Vec<Entity> = {
        let property_editor = world
            .get::<PropertyEditor>(editor)
            .ok_or(InspectorError::NotAnEditor(editor))?;
        tokens
            .iter()
            .filter_map(|token| property_editor.rows.get(token).copied())
            .collect()
    };

    let report = reconcile(world, editor, &tokens)?;
    for row in retained {
        refresh_row(world, row)?;
    }
    relayout(world, editor);

    if !report.is_noop() {
        debug!("Synchronized {editor}: {report:?}");
    }
    Ok(report)
}

/// Make the live rows of `editor` match `tokens`, which must list parents
/// before their children.
pub(crate) fn reconcile(
    world: &mut World,
    editor: Entity,
    tokens: &[Arc<PropertyToken>],
) -> Result<SyncReport, InspectorError> {
    let mut report = SyncReport::default();
    let wanted: HashSet<&PropertyToken> = tokens.iter().map(Arc::as_ref).collect();

    // Stale rows go first, together with their affordances.
    let (stale, tree) = {
        let mut property_editor = world
            .get_mut::<PropertyEditor>(editor)
            .ok_or(InspectorError::NotAnEditor(editor))?;
        let stale_tokens: Vec<Arc<PropertyToken>> = property_editor
            .rows
            .keys()
            .filter(|token| !wanted.contains(token.as_ref()))
            .cloned()
            .collect();
        let stale: Vec<Entity> = stale_tokens
            .iter()
            .filter_map(|token| property_editor.rows.remove(token))
            .collect();
        (stale, property_editor.tree())
    };
    let affordances: Vec<Entity> = stale
        .iter()
        .filter_map(|&row| world.get::<PropertyRow>(row))
        .flat_map(|row| row.affordances.iter().copied())
        .collect();
    for affordance in affordances {
        if let Ok(entity) = world.get_entity_mut(affordance) {
            entity.despawn();
        }
    }
    for &row in &stale {
        // Children of a stale row are stale too and may already be gone.
        if let Ok(entity) = world.get_entity_mut(row) {
            entity.despawn();
        }
    }
    report.removed = stale.len();

    for token in tokens {
        let live = world
            .get::<PropertyEditor>(editor)
            .is_some_and(|property_editor| property_editor.rows.contains_key(token));
        if live {
            continue;
        }
        let row = spawn_row(world, editor, token.clone())?;
        if let Some(mut property_editor) = world.get_mut::<PropertyEditor>(editor) {
            property_editor.rows.insert(token.clone(), row);
        }
        report.added += 1;
    }

    let rows: HashMap<Arc<PropertyToken>, Entity> = world
        .get::<PropertyEditor>(editor)
        .map(|property_editor| property_editor.rows.clone())
        .unwrap_or_default();

    // Parent of every row, and the wanted child order of every parent.
    let mut children: Vec<(Entity, Vec<Entity>)> = Vec::new();
    let mut slot_of: HashMap<Entity, usize> = HashMap::new();
    for token in tokens {
        let Some(&row) = rows.get(token) else {
            continue;
        };
        let parent = match &token.parent {
            None => tree,
            Some(parent) => match rows.get(parent) {
                Some(&parent) => parent,
                None => {
                    let err = InspectorError::StaleTokenReference {
                        path: token.value_path().to_string(),
                    };
                    error!("{err}");
                    return Err(err);
                }
            },
        };

        match world.get::<ChildOf>(row).map(ChildOf::parent) {
            Some(current) if current == parent => {}
            current => {
                if current.is_some() {
                    report.moved += 1;
                } else {
                    report.attached += 1;
                }
                world.entity_mut(row).insert(ChildOf(parent));
            }
        }

        let slot = *slot_of.entry(parent).or_insert_with(|| {
            children.push((parent, Vec::new()));
            children.len() - 1
        });
        children[slot].1.push(row);
    }

    for (parent, wanted_order) in children {
        if child_rows(world, parent) == wanted_order {
            continue;
        }
        for &row in &wanted_order {
            world.entity_mut(row).remove::<ChildOf>();
        }
        world.entity_mut(parent).add_children(&wanted_order);
        report.reordered += 1;
    }

    Ok(report)
}
