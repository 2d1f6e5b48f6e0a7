//! A reflection-driven property tree for bevy.
//!
//! Bind any `Reflect` value to a [`PropertyEditor`] and it is shown as a tree
//! of rows with edit affordances next to them. Every resynchronization walks
//! the value again, turns it into [`PropertyToken`]s and reconciles those with
//! the live rows, so rows (and their expansion state) survive for as long as
//! the slot they describe does.

mod builder;
pub mod editor;
mod error;
pub mod layout;
pub mod rows;
mod settings;
pub mod sync;
pub mod token;
pub mod value;

pub use editor::{
    AffordanceOverlay, PropertyEditor, PropertyEditorConfig, RebuildPending, Viewport, clear_root,
    mark_dirty, set_root, set_root_boxed, spawn_property_editor,
};
pub use error::InspectorError;
pub use rows::{AffordanceOf, AffordanceRole, CustomValueCommitted, PropertyRow};
pub use settings::PropertyEditorSettings;
pub use sync::{SyncReport, resynchronize};
pub use token::{ObjectId, PropertyKey, PropertyToken, ReadOnly, RootId, RowKind, RowSlot, RuntimeType};

pub use proptree_catalog::{CandidateType, CustomPropertyEdit, ReflectCustomPropertyEdit, TypeCatalog};

use bevy::{ecs::reflect::AppTypeRegistry, prelude::*};
use proptree_widgets::{TreeRowToggled, WidgetsPlugin};

#[derive(Default)]
pub struct PropertyEditorPlugin {
    pub settings: PropertyEditorSettings,
}

impl Plugin for PropertyEditorPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<WidgetsPlugin>() {
            app.add_plugins(WidgetsPlugin);
        }
        let catalog = TypeCatalog::new(app.world().resource::<AppTypeRegistry>().clone());

        app.register_type::<PropertyEditorSettings>()
            .insert_resource(self.settings.clone())
            .insert_resource(catalog)
            .add_systems(PreUpdate, editor::rebuild_dirty_editors)
            .add_observer(relayout_toggled_rows);
        rows::plugin(app);
    }
}

fn relayout_toggled_rows(
    toggled: On<TreeRowToggled>,
    rows: Query<&PropertyRow>,
    mut commands: Commands,
) {
    let Ok(row) = rows.get(toggled.entity) else {
        return;
    };
    let editor = row.editor;
    commands.queue(move |world: &mut World| layout::relayout(world, editor));
}
