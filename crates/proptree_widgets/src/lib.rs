//! Headless widgets the property tree is drawn with.
//!
//! Every widget is plain component state plus entity events, so the whole
//! tree can be driven and inspected without a window. [`WidgetPresentationPlugin`]
//! adds bevy_ui nodes on top for hosts that render.

pub mod button;
pub mod feathers;
pub mod placement;
pub mod selector;
pub mod text_field;
pub mod tokens;
pub mod tree_view;

pub use button::{ActionButton, ButtonClicked};
pub use feathers::WidgetPresentationPlugin;
pub use placement::Placement;
pub use selector::{SelectionChanged, Selector};
pub use text_field::{FieldState, TextCommitted, TextEdited, TextField};
pub use tree_view::{
    RowVisit, TreeMetrics, TreeRow, TreeRowLabel, TreeRowToggled, TreeView, child_rows, set_expanded,
    toggle, walk_rows,
};

use bevy::prelude::*;

pub struct WidgetsPlugin;

impl Plugin for WidgetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            tree_view::TreeViewPlugin,
            text_field::TextFieldPlugin,
            button::ButtonPlugin,
            selector::SelectorPlugin,
        ));
    }
}
