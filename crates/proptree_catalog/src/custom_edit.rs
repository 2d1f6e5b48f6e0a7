use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

/// Implement this to have a property rendered by your own affordances.
///
/// Inspected types opt in with `#[reflect(CustomPropertyEdit)]`; types you do
/// not own can be bound to an external editor through
/// [`TypeCatalog::add_custom_editor`](crate::TypeCatalog::add_custom_editor).
#[reflect_trait]
pub trait CustomPropertyEdit: Send + Sync + 'static {
    /// Called with the current property value before any other method, and
    /// again whenever a retained row is refreshed.
    fn bind_target(&mut self, _target: &dyn PartialReflect) {}

    /// Override the text used for the row.
    fn edit_node_text(&self, default_text: &str) -> String {
        default_text.to_string()
    }

    /// Spawn the affordances shown next to the row. Returning nothing falls
    /// back to the default rendering.
    fn create_edit_affordances(&mut self, commands: &mut Commands) -> Vec<Entity>;

    /// Position the affordances inside `region`, the space available on the row.
    ///
    /// `region` starts at the label column shared by every row of the editor,
    /// not at the end of this row's own label, and runs to the editor's right
    /// edge. Its height is one row.
    fn position_edit_affordances(
        &self,
        affordances: &[Entity],
        region: Rect,
        commands: &mut Commands,
    ) {
        if affordances.is_empty() {
            return;
        }
        let width = region.width() / affordances.len() as f32;
        for (i, &affordance) in affordances.iter().enumerate() {
            let min = Vec2::new(region.min.x + width * i as f32, region.min.y);
            commands.queue(move |world: &mut World| {
                if let Some(mut placement) =
                    world.get_mut::<proptree_widgets::Placement>(affordance)
                {
                    placement.rect = Rect::from_corners(min, min + Vec2::new(width, region.height()));
                }
            });
        }
    }
}

pub type EditorFactory = Arc<dyn Fn() -> Box<dyn CustomPropertyEdit> + Send + Sync>;

/// Exact-type bindings from inspected types to external editors.
#[derive(Default, Clone)]
pub(crate) struct EditorBindings {
    factories: HashMap<TypeId, EditorFactory>,
}

impl EditorBindings {
    pub(crate) fn insert(&mut self, type_id: TypeId, factory: EditorFactory) {
        self.factories.insert(type_id, factory);
    }

    pub(crate) fn contains(&self, type_id: TypeId) -> bool {
        self.factories.contains_key(&type_id)
    }

    pub(crate) fn create(&self, type_id: TypeId) -> Option<Box<dyn CustomPropertyEdit>> {
        self.factories.get(&type_id).map(|factory| factory())
    }
}
