use bevy::prelude::*;
use proptree_widgets::{TreeRowLabel, walk_rows};

use crate::{
    editor::PropertyEditor,
    rows::{PropertyRow, RowGeometry, hide_affordances, place_affordances},
    settings::PropertyEditorSettings,
};

/// Position every row of `editor` and the affordances of its usable rows.
///
/// Rows below a collapsed ancestor get no bounds and have their affordances hidden.
pub fn relayout(world: &mut World, editor: Entity) {
    let settings = world
        .get_resource::<PropertyEditorSettings>()
        .cloned()
        .unwrap_or_default();
    let metrics = settings.metrics();
    let Some(tree) = world.get::<PropertyEditor>(editor).map(PropertyEditor::tree) else {
        return;
    };

    let mut usable = Vec::new();
    let mut hidden = Vec::new();
    let mut label_right: f32 = 0.0;
    for visit in walk_rows(world, tree) {
        if !visit.visible {
            hidden.push(visit.row);
            continue;
        }
        let Some(label) = world
            .get::<TreeRowLabel>(visit.row)
            .map(|label| label.0.clone())
        else {
            continue;
        };
        let bounds = metrics.row_bounds(usable.len(), visit.depth, &label);
        label_right = label_right.max(bounds.max.x);
        if let Some(mut row) = world.get_mut::<PropertyRow>(visit.row) {
            row.bounds = bounds;
            row.usable = true;
        }
        usable.push(visit.row);
    }

    let label_column = label_right + settings.affordance_margin;
    let Some(width) = world.get_mut::<PropertyEditor>(editor).map(|mut property_editor| {
        property_editor.viewport.label_column = label_column;
        property_editor.viewport.content_height = property_editor
            .viewport
            .nominal_height
            .max(settings.row_height * usable.len() as f32);
        property_editor.usable = usable.clone();
        property_editor.viewport.width
    }) else {
        return;
    };

    let geometry = RowGeometry {
        width,
        label_column,
    };
    for row in usable {
        place_affordances(world, row, geometry, &settings);
    }
    for row in hidden {
        if let Some(mut property_row) = world.get_mut::<PropertyRow>(row) {
            property_row.bounds = Rect::default();
            property_row.usable = false;
        }
        hide_affordances(world, row);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::reflect::AppTypeRegistry;
    use proptree_widgets::{Placement, set_expanded};

    use super::*;
    use crate::{
        editor::{PropertyEditorConfig, set_root, spawn_property_editor},
        rows::AffordanceRole,
        token::RowSlot,
    };

    #[derive(Reflect, Default)]
    struct Tags {
        label: String,
        tags: Vec<u32>,
    }

    fn editor() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<AppTypeRegistry>();
        world.resource::<AppTypeRegistry>().write().register::<Tags>();
        let editor = spawn_property_editor(&mut world, PropertyEditorConfig::default());
        let tags = Tags {
            label: "ab".into(),
            tags: vec![7],
        };
        set_root(&mut world, editor, tags).unwrap();
        (world, editor)
    }

    fn row_at(world: &World, editor: Entity, path: &str, slot: RowSlot) -> Entity {
        let property_editor = world.get::<PropertyEditor>(editor).unwrap();
        property_editor
            .tokens()
            .find(|(token, _)| token.value_path() == path && token.slot == slot)
            .map(|(_, row)| row)
            .unwrap()
    }

    #[test]
    fn collapsed_rows_hide_their_children() {
        let (mut world, editor) = editor();
        // label, tags; the element and the inserter start hidden.
        assert_eq!(world.get::<PropertyEditor>(editor).unwrap().usable_rows().len(), 2);

        let element = row_at(&world, editor, ".tags[0]", RowSlot::Element(0));
        let erase = world.get::<PropertyRow>(element).unwrap().affordances[0];
        assert!(!world.get::<Placement>(erase).unwrap().shown);

        let tags = row_at(&world, editor, ".tags", RowSlot::Property);
        set_expanded(&mut world, tags, true);
        relayout(&mut world, editor);
        assert_eq!(world.get::<PropertyEditor>(editor).unwrap().usable_rows().len(), 4);
        assert!(world.get::<Placement>(erase).unwrap().shown);
    }

    #[test]
    fn affordances_line_up_after_the_widest_label() {
        let (mut world, editor) = editor();
        let tags = row_at(&world, editor, ".tags", RowSlot::Property);
        set_expanded(&mut world, tags, true);
        relayout(&mut world, editor);

        let settings = PropertyEditorSettings::default();
        let property_editor = world.get::<PropertyEditor>(editor).unwrap();
        let viewport = property_editor.viewport();
        // "[0]" at depth 1 is the widest label.
        let widest = settings.indent * 2.0 + settings.glyph_width * 3.0 + 4.0;
        assert_eq!(viewport.label_column, widest + settings.affordance_margin);

        let label = row_at(&world, editor, ".label", RowSlot::Property);
        let field = world.get::<PropertyRow>(label).unwrap().affordances[0];
        assert_eq!(world.get::<AffordanceRole>(field), Some(&AffordanceRole::Value));
        let rect = world.get::<Placement>(field).unwrap().rect;
        assert_eq!(rect.min.x, viewport.label_column);
        assert_eq!(rect.min.y, settings.vertical_inset);
        assert_eq!(rect.max.x, viewport.width);

        let element = row_at(&world, editor, ".tags[0]", RowSlot::Element(0));
        let erase = world.get::<PropertyRow>(element).unwrap().affordances[0];
        let rect = world.get::<Placement>(erase).unwrap().rect;
        assert_eq!(rect.min.x, viewport.width - settings.erase_button_width);
        assert_eq!(rect.width(), settings.erase_button_width);
    }
}
