use bevy::prelude::*;

use crate::tokens;

/// Marker for the container holding the top-level rows.
#[derive(Component, Default)]
pub struct TreeView;

/// One row of a tree. Child rows are parented to it with `ChildOf`.
#[derive(Component, Default, Debug)]
pub struct TreeRow {
    pub expanded: bool,
}

/// Text shown for the row.
#[derive(Component, Default, Debug, Clone, PartialEq, Eq)]
pub struct TreeRowLabel(pub String);

/// Fired after a row has been expanded or collapsed.
#[derive(EntityEvent)]
pub struct TreeRowToggled {
    pub entity: Entity,
    pub expanded: bool,
}

/// Geometry used to compute row bounds without a running UI layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeMetrics {
    pub row_height: f32,
    pub indent: f32,
    pub glyph_width: f32,
}

impl Default for TreeMetrics {
    fn default() -> Self {
        Self {
            row_height: tokens::ROW_HEIGHT,
            indent: tokens::INDENT,
            glyph_width: tokens::GLYPH_WIDTH,
        }
    }
}

impl TreeMetrics {
    /// Bounds of the label of the `index`-th visible row, nested `depth` levels deep.
    pub fn row_bounds(&self, index: usize, depth: usize, label: &str) -> Rect {
        let left = self.indent * (depth + 1) as f32;
        let top = self.row_height * index as f32;
        let width = self.glyph_width * label.chars().count() as f32 + tokens::LABEL_PADDING;
        Rect::new(left, top, left + width, top + self.row_height)
    }
}

/// A row reached while walking a tree in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowVisit {
    pub row: Entity,
    pub depth: usize,
    /// Every ancestor row is expanded.
    pub visible: bool,
}

/// Walk all rows below `tree` in pre-order, following child order.
pub fn walk_rows(world: &World, tree: Entity) -> Vec<RowVisit> {
    let mut visits = Vec::new();
    if let Some(children) = world.get::<Children>(tree) {
        for child in children.iter() {
            walk_row(world, child, 0, true, &mut visits);
        }
    }
    visits
}

fn walk_row(world: &World, row: Entity, depth: usize, visible: bool, visits: &mut Vec<RowVisit>) {
    let Some(tree_row) = world.get::<TreeRow>(row) else {
        return;
    };
    visits.push(RowVisit {
        row,
        depth,
        visible,
    });
    let children_visible = visible && tree_row.expanded;
    if let Some(children) = world.get::<Children>(row) {
        for child in children.iter() {
            walk_row(world, child, depth + 1, children_visible, visits);
        }
    }
}

/// Rows parented directly to `parent`, in child order.
pub fn child_rows(world: &World, parent: Entity) -> Vec<Entity> {
    world
        .get::<Children>(parent)
        .map(|children| {
            children
                .iter()
                .filter(|&child| world.get::<TreeRow>(child).is_some())
                .collect()
        })
        .unwrap_or_default()
}

/// Expand or collapse `row`, firing [`TreeRowToggled`] when the state changes.
pub fn set_expanded(world: &mut World, row: Entity, expanded: bool) {
    let Some(mut tree_row) = world.get_mut::<TreeRow>(row) else {
        return;
    };
    if tree_row.expanded == expanded {
        return;
    }
    tree_row.expanded = expanded;
    world.trigger(TreeRowToggled {
        entity: row,
        expanded,
    });
}

pub fn toggle(world: &mut World, row: Entity) {
    if let Some(expanded) = world.get::<TreeRow>(row).map(|r| r.expanded) {
        set_expanded(world, row, !expanded);
    }
}

pub(crate) struct TreeViewPlugin;

impl Plugin for TreeViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, toggle_pressed_rows);
    }
}

fn toggle_pressed_rows(
    rows: Query<(Entity, &Interaction), (Changed<Interaction>, With<TreeRow>)>,
    mut commands: Commands,
) {
    for (row, interaction) in &rows {
        if *interaction == Interaction::Pressed {
            commands.queue(move |world: &mut World| toggle(world, row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_bounds_follow_depth_and_label() {
        let metrics = TreeMetrics::default();
        let bounds = metrics.row_bounds(2, 1, "abc");
        assert_eq!(bounds.min, Vec2::new(38.0, 38.0));
        assert_eq!(bounds.max, Vec2::new(38.0 + 21.0 + tokens::LABEL_PADDING, 57.0));
    }

    #[test]
    fn collapsed_rows_hide_descendants() {
        let mut world = World::new();
        let tree = world.spawn(TreeView).id();
        let outer = world
            .spawn((TreeRow { expanded: false }, ChildOf(tree)))
            .id();
        let inner = world.spawn((TreeRow::default(), ChildOf(outer))).id();
        let leaf = world.spawn((TreeRow::default(), ChildOf(inner))).id();

        let visits = walk_rows(&world, tree);
        assert_eq!(
            visits,
            vec![
                RowVisit { row: outer, depth: 0, visible: true },
                RowVisit { row: inner, depth: 1, visible: false },
                RowVisit { row: leaf, depth: 2, visible: false },
            ]
        );

        set_expanded(&mut world, outer, true);
        let visible: Vec<_> = walk_rows(&world, tree)
            .into_iter()
            .filter(|visit| visit.visible)
            .map(|visit| visit.row)
            .collect();
        assert_eq!(visible, vec![outer, inner]);
    }
}
