use bevy::prelude::*;

/// A drop-down style choice between a fixed list of options.
#[derive(Component, Debug, Clone, Default)]
pub struct Selector {
    pub options: Vec<String>,
    pub selected: usize,
}

impl Selector {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }
}

#[derive(EntityEvent)]
pub struct SelectionChanged {
    pub entity: Entity,
    pub selected: usize,
}

/// Select option `index` of `selector`. Out of range indices are ignored.
pub fn select(world: &mut World, selector: Entity, index: usize) {
    let Some(mut state) = world.get_mut::<Selector>(selector) else {
        return;
    };
    if index >= state.options.len() || state.selected == index {
        return;
    }
    state.selected = index;
    world.trigger(SelectionChanged {
        entity: selector,
        selected: index,
    });
}

pub(crate) struct SelectorPlugin;

impl Plugin for SelectorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, cycle_pressed_selectors);
    }
}

// Without a popup, a press steps to the next option.
fn cycle_pressed_selectors(
    selectors: Query<(Entity, &Interaction, &Selector), Changed<Interaction>>,
    mut commands: Commands,
) {
    for (entity, interaction, selector) in &selectors {
        if *interaction != Interaction::Pressed || selector.options.is_empty() {
            continue;
        }
        let next = (selector.selected + 1) % selector.options.len();
        commands.queue(move |world: &mut World| select(world, entity, next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_ignores_out_of_range() {
        let mut world = World::new();
        let selector = world
            .spawn(Selector::new(vec!["Circle".into(), "Square".into()]))
            .id();
        select(&mut world, selector, 5);
        assert_eq!(world.get::<Selector>(selector).unwrap().selected, 0);
        select(&mut world, selector, 1);
        assert_eq!(
            world.get::<Selector>(selector).unwrap().selected_option(),
            Some("Square")
        );
    }
}
