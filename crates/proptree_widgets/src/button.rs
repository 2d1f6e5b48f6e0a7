use bevy::prelude::*;

/// A labelled push button.
#[derive(Component, Debug, Clone)]
pub struct ActionButton {
    pub label: String,
    pub enabled: bool,
}

impl ActionButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
        }
    }
}

#[derive(EntityEvent)]
pub struct ButtonClicked {
    pub entity: Entity,
}

/// Press `button` programmatically.
pub fn click(world: &mut World, button: Entity) {
    if world
        .get::<ActionButton>(button)
        .is_some_and(|button| button.enabled)
    {
        world.trigger(ButtonClicked { entity: button });
    }
}

pub(crate) struct ButtonPlugin;

impl Plugin for ButtonPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_button_click);
    }
}

fn handle_button_click(
    interactions: Query<(Entity, &Interaction, &ActionButton), Changed<Interaction>>,
    mut commands: Commands,
) {
    for (entity, interaction, button) in &interactions {
        if *interaction == Interaction::Pressed && button.enabled {
            commands.trigger(ButtonClicked { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Clicks(u32);

    #[test]
    fn disabled_buttons_do_not_fire() {
        let mut world = World::new();
        world.init_resource::<Clicks>();
        world.add_observer(|_: On<ButtonClicked>, mut clicks: ResMut<Clicks>| clicks.0 += 1);

        let live = world.spawn(ActionButton::new("Insert")).id();
        let dead = world
            .spawn(ActionButton {
                enabled: false,
                ..ActionButton::new("Insert")
            })
            .id();
        click(&mut world, live);
        click(&mut world, dead);
        world.flush();
        assert_eq!(world.resource::<Clicks>().0, 1);
    }
}
