use bevy::{
    input::keyboard::{Key, KeyboardInput},
    input_focus::{FocusedInput, InputFocus},
    prelude::*,
};

/// Visual state of a text field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldState {
    /// Shows the stored value.
    #[default]
    Normal,
    /// Edited, not yet committed, and convertible.
    Valid,
    /// Holds text that does not convert.
    Invalid,
}

#[derive(Component, Debug)]
pub struct TextField {
    pub value: String,
    pub cursor: usize,
    pub state: FieldState,
    pub enabled: bool,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.len(),
            value,
            state: FieldState::Normal,
            enabled: true,
        }
    }

    pub fn read_only(value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(value)
        }
    }

    /// Replace the text with a value read back from the model.
    pub fn reset(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
        self.state = FieldState::Normal;
    }
}

/// Fired on every change of the text.
#[derive(EntityEvent)]
pub struct TextEdited {
    pub entity: Entity,
    pub value: String,
}

/// Fired when the user confirms the text (Enter) or leaves the field.
#[derive(EntityEvent)]
pub struct TextCommitted {
    pub entity: Entity,
    pub value: String,
}

/// Replace the text of `field` as if typed, firing [`TextEdited`].
pub fn edit_text(world: &mut World, field: Entity, value: impl Into<String>) {
    let value = value.into();
    let Some(mut text_field) = world.get_mut::<TextField>(field) else {
        return;
    };
    if !text_field.enabled {
        return;
    }
    text_field.value = value.clone();
    text_field.cursor = text_field.value.len();
    world.trigger(TextEdited {
        entity: field,
        value,
    });
}

/// Confirm the current text of `field`, firing [`TextCommitted`].
pub fn commit_text(world: &mut World, field: Entity) {
    let Some(text_field) = world.get::<TextField>(field) else {
        return;
    };
    if !text_field.enabled {
        return;
    }
    let value = text_field.value.clone();
    world.trigger(TextCommitted {
        entity: field,
        value,
    });
}

pub(crate) struct TextFieldPlugin;

impl Plugin for TextFieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(update_text_field)
            .add_systems(Update, commit_on_focus_loss);
    }
}

fn update_text_field(
    key_event: On<FocusedInput<KeyboardInput>>,
    mut commands: Commands,
    mut fields: Query<&mut TextField>,
) {
    let entity = key_event.focused_entity;
    let Ok(mut field) = fields.get_mut(entity) else {
        return;
    };
    if !field.enabled || !key_event.input.state.is_pressed() {
        return;
    }

    let before = field.value.clone();
    if let Some(text) = &key_event.input.text
        && text.chars().all(|c| !c.is_control())
    {
        let cursor = field.cursor;
        field.value.insert_str(cursor, text);
        field.cursor += text.len();
    }

    match &key_event.input.logical_key {
        Key::Backspace => {
            if let Some((index, _)) = field.value[..field.cursor].char_indices().next_back() {
                field.value.remove(index);
                field.cursor = index;
            }
        }
        Key::Delete => {
            let cursor = field.cursor;
            if cursor < field.value.len() {
                field.value.remove(cursor);
            }
        }
        Key::ArrowLeft => {
            if let Some((index, _)) = field.value[..field.cursor].char_indices().next_back() {
                field.cursor = index;
            }
        }
        Key::ArrowRight => {
            if let Some(c) = field.value[field.cursor..].chars().next() {
                field.cursor += c.len_utf8();
            }
        }
        Key::Home => field.cursor = 0,
        Key::End => field.cursor = field.value.len(),
        Key::Enter => commands.trigger(TextCommitted {
            entity,
            value: field.value.clone(),
        }),
        _ => {}
    }

    if field.value != before {
        commands.trigger(TextEdited {
            entity,
            value: field.value.clone(),
        });
    }
}

/// Leaving a field commits it.
fn commit_on_focus_loss(
    focus: Option<Res<InputFocus>>,
    mut last_focused: Local<Option<Entity>>,
    fields: Query<&TextField>,
    mut commands: Commands,
) {
    let Some(focus) = focus else {
        return;
    };
    let current = focus.get();
    if current == *last_focused {
        return;
    }
    if let Some(previous) = last_focused.take()
        && let Ok(field) = fields.get(previous)
        && field.enabled
    {
        commands.trigger(TextCommitted {
            entity: previous,
            value: field.value.clone(),
        });
    }
    *last_focused = current;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::{
        input::{ButtonState, InputPlugin, keyboard::KeyCode},
        input_focus::InputDispatchPlugin,
        window::PrimaryWindow,
    };

    #[derive(Resource, Default)]
    struct Seen(Vec<String>);

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin, InputDispatchPlugin, TextFieldPlugin))
            .init_resource::<Seen>()
            .add_observer(|event: On<TextCommitted>, mut seen: ResMut<Seen>| {
                seen.0.push(event.value.clone());
            });
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app
    }

    fn press(app: &mut App, key_code: KeyCode, logical_key: Key, text: Option<&str>) {
        let window = app
            .world_mut()
            .query_filtered::<Entity, With<PrimaryWindow>>()
            .single(app.world())
            .unwrap();
        app.world_mut().write_message(KeyboardInput {
            key_code,
            logical_key,
            state: ButtonState::Pressed,
            text: text.map(Into::into),
            repeat: false,
            window,
        });
        app.update();
    }

    fn type_char(app: &mut App, c: &str, key_code: KeyCode) {
        press(app, key_code, Key::Character(c.into()), Some(c));
    }

    #[test]
    fn typing_then_enter_commits() {
        let mut app = app();
        let field = app.world_mut().spawn(TextField::new("1")).id();
        app.world_mut().insert_resource(InputFocus::from_entity(field));

        type_char(&mut app, "2", KeyCode::Digit2);
        press(&mut app, KeyCode::ArrowLeft, Key::ArrowLeft, None);
        type_char(&mut app, "0", KeyCode::Digit0);
        assert_eq!(app.world().get::<TextField>(field).unwrap().value, "102");
        assert!(app.world().resource::<Seen>().0.is_empty());

        press(&mut app, KeyCode::Backspace, Key::Backspace, None);
        press(&mut app, KeyCode::Enter, Key::Enter, None);
        assert_eq!(app.world().get::<TextField>(field).unwrap().value, "12");
        assert_eq!(app.world().resource::<Seen>().0, vec!["12".to_string()]);
    }

    #[test]
    fn leaving_a_field_commits_it() {
        let mut app = app();
        let first = app.world_mut().spawn(TextField::new("a")).id();
        let second = app.world_mut().spawn(TextField::read_only("b")).id();
        app.world_mut().insert_resource(InputFocus::from_entity(first));
        app.update();
        assert!(app.world().resource::<Seen>().0.is_empty());

        app.world_mut().resource_mut::<InputFocus>().set(second);
        app.update();
        assert_eq!(app.world().resource::<Seen>().0, vec!["a".to_string()]);

        // Read-only fields never commit.
        app.world_mut().resource_mut::<InputFocus>().clear();
        app.update();
        assert_eq!(app.world().resource::<Seen>().0, vec!["a".to_string()]);
    }

    #[test]
    fn disabled_fields_ignore_edits() {
        let mut world = World::new();
        let field = world.spawn(TextField::read_only("7")).id();
        edit_text(&mut world, field, "8");
        assert_eq!(world.get::<TextField>(field).unwrap().value, "7");
    }

    #[test]
    fn commit_reports_current_text() {
        let mut world = World::new();
        world.init_resource::<Seen>();
        world.add_observer(|event: On<TextCommitted>, mut seen: ResMut<Seen>| {
            seen.0.push(event.value.clone());
        });
        let field = world.spawn(TextField::new("1")).id();
        edit_text(&mut world, field, "12");
        commit_text(&mut world, field);
        world.flush();
        assert_eq!(world.resource::<Seen>().0, vec!["12".to_string()]);
    }
}
