//! bevy_ui presentation for the headless widgets.
//!
//! Widgets get their `Node`, text and colours when the headless component is
//! added; afterwards the systems here only mirror state changes.

use bevy::{input_focus::InputFocus, prelude::*};

use crate::{
    button::ActionButton,
    placement::Placement,
    selector::Selector,
    text_field::{FieldState, TextField},
    tokens,
    tree_view::{TreeRow, TreeRowLabel, TreeView},
};

/// Adds bevy_ui nodes to every widget. Requires `UiPlugin`.
pub struct WidgetPresentationPlugin;

impl Plugin for WidgetPresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(setup_tree_view)
            .add_observer(setup_tree_row)
            .add_observer(setup_text_field)
            .add_observer(setup_button)
            .add_observer(setup_selector)
            .add_observer(focus_clicked_field)
            .add_systems(
                PostUpdate,
                (
                    sync_placements,
                    sync_row_labels,
                    sync_row_display,
                    sync_field_text,
                    sync_selector_text,
                ),
            );
    }
}

/// The text entity showing a widget's content.
#[derive(Component)]
struct DisplayText(Entity);

fn display_text(commands: &mut Commands, owner: Entity, text: &str) -> Entity {
    let text = commands
        .spawn((
            Text::new(text),
            TextFont {
                font_size: tokens::FONT_SM,
                ..default()
            },
            TextColor(tokens::TEXT_COLOR),
            ChildOf(owner),
        ))
        .id();
    commands.entity(owner).insert(DisplayText(text));
    text
}

fn setup_tree_view(add: On<Add, TreeView>, mut commands: Commands) {
    commands.entity(add.entity).insert(Node {
        flex_direction: FlexDirection::Column,
        width: percent(100),
        ..default()
    });
}

fn setup_tree_row(
    add: On<Add, TreeRow>,
    labels: Query<&TreeRowLabel>,
    mut commands: Commands,
) {
    commands.entity(add.entity).insert((
        Node {
            flex_direction: FlexDirection::Column,
            padding: UiRect::left(px(tokens::INDENT)),
            min_height: px(tokens::ROW_HEIGHT),
            ..default()
        },
        Interaction::default(),
    ));
    let label = labels.get(add.entity).map(|l| l.0.as_str()).unwrap_or("");
    display_text(&mut commands, add.entity, label);
}

fn absolute_node() -> Node {
    Node {
        position_type: PositionType::Absolute,
        display: Display::None,
        align_items: AlignItems::Center,
        padding: UiRect::horizontal(px(4)),
        ..default()
    }
}

fn setup_text_field(add: On<Add, TextField>, fields: Query<&TextField>, mut commands: Commands) {
    let Ok(field) = fields.get(add.entity) else {
        return;
    };
    commands.entity(add.entity).insert((
        absolute_node(),
        BackgroundColor(tokens::FIELD_BG),
        Interaction::default(),
    ));
    display_text(&mut commands, add.entity, &field.value);
}

fn setup_button(add: On<Add, ActionButton>, buttons: Query<&ActionButton>, mut commands: Commands) {
    let Ok(button) = buttons.get(add.entity) else {
        return;
    };
    commands.entity(add.entity).insert((
        absolute_node(),
        BackgroundColor(tokens::BUTTON_BG),
        Interaction::default(),
    ));
    display_text(&mut commands, add.entity, &button.label);
}

fn setup_selector(add: On<Add, Selector>, selectors: Query<&Selector>, mut commands: Commands) {
    let Ok(selector) = selectors.get(add.entity) else {
        return;
    };
    commands.entity(add.entity).insert((
        absolute_node(),
        BackgroundColor(tokens::FIELD_BG),
        Interaction::default(),
    ));
    display_text(
        &mut commands,
        add.entity,
        selector.selected_option().unwrap_or(""),
    );
}

fn focus_clicked_field(
    click: On<Pointer<Click>>,
    fields: Query<&TextField>,
    focus: Option<ResMut<InputFocus>>,
) {
    let Some(mut focus) = focus else {
        return;
    };
    if fields.get(click.entity).is_ok_and(|field| field.enabled) {
        focus.set(click.entity);
    }
}

fn sync_placements(mut placements: Query<(&Placement, &mut Node), Changed<Placement>>) {
    for (placement, mut node) in &mut placements {
        node.left = px(placement.rect.min.x);
        node.top = px(placement.rect.min.y);
        node.width = px(placement.rect.width());
        node.height = px(placement.rect.height());
        node.display = if placement.shown {
            Display::Flex
        } else {
            Display::None
        };
    }
}

fn sync_row_labels(
    rows: Query<(&TreeRowLabel, &DisplayText), Changed<TreeRowLabel>>,
    mut texts: Query<&mut Text>,
) {
    for (label, display) in &rows {
        if let Ok(mut text) = texts.get_mut(display.0) {
            text.0.clone_from(&label.0);
        }
    }
}

fn sync_row_display(
    mut rows: Query<(&ChildOf, &mut Node), With<TreeRow>>,
    parents: Query<&TreeRow>,
) {
    for (child_of, mut node) in &mut rows {
        let shown = match parents.get(child_of.parent()) {
            Ok(parent) => parent.expanded,
            Err(_) => true,
        };
        let display = if shown { Display::Flex } else { Display::None };
        if node.display != display {
            node.display = display;
        }
    }
}

fn sync_field_text(
    mut fields: Query<(&TextField, &DisplayText, &mut BackgroundColor), Changed<TextField>>,
    mut texts: Query<&mut Text>,
) {
    for (field, display, mut background) in &mut fields {
        if let Ok(mut text) = texts.get_mut(display.0) {
            text.0.clone_from(&field.value);
        }
        background.0 = match field.state {
            FieldState::Normal => tokens::FIELD_BG,
            FieldState::Valid => tokens::FIELD_PENDING_BG,
            FieldState::Invalid => tokens::FIELD_INVALID_BG,
        };
    }
}

fn sync_selector_text(
    selectors: Query<(&Selector, &DisplayText), Changed<Selector>>,
    mut texts: Query<&mut Text>,
) {
    for (selector, display) in &selectors {
        if let Ok(mut text) = texts.get_mut(display.0) {
            text.0 = selector.selected_option().unwrap_or("").to_string();
        }
    }
}
