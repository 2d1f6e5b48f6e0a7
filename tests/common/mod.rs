#![allow(dead_code)]

use bevy::prelude::*;
use proptree::{
    AffordanceRole, PropertyEditor, PropertyEditorConfig, PropertyEditorPlugin, PropertyRow,
    RebuildPending, RowSlot, spawn_property_editor,
};
use proptree_widgets::{TreeRowLabel, child_rows};

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
#[reflect(Default)]
pub struct Circle {
    pub radius: f32,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
#[reflect(Default)]
pub struct Square {
    pub side: f32,
}

#[derive(Reflect, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Square(Square),
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
#[reflect(Default)]
pub struct Engine {
    pub cylinders: u8,
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct Drawing {
    pub title: String,
    pub count: u32,
    #[reflect(@proptree::ReadOnly)]
    pub serial: u32,
    pub engine: Option<Engine>,
    pub items: Vec<Shape>,
}

pub fn app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, PropertyEditorPlugin::default()));
    app.register_type::<Drawing>();
    app
}

pub fn editor(app: &mut App) -> Entity {
    spawn_property_editor(app.world_mut(), PropertyEditorConfig::default())
}

pub fn row(app: &App, editor: Entity, path: &str, slot: RowSlot) -> Entity {
    try_row(app, editor, path, slot).unwrap_or_else(|| panic!("no row for {path} {slot:?}"))
}

pub fn try_row(app: &App, editor: Entity, path: &str, slot: RowSlot) -> Option<Entity> {
    app.world()
        .get::<PropertyEditor>(editor)
        .unwrap()
        .tokens()
        .find(|(token, _)| token.value_path() == path && token.slot == slot)
        .map(|(_, row)| row)
}

pub fn label(app: &App, row: Entity) -> String {
    app.world().get::<TreeRowLabel>(row).unwrap().0.clone()
}

pub fn labels(app: &App, parent: Entity) -> Vec<String> {
    child_rows(app.world(), parent)
        .into_iter()
        .map(|row| label(app, row))
        .collect()
}

pub fn affordance(app: &App, row: Entity, role: AffordanceRole) -> Entity {
    try_affordance(app, row, role).unwrap_or_else(|| panic!("row has no {role:?} affordance"))
}

pub fn try_affordance(app: &App, row: Entity, role: AffordanceRole) -> Option<Entity> {
    app.world()
        .get::<PropertyRow>(row)
        .unwrap()
        .affordances
        .iter()
        .copied()
        .find(|&a| app.world().get::<AffordanceRole>(a) == Some(&role))
}

pub fn drawing(app: &App, editor: Entity) -> &Drawing {
    app.world()
        .get::<PropertyEditor>(editor)
        .unwrap()
        .root()
        .and_then(|root| root.downcast_ref::<Drawing>())
        .unwrap()
}

pub fn is_pending(app: &App, editor: Entity) -> bool {
    app.world().get::<RebuildPending>(editor).is_some()
}
