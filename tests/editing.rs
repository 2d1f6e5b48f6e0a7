mod common;

use bevy::{prelude::*, reflect::FromReflect};
use common::*;
use proptree::{
    AffordanceRole, CustomPropertyEdit, CustomValueCommitted, PropertyEditor, ReflectCustomPropertyEdit,
    RowKind, RowSlot, TypeCatalog, mark_dirty, resynchronize, set_root,
};
use proptree_widgets::{
    ActionButton, FieldState, Placement, TextCommitted, TextField,
    text_field::{commit_text, edit_text},
};

fn field(app: &App, editor: Entity, path: &str) -> Entity {
    let row = row(app, editor, path, RowSlot::Property);
    affordance(app, row, AffordanceRole::Value)
}

fn text(app: &App, field: Entity) -> &TextField {
    app.world().get::<TextField>(field).unwrap()
}

#[test]
fn committed_text_round_trips() {
    let mut app = app();
    let editor = editor(&mut app);
    set_root(app.world_mut(), editor, Drawing::default()).unwrap();
    let count = field(&app, editor, ".count");
    assert_eq!(text(&app, count).value, "0");

    edit_text(app.world_mut(), count, "42");
    assert_eq!(text(&app, count).state, FieldState::Valid);
    commit_text(app.world_mut(), count);

    assert_eq!(drawing(&app, editor).count, 42);
    assert_eq!(text(&app, count).value, "42");
    assert_eq!(text(&app, count).state, FieldState::Normal);

    let report = resynchronize(app.world_mut(), editor).unwrap();
    assert!(report.is_noop());
    assert_eq!(text(&app, count).value, "42");
}

#[test]
fn unparsable_text_is_flagged_and_not_stored() {
    let mut app = app();
    let editor = editor(&mut app);
    set_root(app.world_mut(), editor, Drawing::default()).unwrap();
    let count = field(&app, editor, ".count");

    edit_text(app.world_mut(), count, "abc");
    assert_eq!(text(&app, count).state, FieldState::Invalid);
    commit_text(app.world_mut(), count);
    assert_eq!(drawing(&app, editor).count, 0);
    assert_eq!(text(&app, count).state, FieldState::Invalid);

    edit_text(app.world_mut(), count, "7");
    commit_text(app.world_mut(), count);
    assert_eq!(drawing(&app, editor).count, 7);
    assert_eq!(text(&app, count).state, FieldState::Normal);
}

#[test]
fn read_only_properties_refuse_commits() {
    let mut app = app();
    let editor = editor(&mut app);
    let value = Drawing {
        serial: 9,
        ..default()
    };
    set_root(app.world_mut(), editor, value).unwrap();
    let serial = field(&app, editor, ".serial");
    assert!(!text(&app, serial).enabled);

    edit_text(app.world_mut(), serial, "5");
    assert_eq!(text(&app, serial).value, "9");

    app.world_mut().trigger(TextCommitted {
        entity: serial,
        value: "5".into(),
    });
    assert_eq!(drawing(&app, editor).serial, 9);
    assert_eq!(text(&app, serial).value, "9");
}

#[test]
fn host_changes_show_up_after_mark_dirty() {
    let mut app = app();
    let editor = editor(&mut app);
    set_root(app.world_mut(), editor, Drawing::default()).unwrap();
    let count = field(&app, editor, ".count");
    let title = field(&app, editor, ".title");
    edit_text(app.world_mut(), title, "draft");

    {
        let mut property_editor = app.world_mut().get_mut::<PropertyEditor>(editor).unwrap();
        let root = property_editor.root_mut().unwrap();
        let drawing = root.downcast_mut::<Drawing>().unwrap();
        drawing.count = 3;
        drawing.title = "Elevation".into();
    }
    mark_dirty(&mut app.world_mut().commands(), editor);
    app.world_mut().flush();
    assert_eq!(text(&app, count).value, "0");

    app.update();
    assert_eq!(field(&app, editor, ".count"), count);
    assert_eq!(text(&app, count).value, "3");
    // Uncommitted input is kept.
    assert_eq!(text(&app, title).value, "draft");
    assert_eq!(text(&app, title).state, FieldState::Valid);
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
#[reflect(CustomPropertyEdit, Default)]
struct Tint {
    r: u8,
    g: u8,
    b: u8,
}

impl CustomPropertyEdit for Tint {
    fn bind_target(&mut self, target: &dyn PartialReflect) {
        if let Some(tint) = Tint::from_reflect(target) {
            *self = tint;
        }
    }

    fn edit_node_text(&self, default_text: &str) -> String {
        format!("{default_text} #{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn create_edit_affordances(&mut self, commands: &mut Commands) -> Vec<Entity> {
        vec![commands.spawn(ActionButton::new("Pick")).id()]
    }
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
struct Heading(f32);

#[derive(Default)]
struct HeadingEditor {
    degrees: f32,
}

impl CustomPropertyEdit for HeadingEditor {
    fn bind_target(&mut self, target: &dyn PartialReflect) {
        if let Some(heading) = target.try_downcast_ref::<Heading>() {
            self.degrees = heading.0;
        }
    }

    fn edit_node_text(&self, default_text: &str) -> String {
        format!("{default_text} ({} deg)", self.degrees)
    }

    fn create_edit_affordances(&mut self, commands: &mut Commands) -> Vec<Entity> {
        vec![commands.spawn(ActionButton::new("Turn")).id()]
    }
}

#[derive(Default)]
struct SilentEditor;

impl CustomPropertyEdit for SilentEditor {
    fn create_edit_affordances(&mut self, _commands: &mut Commands) -> Vec<Entity> {
        Vec::new()
    }
}

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
struct Palette {
    tint: Tint,
    heading: Heading,
    level: u16,
}

fn palette_app() -> (App, Entity) {
    let mut app = app();
    app.register_type::<Palette>();
    let catalog = app.world().resource::<TypeCatalog>();
    catalog.add_custom_editor::<Heading, HeadingEditor>();
    catalog.add_custom_editor::<u16, SilentEditor>();

    let editor = editor(&mut app);
    let palette = Palette {
        tint: Tint { r: 255, g: 0, b: 0 },
        heading: Heading(90.0),
        level: 3,
    };
    set_root(app.world_mut(), editor, palette).unwrap();
    (app, editor)
}

#[test]
fn types_with_their_own_editor_drive_the_row() {
    let (mut app, editor) = palette_app();
    let tint = row(&app, editor, ".tint", RowSlot::Property);
    assert_eq!(label(&app, tint), "tint #ff0000");

    let pick = affordance(&app, tint, AffordanceRole::Custom);
    assert_eq!(app.world().get::<ActionButton>(pick).unwrap().label, "Pick");
    let placement = app.world().get::<Placement>(pick).unwrap();
    let viewport = app.world().get::<PropertyEditor>(editor).unwrap().viewport();
    assert!(placement.shown);
    assert_eq!(placement.rect.min.x, viewport.label_column);

    app.world_mut().trigger(CustomValueCommitted {
        entity: pick,
        value: Box::new(Tint { r: 0, g: 128, b: 255 }),
    });
    app.update();

    let property_editor = app.world().get::<PropertyEditor>(editor).unwrap();
    let palette = property_editor
        .root()
        .and_then(|root| root.downcast_ref::<Palette>())
        .unwrap();
    assert_eq!(palette.tint, Tint { r: 0, g: 128, b: 255 });
    assert_eq!(row(&app, editor, ".tint", RowSlot::Property), tint);
    assert_eq!(label(&app, tint), "tint #0080ff");
}

#[test]
fn external_editors_are_bound_by_exact_type() {
    let (app, editor) = palette_app();
    let heading = row(&app, editor, ".heading", RowSlot::Property);
    let property_editor = app.world().get::<PropertyEditor>(editor).unwrap();
    let kind = property_editor
        .tokens()
        .find(|(_, row)| *row == heading)
        .map(|(token, _)| token.kind);
    assert_eq!(kind, Some(RowKind::CustomEditorBound));
    assert_eq!(label(&app, heading), "heading (90 deg)");
    assert!(try_affordance(&app, heading, AffordanceRole::Custom).is_some());
}

#[test]
fn editors_without_affordances_fall_back_to_a_text_field() {
    let (app, editor) = palette_app();
    let level = row(&app, editor, ".level", RowSlot::Property);
    assert_eq!(label(&app, level), "level");
    assert!(try_affordance(&app, level, AffordanceRole::Custom).is_none());
    let field = affordance(&app, level, AffordanceRole::Value);
    assert_eq!(text(&app, field).value, "3");
}
