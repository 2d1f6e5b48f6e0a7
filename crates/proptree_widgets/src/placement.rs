use bevy::prelude::*;

/// Where an affordance sits inside its editor, and whether it is shown.
///
/// Rectangles are in editor-local pixels with y growing downwards.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub shown: bool,
}

impl Placement {
    pub fn place(&mut self, min: Vec2, size: Vec2) {
        self.rect = Rect::from_corners(min, min + size);
    }

    pub fn show(&mut self) {
        self.shown = true;
    }

    pub fn hide(&mut self) {
        self.shown = false;
    }
}
