use bevy::color::palettes::css;
use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Tree metrics
// ---------------------------------------------------------------------------

/// Height of one tree row.
pub const ROW_HEIGHT: f32 = 19.0;
/// Horizontal indentation per tree level (the first level leaves room for the expander).
pub const INDENT: f32 = 19.0;
/// Advance of one label glyph.
pub const GLYPH_WIDTH: f32 = 7.0;
/// Padding added to the right of every label.
pub const LABEL_PADDING: f32 = 4.0;

// ---------------------------------------------------------------------------
// Affordance column
// ---------------------------------------------------------------------------

/// Gap between the widest visible label and the affordance column.
pub const AFFORDANCE_MARGIN: f32 = 16.0;
/// Affordances sit this far below the top of their row.
pub const VERTICAL_INSET: f32 = 2.0;
/// Width of the erase button on list element rows.
pub const ERASE_BUTTON_WIDTH: f32 = 20.0;
/// Space kept free to the right of a type selector for its action button.
pub const SELECTOR_RESERVE: f32 = 50.0;
/// Gap between a type selector and its action button.
pub const PICKER_GAP: f32 = 8.0;

// ---------------------------------------------------------------------------
// Text field states
// ---------------------------------------------------------------------------

/// Field shows the stored value.
pub const FIELD_BG: Color = Color::Srgba(css::WHITE);
/// Field holds an uncommitted value that converts.
pub const FIELD_PENDING_BG: Color = Color::Srgba(css::LIGHT_GRAY);
/// Field holds a value that does not convert.
pub const FIELD_INVALID_BG: Color = Color::Srgba(css::INDIAN_RED);

pub const FONT_SM: f32 = 12.0;
pub const TEXT_COLOR: Color = Color::Srgba(css::BLACK);
pub const BUTTON_BG: Color = Color::Srgba(css::GAINSBORO);
