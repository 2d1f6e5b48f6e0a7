use bevy::prelude::*;
use proptree_widgets::{TreeMetrics, tokens};
use serde::{Deserialize, Serialize};

/// Metrics and limits shared by every property editor in the app.
#[derive(Resource, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[reflect(Resource, Default)]
#[serde(default)]
pub struct PropertyEditorSettings {
    pub row_height: f32,
    pub indent: f32,
    pub glyph_width: f32,
    /// Gap between the widest visible label and the affordance column.
    pub affordance_margin: f32,
    /// Affordances sit this far below the top of their row.
    pub vertical_inset: f32,
    /// Traversal stops descending below this many nested objects.
    pub max_depth: usize,
    pub erase_button_width: f32,
    pub selector_reserve: f32,
    pub picker_gap: f32,
}

impl Default for PropertyEditorSettings {
    fn default() -> Self {
        Self {
            row_height: tokens::ROW_HEIGHT,
            indent: tokens::INDENT,
            glyph_width: tokens::GLYPH_WIDTH,
            affordance_margin: tokens::AFFORDANCE_MARGIN,
            vertical_inset: tokens::VERTICAL_INSET,
            max_depth: 32,
            erase_button_width: tokens::ERASE_BUTTON_WIDTH,
            selector_reserve: tokens::SELECTOR_RESERVE,
            picker_gap: tokens::PICKER_GAP,
        }
    }
}

impl PropertyEditorSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn metrics(&self) -> TreeMetrics {
        TreeMetrics {
            row_height: self.row_height,
            indent: self.indent,
            glyph_width: self.glyph_width,
        }
    }
}
