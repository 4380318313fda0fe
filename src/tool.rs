use egui::Color32;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
        }
    }
}

/// How a stroke is composited onto the surface
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlendMode {
    /// Paint over existing pixels
    SourceOver,
    /// Remove existing pixels where the stroke covers them
    DestinationOut,
}

impl From<Tool> for BlendMode {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Pen => BlendMode::SourceOver,
            Tool::Eraser => BlendMode::DestinationOut,
        }
    }
}

/// Current tool, color and size picked in the toolbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub tool: Tool,
    pub color: Color32,
    pub size: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: Color32::WHITE,
            size: 5.0,
        }
    }
}

/// Parse `#rrggbb`, `#rrggbbaa` or `#rgb` into a color
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        3 => {
            let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

/// Format a color as `#rrggbb`, dropping alpha
pub fn to_hex_color(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}
