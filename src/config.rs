use crate::error::{ConfigError, ConfigResult};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::surface::PaintStyle;
use crate::tool::{BrushSettings, Tool, parse_hex_color};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable the native host reads a config path from
pub const CONFIG_ENV_VAR: &str = "GRAFFITI_CONFIG";

/// Tunables for an overlay session and its export pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to defaults
pub struct OverlayConfig {
    /// Snapshots kept for undo, including the blank starting frame
    pub max_history_length: usize,
    /// Minimum time the toolbar stays hidden before the page is captured
    pub capture_settle_ms: u64,
    /// Initial pen color as `#rrggbb`
    pub brush_color: String,
    pub brush_size: f32,
    pub min_brush_size: f32,
    pub max_brush_size: f32,
    /// Exported files are named `<prefix>-<timestamp>.png`
    pub file_prefix: String,
    /// Where the native host writes exports; current directory if unset
    pub output_dir: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY,
            capture_settle_ms: 150,
            brush_color: "#ffffff".to_owned(),
            brush_size: 5.0,
            min_brush_size: 1.0,
            max_brush_size: 50.0,
            file_prefix: "graffiti".to_owned(),
            output_dir: None,
        }
    }
}

impl OverlayConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Config from the file named by `GRAFFITI_CONFIG`, or defaults
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_history_length == 0 {
            return Err(ConfigError::Invalid(
                "max_history_length must be at least 1".to_owned(),
            ));
        }
        if !(self.min_brush_size >= 1.0 && self.min_brush_size <= self.max_brush_size) {
            return Err(ConfigError::Invalid(format!(
                "brush size range {}..={} is invalid",
                self.min_brush_size, self.max_brush_size
            )));
        }
        if !(self.min_brush_size..=self.max_brush_size).contains(&self.brush_size) {
            return Err(ConfigError::Invalid(format!(
                "brush_size {} is outside {}..={}",
                self.brush_size, self.min_brush_size, self.max_brush_size
            )));
        }
        if parse_hex_color(&self.brush_color).is_none() {
            return Err(ConfigError::Invalid(format!(
                "brush_color {:?} is not a hex color",
                self.brush_color
            )));
        }
        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "file_prefix {:?} is not a plain file name",
                self.file_prefix
            )));
        }
        Ok(())
    }

    pub fn capture_settle(&self) -> Duration {
        Duration::from_millis(self.capture_settle_ms)
    }

    /// Brush a fresh session starts with
    pub fn initial_brush(&self) -> BrushSettings {
        let defaults = BrushSettings::default();
        BrushSettings {
            tool: Tool::Pen,
            color: parse_hex_color(&self.brush_color).unwrap_or(defaults.color),
            size: self.clamp_brush_size(self.brush_size),
        }
    }

    pub fn initial_style(&self) -> PaintStyle {
        let brush = self.initial_brush();
        PaintStyle {
            color: brush.color,
            width: brush.size,
        }
    }

    /// Never panics, even on a config that fails `validate`
    pub fn clamp_brush_size(&self, size: f32) -> f32 {
        size.max(self.min_brush_size).min(self.max_brush_size)
    }
}
