//! Sketch configuration.
//!
//! Everything the sketch treats as a constant lives here so a host can
//! override it from a JSON file. Missing fields fall back to the defaults
//! of the DNA helix sketch.

use crate::scene::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Perspective camera parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 70.0,
            near: 0.001,
            far: 1000.0,
            distance: 4.0,
        }
    }
}

/// Top-level sketch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Time added per rendered frame.
    pub time_step: f32,
    /// Model rotation around Y is `time / rotation_divisor`.
    pub rotation_divisor: f32,
    pub camera: CameraConfig,
    /// The three particle base colors as hex strings.
    pub colors: [String; 3],
    pub clear_color: String,
    /// Particle diameter in pixels at unit view distance.
    pub point_size: f32,
    /// Initial slider values.
    pub settings: Settings,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            time_step: 0.05,
            rotation_divisor: 25.0,
            camera: CameraConfig::default(),
            colors: [
                "#612574".to_string(),
                "#293583".to_string(),
                "#1954ec".to_string(),
            ],
            clear_color: "#000000".to_string(),
            point_size: 30.0,
            settings: Settings::default(),
        }
    }
}

impl SketchConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse configuration from a JSON string and validate it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail later in the render loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation_divisor == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "rotation_divisor",
                reason: "must be non-zero".to_string(),
            });
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::InvalidValue {
                field: "camera",
                reason: format!(
                    "need 0 < near < far, got {} / {}",
                    self.camera.near, self.camera.far
                ),
            });
        }
        self.base_colors()?;
        self.clear_rgb()?;
        Ok(())
    }

    /// The three particle colors as linear RGB floats.
    pub fn base_colors(&self) -> Result<[[f32; 3]; 3], ConfigError> {
        let parse = |hex: &String| {
            parse_hex_color(hex).ok_or_else(|| ConfigError::InvalidColor(hex.clone()))
        };
        Ok([parse(&self.colors[0])?, parse(&self.colors[1])?, parse(&self.colors[2])?])
    }

    /// Background clear color.
    pub fn clear_rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.clear_color)
            .ok_or_else(|| ConfigError::InvalidColor(self.clear_color.clone()))
    }
}

/// Parse hex color to RGB floats (accepts 6-char RGB or 8-char RGBA, alpha is ignored).
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()? as f32 / 255.0;
    Some([r, g, b])
}
