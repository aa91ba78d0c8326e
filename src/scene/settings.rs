//! Live-tunable settings and the slider panel that edits them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four tunable values read by the render step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Exposed as a control; the render step does not consume it.
    pub progress: f32,
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            progress: 0.0,
            bloom_threshold: 1.4,
            bloom_strength: 0.9,
            bloom_radius: 0.01,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::Progress => self.progress,
            SettingKey::BloomThreshold => self.bloom_threshold,
            SettingKey::BloomStrength => self.bloom_strength,
            SettingKey::BloomRadius => self.bloom_radius,
        }
    }

    fn slot(&mut self, key: SettingKey) -> &mut f32 {
        match key {
            SettingKey::Progress => &mut self.progress,
            SettingKey::BloomThreshold => &mut self.bloom_threshold,
            SettingKey::BloomStrength => &mut self.bloom_strength,
            SettingKey::BloomRadius => &mut self.bloom_radius,
        }
    }
}

/// Identifies one of the tunable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Progress,
    BloomThreshold,
    BloomStrength,
    BloomRadius,
}

impl FromStr for SettingKey {
    type Err = ControlError;

    /// Accepts the panel name or its snake_case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "progress" => Ok(Self::Progress),
            "bloomThreshold" | "bloom_threshold" => Ok(Self::BloomThreshold),
            "bloomStrength" | "bloom_strength" => Ok(Self::BloomStrength),
            "bloomRadius" | "bloom_radius" => Ok(Self::BloomRadius),
            _ => Err(ControlError::UnknownControl(s.to_string())),
        }
    }
}

impl SettingKey {
    /// Name shown on the control panel.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::BloomThreshold => "bloomThreshold",
            Self::BloomStrength => "bloomStrength",
            Self::BloomRadius => "bloomRadius",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Progress,
            Self::BloomThreshold,
            Self::BloomStrength,
            Self::BloomRadius,
        ]
    }

    /// Slider bounds for this setting.
    pub fn slider(&self) -> SliderSpec {
        let max = match self {
            Self::Progress => 1.0,
            _ => 10.0,
        };
        SliderSpec {
            key: *self,
            min: 0.0,
            max,
            step: 0.01,
        }
    }
}

/// Bounds of a numeric slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub key: SettingKey,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderSpec {
    /// Clamp to the slider range and snap to the nearest step.
    pub fn apply(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let divisions = (1.0 / self.step).round();
        let snapped = ((clamped - self.min) * divisions).round() / divisions + self.min;
        snapped.clamp(self.min, self.max)
    }
}

/// Errors from the control panel.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ControlError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),
}

/// Slider panel bound to a [`Settings`] value.
///
/// Edits go through the slider bounds; reads return the live values.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    settings: Settings,
    sliders: Vec<SliderSpec>,
}

impl ControlPanel {
    pub fn new(initial: Settings) -> Self {
        let sliders: Vec<SliderSpec> = SettingKey::all().iter().map(|k| k.slider()).collect();
        let mut settings = Settings::default();
        for slider in &sliders {
            *settings.slot(slider.key) = slider.apply(initial.get(slider.key));
        }
        Self { settings, sliders }
    }

    /// Set a value through its slider. Returns the value actually stored.
    pub fn set(&mut self, key: SettingKey, value: f32) -> f32 {
        let applied = key.slider().apply(value);
        *self.settings.slot(key) = applied;
        log::debug!("{} = {}", key.name(), applied);
        applied
    }

    /// Set a value by its panel name.
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<f32, ControlError> {
        let key: SettingKey = name.parse()?;
        Ok(self.set(key, value))
    }

    pub fn get(&self, key: SettingKey) -> f32 {
        self.settings.get(key)
    }

    /// Current values, as read once per frame.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sliders(&self) -> &[SliderSpec] {
        &self.sliders
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
