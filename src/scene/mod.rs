//! CPU-side scene state.
//!
//! This module provides:
//! - Perspective camera and projection math
//! - Particle buffer derivation from mesh positions
//! - Live-tunable settings and their slider panel

pub mod camera;
pub mod particles;
pub mod settings;

pub use camera::PerspectiveCamera;
pub use particles::{ParticleBuffer, ParticleInstance};
pub use settings::{ControlError, ControlPanel, SettingKey, Settings, SliderSpec};
