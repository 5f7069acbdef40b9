//! Demo configuration.
//!
//! Everything is optional: a missing file section, a missing field, or no
//! file at all falls back to the defaults below.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "floating_cubes": 50,
//!   "bounds": { "min": [-30, -10, -30], "max": [30, 10, 30], "wrap": true },
//!   "physics": { "gravity": [0, -9.81, 0], "cubes": 8 },
//!   "player": { "move_speed": 12.0 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::math::Vec3;
use crate::physics::DEFAULT_GRAVITY;
use crate::systems::PlayerTuning;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// World box used by the bounds system.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub min: Vec3,
    pub max: Vec3,
    pub wrap: bool,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            min: Vec3::new(-50.0, -20.0, -50.0),
            max: Vec3::new(50.0, 20.0, 50.0),
            wrap: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
    /// Dynamic cubes dropped onto the static floor.
    pub cubes: usize,
    /// Where the floor's top face sits.
    pub floor_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            cubes: 12,
            floor_height: -4.0,
        }
    }
}

/// Everything the demo scene is built from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed for every random choice in the demo.
    pub seed: u64,
    pub floating_cubes: usize,
    /// Ground tiles per side.
    pub ground_grid: usize,
    pub ground_spacing: f32,
    pub bounds: BoundsConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerTuning,
    pub viewport: [u32; 2],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            floating_cubes: 100,
            ground_grid: 11,
            ground_spacing: 4.0,
            bounds: BoundsConfig::default(),
            physics: PhysicsConfig::default(),
            player: PlayerTuning::default(),
            viewport: [1280, 720],
        }
    }
}

impl DemoConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded demo config from {}", path.display());
        Ok(config)
    }

    pub fn aspect_ratio(&self) -> f32 {
        let [w, h] = self.viewport;
        if h == 0 { 1.0 } else { w as f32 / h as f32 }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        if b.min.cmpgt(b.max).any() {
            return Err(ConfigError::Invalid(format!(
                "bounds min {:?} exceeds max {:?}",
                b.min, b.max
            )));
        }
        if self.ground_spacing <= 0.0 {
            return Err(ConfigError::Invalid("ground_spacing must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.player.friction) {
            return Err(ConfigError::Invalid("player friction must be in 0..=1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = DemoConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = DemoConfig::from_json_str(
            r#"{
                "seed": 7,
                "bounds": { "max": [30, 10, 30], "wrap": true },
                "physics": { "gravity": [0, -1.62, 0] },
                "player": { "move_speed": 12.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.bounds.max, Vec3::new(30.0, 10.0, 30.0));
        assert_eq!(config.bounds.min, BoundsConfig::default().min);
        assert!(config.bounds.wrap);
        assert_eq!(config.physics.gravity, Vec3::new(0.0, -1.62, 0.0));
        assert_eq!(config.physics.cubes, 12);
        assert_eq!(config.player.move_speed, 12.0);
        assert_eq!(config.player.jump_speed, 15.0);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = DemoConfig::from_json_str(r#"{ "bounds": { "min": [0, 0, 0], "max": [1, -1, 1] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = DemoConfig::from_json_str("{ seed: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DemoConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn aspect_ratio() {
        let mut config = DemoConfig::default();
        assert!((config.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        config.viewport = [100, 0];
        assert_eq!(config.aspect_ratio(), 1.0);
    }
}
