//! Render job configuration.
//!
//! Loaded from a JSON document with one object per section:
//!
//! ```json
//! {
//!   "camera":    { "width": 640, "height": 480, "center": [0, 1, 0],
//!                  "position": [0, 1, 4], "up": [0, 1, 0], "fovy": 45 },
//!   "job":       { "threads": 8, "partitions": 64 },
//!   "rendering": { "bounces": 4, "samples": 256, "epsilon": 0.0001,
//!                  "background": [0, 0, 0] },
//!   "loader":    { "textures": true, "normals": true },
//!   "debug":     { "normals": false, "diffuse": false }
//! }
//! ```
//!
//! `rendering.gamma`, `rendering.autosave_interval_ms` and `rendering.seed`
//! are optional.

use std::path::{Path, PathBuf};

use lumen_math::{Color, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_GAMMA: f32 = 2.2;
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Render width in pixels
    pub width: u32,
    /// Render height in pixels
    pub height: u32,
    /// Point the camera looks at
    pub center: Vec3,
    /// Camera position in scene coordinates
    pub position: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fovy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Number of render threads
    pub threads: usize,
    /// Number of work units the image is split into
    pub partitions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Path depth at which Russian roulette starts
    pub bounces: u32,
    /// Samples per pixel
    pub samples: u32,
    /// Offset applied to secondary ray origins to escape the surface
    pub epsilon: f32,
    /// Uniform environment color returned by rays that escape
    pub background: Color,
    /// Display gamma applied when the image is written
    #[serde(default = "default_gamma")]
    pub gamma: f32,
    /// Interval between progressive saves
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,
    /// Base seed for the worker random streams; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_gamma() -> f32 {
    DEFAULT_GAMMA
}

fn default_autosave_interval_ms() -> u64 {
    DEFAULT_AUTOSAVE_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Load diffuse textures referenced by materials
    pub textures: bool,
    /// Use vertex normals from the file; flat shading otherwise
    pub normals: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Render shading normals only
    pub normals: bool,
    /// Render diffuse color only
    pub diffuse: bool,
}

impl DebugConfig {
    /// True if any debug visualisation is enabled.
    pub fn any(&self) -> bool {
        self.normals || self.diffuse
    }
}

/// Complete render job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub camera: CameraConfig,
    pub job: JobConfig,
    pub rendering: RenderingConfig,
    pub loader: LoaderConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let mut config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and apply derived settings.
    ///
    /// Debug visualisations are deterministic, so they force a single
    /// sample per pixel.
    pub fn validate(&mut self) -> ConfigResult<()> {
        if self.job.threads < 1 {
            return Err(ConfigError::Invalid(
                "at least 1 render thread is required".into(),
            ));
        }
        if self.job.partitions < 1 {
            return Err(ConfigError::Invalid(
                "at least 1 partition is required".into(),
            ));
        }
        if self.rendering.samples < 1 {
            return Err(ConfigError::Invalid(
                "at least 1 sample per pixel is required".into(),
            ));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image dimensions must be positive, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }
        if self.rendering.gamma.is_nan() || self.rendering.gamma <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gamma must be positive, got {}",
                self.rendering.gamma
            )));
        }

        if self.debug.any() {
            self.rendering.samples = 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "camera": {
            "width": 320, "height": 240,
            "center": [0.0, 1.0, 0.0],
            "position": [0.0, 1.0, 4.0],
            "up": [0.0, 1.0, 0.0],
            "fovy": 45.0
        },
        "job": { "threads": 4, "partitions": 16 },
        "rendering": {
            "bounces": 3, "samples": 64, "epsilon": 0.0001,
            "background": [0.1, 0.2, 0.3]
        },
        "loader": { "textures": true, "normals": false },
        "debug": { "normals": false, "diffuse": false }
    }"#;

    fn sample() -> serde_json::Value {
        serde_json::from_str(SAMPLE).unwrap()
    }

    fn parse(value: serde_json::Value) -> ConfigResult<Config> {
        Config::from_json_str(&value.to_string())
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.camera.width, 320);
        assert_eq!(config.camera.position, Vec3::new(0.0, 1.0, 4.0));
        assert_eq!(config.job.partitions, 16);
        assert_eq!(config.rendering.samples, 64);
        assert_eq!(config.rendering.background, Color::new(0.1, 0.2, 0.3));
        assert!(!config.loader.normals);
    }

    #[test]
    fn test_optional_rendering_keys_default() {
        let config = Config::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.rendering.gamma, DEFAULT_GAMMA);
        assert_eq!(config.rendering.autosave_interval_ms, DEFAULT_AUTOSAVE_INTERVAL_MS);
        assert_eq!(config.rendering.seed, None);
    }

    #[test]
    fn test_optional_rendering_keys_override() {
        let mut value = sample();
        value["rendering"]["gamma"] = 1.0.into();
        value["rendering"]["seed"] = 7.into();

        let config = parse(value).unwrap();
        assert_eq!(config.rendering.gamma, 1.0);
        assert_eq!(config.rendering.seed, Some(7));
    }

    #[test]
    fn test_debug_forces_single_sample() {
        let mut value = sample();
        value["debug"]["diffuse"] = true.into();

        let config = parse(value).unwrap();
        assert_eq!(config.rendering.samples, 1);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut value = sample();
        value["job"]["threads"] = 0.into();

        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let mut value = sample();
        value["job"]["partitions"] = 0.into();

        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut value = sample();
        value["rendering"]["samples"] = 0.into();

        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("loader");

        assert!(matches!(parse(value), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/lumen-config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
