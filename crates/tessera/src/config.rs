//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every section and field is optional;
//! anything missing falls back to the engine defaults.
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [frame]
//! target_fps = 125
//!
//! [scheduler]
//! max_workers = 8
//!
//! [radar]
//! target_offset = [24.0, 24.0]
//! ```

use std::path::Path;

use serde::Deserialize;
use tessera_core::SchedulerConfig;
use tessera_shared::constants::{
    ENTITIES_PER_WORKER, EVENT_CHANNEL_CAPACITY, MAX_DELTA_SECONDS,
    MIN_WORKERS, SCREEN_HEIGHT, SCREEN_WIDTH, SMALL_SET_THRESHOLD, TARGET_FPS, WAYPOINT_EPSILON,
};
use tessera_shared::Vec2;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Window and logical screen size.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title shown by the platform layer.
    pub title: String,
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tessera".to_owned(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
        }
    }
}

/// Frame pacing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frames per second the loop paces to.
    pub target_fps: u32,
    /// Largest delta (seconds) handed to systems.
    pub max_delta: f32,
    /// Log a warning when a frame exceeds its budget.
    pub warn_on_overrun: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            max_delta: MAX_DELTA_SECONDS,
            warn_on_overrun: false,
        }
    }
}

/// Worker count derivation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Sets up to this size use `min_workers`.
    pub small_set_threshold: usize,
    /// One extra worker per this many entities.
    pub entities_per_worker: usize,
    /// Workers for small sets.
    pub min_workers: usize,
    /// Hard cap; hardware concurrency when absent.
    pub max_workers: Option<usize>,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            small_set_threshold: SMALL_SET_THRESHOLD,
            entities_per_worker: ENTITIES_PER_WORKER,
            min_workers: MIN_WORKERS,
            max_workers: None,
        }
    }
}

/// Event bus sizing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Queue capacity of each subscriber.
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// Waypoint navigation tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Distance at which a waypoint counts as reached.
    pub waypoint_epsilon: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            waypoint_epsilon: WAYPOINT_EPSILON,
        }
    }
}

/// Radar tuning.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Added to every candidate's position before measuring distance.
    pub target_offset: [f32; 2],
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings.
    pub window: WindowConfig,
    /// Frame pacing.
    pub frame: FrameConfig,
    /// Parallel scheduling.
    pub scheduler: SchedulerSection,
    /// Event bus.
    pub events: EventsConfig,
    /// Waypoint navigation.
    pub navigation: NavigationConfig,
    /// Radar detection.
    pub radar: RadarConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or wrong types,
    /// [`ConfigError::InvalidValue`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file can't be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Reads `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::load`] when the file exists but is invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.target_fps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "frame.target_fps",
                reason: "must be positive".to_owned(),
            });
        }
        if self.frame.max_delta.is_nan() || self.frame.max_delta <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "frame.max_delta",
                reason: format!("must be positive, got {}", self.frame.max_delta),
            });
        }
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.channel_capacity",
                reason: "must be positive".to_owned(),
            });
        }
        if self.scheduler.max_workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.max_workers",
                reason: "must be positive when set".to_owned(),
            });
        }
        if self.navigation.waypoint_epsilon < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "navigation.waypoint_epsilon",
                reason: "must not be negative".to_owned(),
            });
        }
        Ok(())
    }

    /// Scheduler settings in the form the core expects.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            small_set_threshold: self.scheduler.small_set_threshold,
            entities_per_worker: self.scheduler.entities_per_worker,
            min_workers: self.scheduler.min_workers,
            max_workers: self.scheduler.max_workers,
        }
    }

    /// Radar target offset as a vector.
    #[must_use]
    pub fn radar_target_offset(&self) -> Vec2 {
        Vec2::from(self.radar.target_offset)
    }

    /// Frame budget in milliseconds.
    #[must_use]
    pub fn frame_budget_ms(&self) -> u64 {
        1000 / u64::from(self.frame.target_fps.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.frame.target_fps, 125);
        assert_eq!(config.frame_budget_ms(), 8);
        assert_eq!(config.radar_target_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
            [scheduler]
            max_workers = 3

            [radar]
            target_offset = [24.0, 24.0]
        "#;
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.scheduler().max_workers, Some(3));
        assert_eq!(config.scheduler().min_workers, 2);
        assert_eq!(config.radar_target_offset(), Vec2::new(24.0, 24.0));
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("[frame]\ntarget_fps = 0"),
            Err(ConfigError::InvalidValue { field: "frame.target_fps", .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[frame]\ntarget_fps = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("tessera_config_that_does_not_exist.toml");
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(
            EngineConfig::load_or_default(&path).unwrap(),
            EngineConfig::default()
        );
    }
}
