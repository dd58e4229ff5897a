//! Configuration
//!
//! Any serde type can be loaded from or saved to TOML or RON through the
//! [`Config`] trait; the format follows the file extension.

use crate::foundation::logging::LoggingConfig;
use crate::frame::TimestepMode;
use crate::scene::ViewportOptions;
use std::path::Path;

/// Slowest accepted frame rate: one tick every ~17 minutes
pub const MIN_FRAME_RATE: f64 = 0.001;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match Format::of(path)? {
            Format::Toml => Self::from_toml(&contents),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Parse TOML text
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Game instance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target ticks per second
    pub frame_rate: f64,
    /// How tick deadlines are scheduled
    pub timestep: TimestepMode,
    /// Surface selector for viewports that do not name one
    pub default_surface: String,
    /// Master switch for clearing viewports before drawing
    pub clear_viewports: bool,
    /// Logger settings
    pub logging: LoggingConfig,
    /// Viewports created with the game, in order
    pub viewports: Vec<ViewportOptions>,
}

impl GameConfig {
    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_rate.is_finite() && self.frame_rate >= MIN_FRAME_RATE) {
            return Err(ConfigError::Invalid {
                field: "frame_rate",
                reason: format!(
                    "must be a finite number of at least {MIN_FRAME_RATE}, got {}",
                    self.frame_rate
                ),
            });
        }
        if self.default_surface.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_surface",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            timestep: TimestepMode::Variable,
            default_surface: "#canvas".to_string(),
            clear_viewports: true,
            logging: LoggingConfig::default(),
            viewports: Vec::new(),
        }
    }
}

impl Config for GameConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.frame_rate, 60.0);
        assert_eq!(config.default_surface, "#canvas");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = GameConfig::from_toml(
            r##"
            frame_rate = 30.0
            timestep = "fixed"

            [logging]
            filter = "whirl_engine=debug"

            [[viewports]]
            zoom = 2.0
            surface = "#hud"
            "##,
        )
        .unwrap();

        assert_relative_eq!(config.frame_rate, 30.0);
        assert_eq!(config.timestep, TimestepMode::Fixed);
        assert_eq!(config.logging.filter.as_deref(), Some("whirl_engine=debug"));
        assert!(config.clear_viewports);
        assert_eq!(config.viewports.len(), 1);
        assert_eq!(config.viewports[0].surface.as_deref(), Some("#hud"));
        assert!(config.viewports[0].clip);
    }

    #[test]
    fn non_positive_frame_rate_is_rejected() {
        let config = GameConfig {
            frame_rate: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "frame_rate", .. })
        ));
    }

    #[test]
    fn vanishing_frame_rate_is_rejected() {
        for frame_rate in [1e-20, MIN_FRAME_RATE / 2.0, f64::INFINITY] {
            let config = GameConfig {
                frame_rate,
                ..GameConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid { field: "frame_rate", .. })
                ),
                "{frame_rate} was accepted"
            );
        }
        let slowest = GameConfig {
            frame_rate: MIN_FRAME_RATE,
            ..GameConfig::default()
        };
        assert!(slowest.validate().is_ok());
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = GameConfig::default().save_to_file("game.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn ron_round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("whirl-config-{}.ron", std::process::id()));
        let config = GameConfig {
            frame_rate: 144.0,
            default_surface: "#main".to_string(),
            ..GameConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = GameConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }
}
