//=========================================================================
// Café Configuration
//=========================================================================
//
// Runtime tunables with defaults matching the stock café. Every section
// may be omitted from a config file; missing fields fall back to their
// defaults.
//
// Sources (lowest to highest precedence):
//   CafeConfig::default() → JSON file → CafeBuilder overrides
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use log::debug;
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::core::navigator::{CameraPose, RoomBounds};

//=== ConfigError =========================================================

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(std::io::Error),

    /// Config file is not valid JSON for [`CafeConfig`].
    Parse(serde_json::Error),

    /// A value is outside its accepted range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Config read failed: {}", e),
            Self::Parse(e) => write!(f, "Config parse failed: {}", e),
            Self::Invalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

//=== Sections ============================================================

/// Remote endpoint settings shared by the credits and game-session clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Camera room box, starting pose and default tween length.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub initial_position: [f32; 3],
    pub initial_look_at: [f32; 3],
    pub transition_seconds: f32,
}

impl CameraConfig {
    pub fn bounds(&self) -> RoomBounds {
        RoomBounds::new(
            Vec3::from_array(self.bounds_min),
            Vec3::from_array(self.bounds_max),
        )
    }

    pub fn initial_pose(&self) -> CameraPose {
        CameraPose::new(
            Vec3::from_array(self.initial_position),
            Vec3::from_array(self.initial_look_at),
        )
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            bounds_min: [-10.0, 0.5, -10.0],
            bounds_max: [10.0, 7.5, 10.0],
            initial_position: [-2.0, 3.0, 10.0],
            initial_look_at: [0.0, 0.0, 0.0],
            transition_seconds: 1.5,
        }
    }
}

/// Station overlay and delayed navigation timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub overlay_display_ms: u64,
    pub navigation_delay_ms: u64,
    pub message_pool: Vec<String>,
}

impl InteractionConfig {
    pub fn overlay_display(&self) -> Duration {
        Duration::from_millis(self.overlay_display_ms)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            overlay_display_ms: 3_000,
            navigation_delay_ms: 1_600,
            message_pool: [
                "This seat is taken, try another station!",
                "Shh... boss fight in progress.",
                "One more round, I promise.",
                "GG! Find your own rig.",
                "Busy climbing the leaderboard!",
                "Do not touch, high score attempt.",
            ]
            .iter()
            .map(|line| line.to_string())
            .collect(),
        }
    }
}

/// Embedded game host timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub ready_timeout_ms: u64,
}

impl HostConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 1_500,
        }
    }
}

//=== CafeConfig ==========================================================

/// Top-level configuration for a café runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CafeConfig {
    /// Logic ticks per second.
    pub tps: f64,

    /// Capacity of the user event channel.
    pub channel_capacity: usize,

    /// Seed for overlay lines and placeholder game pieces.
    pub rng_seed: u64,

    /// Delay between clicking the door and entering the café.
    pub door_delay_ms: u64,

    pub credits: EndpointConfig,
    pub game_api: EndpointConfig,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    pub host: HostConfig,
}

impl Default for CafeConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            rng_seed: 0x00C0_FFEE,
            door_delay_ms: 1_200,
            credits: EndpointConfig::default(),
            game_api: EndpointConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_ms: 10_000,
            },
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
            host: HostConfig::default(),
        }
    }
}

impl CafeConfig {
    //--- Loading ----------------------------------------------------------

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(target: "config", "Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    //--- Validation -------------------------------------------------------

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tps.is_nan() || self.tps <= 0.0 {
            return Err(ConfigError::Invalid(format!("tps must be positive, got {}", self.tps)));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be positive".into()));
        }
        let (min, max) = (self.camera.bounds_min, self.camera.bounds_max);
        if min.iter().zip(max.iter()).any(|(lo, hi)| lo > hi) {
            return Err(ConfigError::Invalid(format!(
                "camera bounds_min {:?} exceeds bounds_max {:?}",
                min, max
            )));
        }
        if self.interaction.message_pool.is_empty() {
            return Err(ConfigError::Invalid("message_pool must not be empty".into()));
        }
        if self.credits.base_url.is_empty() || self.game_api.base_url.is_empty() {
            return Err(ConfigError::Invalid("service base_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn door_delay(&self) -> Duration {
        Duration::from_millis(self.door_delay_ms)
    }
}

//=========================================================================
// Tests
//=========================================================================
