//! Configuration types for fleets and the synchronization engine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Pixel, Rgb};

/// Protocol version understood by current real-time firmware.
pub const DEFAULT_PROTOCOL_VERSION: u8 = 3;

fn default_protocol_version() -> u8 {
    DEFAULT_PROTOCOL_VERSION
}

fn default_hold_secs() -> f32 {
    1.0
}

/// Stable identity of a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Pixel-count metadata for one device, the input of topology construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Stable identifier (typically the hardware address).
    pub id: DeviceId,
    /// Number of LEDs on the string.
    pub led_count: usize,
    /// Optional ordering hint; lower positions come first.
    #[serde(default)]
    pub position: Option<i32>,
}

impl DeviceSpec {
    pub fn new(id: impl Into<DeviceId>, led_count: usize) -> Self {
        Self {
            id: id.into(),
            led_count,
            position: None,
        }
    }

    pub fn with_position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }
}

/// Synchronization engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Real-time protocol version tagged on every frame.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u8,
    /// Pause after the convergence fronts meet, before the fleet is reset.
    #[serde(default = "default_hold_secs")]
    pub hold_secs: f32,
    /// Marker of the front travelling up from index 0.
    pub lower_marker: Pixel,
    /// Marker of the front travelling down from the last index.
    pub upper_marker: Pixel,
    /// Hue of the converging-brightness effect at full brightness.
    pub brightness_hue: Rgb,
    /// Value of unlit LEDs.
    pub off: Pixel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            hold_secs: default_hold_secs(),
            lower_marker: Pixel::new(255, 150, 85, 0),
            upper_marker: Pixel::new(0, 0, 0, 255),
            brightness_hue: Rgb::new(255, 223, 191),
            off: Pixel::OFF,
        }
    }
}

impl EngineConfig {
    /// Hold duration as a [`Duration`].
    pub fn hold(&self) -> Result<Duration, ConfigError> {
        super::effect::secs_to_duration(self.hold_secs, ConfigError::InvalidDuration)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol_version == 0 {
            return Err(ConfigError::InvalidProtocolVersion);
        }
        if !self.hold_secs.is_finite() || self.hold_secs < 0.0 {
            return Err(ConfigError::InvalidDuration);
        }
        self.hold().map(|_| ())
    }
}

/// Configuration and parameter validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Device list is empty")]
    EmptyFleet,
    #[error("Device {device} reports zero LEDs")]
    ZeroLedCount { device: DeviceId },
    #[error("Device {device} appears more than once")]
    DuplicateDevice { device: DeviceId },
    #[error("Frame {frame} has {found} pixels, expected {expected}")]
    UnevenMovie {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("Trail length must be non-zero")]
    ZeroTrailLength,
    #[error("Pattern row {row} has {found} cells, expected {expected}")]
    RaggedPattern {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Grid dimensions must be non-zero")]
    EmptyGrid,
    #[error("Density {0} is outside [0, 1]")]
    InvalidDensity(f32),
    #[error("Duration must be finite and non-negative")]
    InvalidDuration,
    #[error("Rate must be finite and positive")]
    InvalidRate,
    #[error("Brightness {0} is outside [0, 1]")]
    InvalidBrightness(f32),
    #[error("Target {target} is outside 0..{len}")]
    TargetOutOfRange { target: usize, len: usize },
    #[error("Protocol version must be non-zero")]
    InvalidProtocolVersion,
}
