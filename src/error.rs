//! Error types shared across the crate.

use crate::schema::{ConfigError, DeviceId};

/// Error reported by an external device collaborator (lifecycle or transport).
///
/// The core never inspects these beyond logging and wrapping them.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used by the fleet-level operations.
pub type FleetResult<T> = Result<T, FleetError>;

/// Failure to push a frame to a single device.
#[derive(Debug, thiserror::Error)]
pub enum TransmissionError {
    #[error("frame of {found} pixels does not fit device {device} with {expected} LEDs")]
    LengthMismatch {
        device: DeviceId,
        expected: usize,
        found: usize,
    },
    #[error("transport to device {device} failed: {source}")]
    Transport {
        device: DeviceId,
        #[source]
        source: CapabilityError,
    },
}

impl TransmissionError {
    /// Device the failed transmission was addressed to.
    pub fn device(&self) -> &DeviceId {
        match self {
            Self::LengthMismatch { device, .. } | Self::Transport { device, .. } => device,
        }
    }
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("global index {index} out of range (total {total} LEDs)")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("frame of {found} pixels fits neither the global space of {total} LEDs nor each device")]
    FrameShape { found: usize, total: usize },

    #[error("transmission error: {0}")]
    Transmission(#[from] TransmissionError),

    #[error("lifecycle call on device {device} failed: {source}")]
    Lifecycle {
        device: DeviceId,
        #[source]
        source: CapabilityError,
    },

    /// Cooperative stop request observed at a tick boundary.
    #[error("effect session cancelled")]
    Cancelled,

    #[error("fleet lock poisoned by a panicking session")]
    LockPoisoned,
}

impl FleetError {
    /// True for the cooperative cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
