//! LED Fleet - Synchronized real-time animation across networked LED strings.
//!
//! This crate treats a set of independently addressable WRGB LED strings as
//! one logical display. It generates frames procedurally, splits them along
//! a global index space and pushes them to every device in lockstep.
//!
//! # Architecture
//!
//! - `schema`: Pixel data model, engine configuration and effect parameters
//! - `pattern`: Pure frame and movie generators
//! - `topology`: Mapping between global LED indices and per-device indices
//! - `device`: Capability traits of the external device collaborators, and the fleet
//! - `transmit`: Frame encoding, single-device delivery and pacing
//! - `sync`: Fleet-wide effects, sessions and cancellation
//! - `sim`: In-memory device for dry runs and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use led_fleet::{
//!     device::{Device, Fleet},
//!     schema::{ConvergenceParams, EngineConfig, LoopPolicy, PatternSpec, Rgb},
//!     sim::SimulatedDevice,
//!     sync::SyncEngine,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let devices = vec![
//!     Device::new("tree-1", 10, Arc::new(SimulatedDevice::new(10))),
//!     Device::new("tree-2", 5, Arc::new(SimulatedDevice::new(5))),
//!     Device::new("tree-3", 8, Arc::new(SimulatedDevice::new(8))),
//! ];
//! let engine = SyncEngine::new(Fleet::new(devices)?, EngineConfig::default())?;
//! engine.turn_on_all()?;
//!
//! // A trail running over all 23 LEDs as if they were one string
//! let trail = PatternSpec::Trail {
//!     color: Rgb::new(255, 0, 0),
//!     trail_length: 5,
//!     white_peak: 1,
//! };
//! engine.play_pattern(&trail, Duration::from_millis(20), LoopPolicy::Count(2))?;
//!
//! // Two fronts meeting on global LED 12 after one second
//! let report = engine.run_convergence(&ConvergenceParams {
//!     target: 12,
//!     duration_secs: 2.0,
//!     tick_rate: 30.0,
//! })?;
//! println!("{:?} after {} ticks", report.state, report.ticks);
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod error;
pub mod pattern;
pub mod schema;
pub mod sim;
pub mod sync;
pub mod topology;
pub mod transmit;

// Re-export commonly used types
pub use device::{Device, DeviceLifecycle, DeviceTransport, Fleet, Mode};
pub use error::{FleetError, FleetResult, TransmissionError};
pub use schema::{EngineConfig, Frame, Movie, Pixel};
pub use sync::{CancelHandle, SessionReport, SessionState, SyncEngine};
pub use topology::Topology;
pub use transmit::Transmitter;
