//! Fleet-wide effects: fan-out, sessions and the synchronization engine.

mod convergence;
mod engine;
mod fanout;
mod session;

pub use convergence::ConvergencePlan;
pub use engine::*;
pub use fanout::{DeviceFailure, FanOutReport};
pub use session::{CancelHandle, SessionReport, SessionState};
