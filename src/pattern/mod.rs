//! Pattern generators - pure functions producing frames and movies.
//!
//! Generators know nothing about devices or the network. Indices are
//! positions on an abstract LED line, or on an abstract grid flattened
//! row-major. Colour arithmetic truncates to integer channel values.

mod alternating;
mod brightness;
mod grid;
mod precipitation;
mod trail;

pub use alternating::*;
pub use brightness::*;
pub use grid::*;
pub use precipitation::*;
pub use trail::*;
