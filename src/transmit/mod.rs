//! Frame encoding, delivery and pacing.

mod codec;
mod pacer;
mod transmitter;

pub use codec::*;
pub use pacer::*;
pub use transmitter::*;
