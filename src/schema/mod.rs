//! Schema module - Pixel data model, configuration and effect parameters.

mod config;
mod effect;
mod pixel;

pub use config::*;
pub use effect::*;
pub use pixel::*;
