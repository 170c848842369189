//! Falling precipitation (rain, snow) on a grid.

use rand::Rng;
use rand::distributions::{Bernoulli, Distribution};

use super::BitGrid;
use crate::schema::{ConfigError, Movie, Pixel};

/// Evolving drop field.
///
/// Each step moves every row down by one, dropping the bottom row, and
/// reseeds the top row with independent draws at `density`.
#[derive(Debug, Clone)]
pub struct PrecipitationField {
    grid: BitGrid,
    seeding: Bernoulli,
}

impl PrecipitationField {
    pub fn new(width: usize, height: usize, density: f32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let seeding =
            Bernoulli::new(f64::from(density)).map_err(|_| ConfigError::InvalidDensity(density))?;
        Ok(Self {
            grid: BitGrid::new(width, height),
            seeding,
        })
    }

    pub fn grid(&self) -> &BitGrid {
        &self.grid
    }

    /// Advance one step.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let width = self.grid.width();
        let height = self.grid.height();
        let cells = self.grid.cells_mut();

        cells.copy_within(0..(height - 1) * width, width);
        for cell in &mut cells[..width] {
            *cell = self.seeding.sample(rng);
        }
    }
}

/// Generate `num_frames` frames of precipitation, flattened row-major.
///
/// Only the top-row seeding draws from `rng`; the fall itself is deterministic.
pub fn precipitation_movie<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    color: Pixel,
    num_frames: usize,
    density: f32,
    rng: &mut R,
) -> Result<Movie, ConfigError> {
    let mut field = PrecipitationField::new(width, height, density)?;
    let frames = (0..num_frames)
        .map(|_| {
            field.step(&mut *rng);
            field.grid().to_frame(color, Pixel::OFF)
        })
        .collect();
    Ok(Movie::from_uniform(frames))
}
