//! Two-dimensional bit grids and zigzag (boustrophedon) flattening.
//!
//! Grids are stored row-major. A zigzag-wired panel runs odd rows in the
//! opposite direction, so those rows are reversed before flattening.

use crate::schema::{ConfigError, Frame, Movie, Pixel};

/// Rectangular on/off field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl BitGrid {
    /// All-off grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Parse rows of `'0'`/`'1'` characters. Anything other than `'1'` is off.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        let width = rows
            .first()
            .map(|r| r.as_ref().chars().count())
            .ok_or(ConfigError::EmptyGrid)?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let before = cells.len();
            cells.extend(line.as_ref().chars().map(|c| c == '1'));
            let found = cells.len() - before;
            if found != width {
                return Err(ConfigError::RaggedPattern {
                    row,
                    expected: width,
                    found,
                });
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// The cells at least `depth` steps in from the nearest edge.
    ///
    /// Depth 0 is the whole grid; each further step drops the outermost
    /// remaining ring.
    pub fn inset(width: usize, height: usize, depth: usize) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let edge = x.min(y).min(width - 1 - x).min(height - 1 - y);
                if edge >= depth {
                    grid.set(x, y, true);
                }
            }
        }
        grid
    }

    /// Number of rings a grid of this size has.
    pub fn ring_count(width: usize, height: usize) -> usize {
        width.min(height).div_ceil(2)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.cells[y * self.width + x] = on;
    }

    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    pub fn count_on(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Flatten row-major.
    pub fn to_frame(&self, on: Pixel, off: Pixel) -> Frame {
        self.cells
            .iter()
            .map(|&c| if c { on } else { off })
            .collect()
    }

    /// Flatten for zigzag wiring: odd rows are emitted right to left.
    pub fn to_zigzag_frame(&self, on: Pixel, off: Pixel) -> Frame {
        let pick = |c: &bool| if *c { on } else { off };
        (0..self.height)
            .flat_map(|y| {
                let row = self.row(y);
                if y % 2 == 0 {
                    row.iter().map(pick).collect::<Vec<_>>()
                } else {
                    row.iter().rev().map(pick).collect()
                }
            })
            .collect()
    }
}

/// Travel direction of the zigzag border animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the outer ring towards the centre.
    Inward,
    /// From the centre towards the outer ring.
    Outward,
}

/// Shrinking (or growing) lit rectangle on a zigzag-wired `width` x `height` grid.
///
/// Inward frame `k` lights every cell at least `k` rings deep, so each
/// frame is the previous one minus its outer ring. Outward plays the same
/// frames in reverse. Produces `ceil(min(width, height) / 2)` frames.
pub fn zigzag_movie(
    width: usize,
    height: usize,
    direction: Direction,
    on: Pixel,
    off: Pixel,
) -> Result<Movie, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyGrid);
    }

    let rings = BitGrid::ring_count(width, height);
    let frame_for = |depth| BitGrid::inset(width, height, depth).to_zigzag_frame(on, off);
    let frames = match direction {
        Direction::Inward => (0..rings).map(frame_for).collect(),
        Direction::Outward => (0..rings).rev().map(frame_for).collect(),
    };

    Ok(Movie::from_uniform(frames))
}
