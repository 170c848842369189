//! Effect parameters, loop policies and pattern descriptions.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{ConfigError, Frame, Movie, Pixel, Rgb};
use crate::pattern;

fn default_white_peak() -> u8 {
    pattern::DEFAULT_TRAIL_WHITE_PEAK
}

fn default_trail_length() -> usize {
    pattern::DEFAULT_TRAIL_LENGTH
}

/// How many times a movie is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Play the movie a single time.
    #[default]
    Once,
    /// Loop until cancelled.
    Forever,
    /// Play the movie `n` times; zero plays nothing.
    Count(u32),
}

impl LoopPolicy {
    /// Whether another pass should start after `completed` passes.
    pub fn allows_pass(self, completed: u64) -> bool {
        match self {
            Self::Once => completed < 1,
            Self::Forever => true,
            Self::Count(n) => completed < u64::from(n),
        }
    }

    /// Number of passes, or `None` when looping forever.
    pub fn passes(self) -> Option<u64> {
        match self {
            Self::Once => Some(1),
            Self::Forever => None,
            Self::Count(n) => Some(u64::from(n)),
        }
    }
}

fn validate_duration(secs: f32) -> Result<(), ConfigError> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration)
    }
}

/// Seconds as a [`Duration`], rejecting values too large to represent.
pub(crate) fn secs_to_duration(secs: f32, err: ConfigError) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(secs).map_err(|_| err)
}

fn validate_rate(rate: f32) -> Result<(), ConfigError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate)
    }
}

/// Two fronts travelling from both ends of the global index space to a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceParams {
    /// Global LED index where the fronts meet.
    pub target: usize,
    /// Total effect duration in seconds; the fronts meet at half of it.
    pub duration_secs: f32,
    /// Engine ticks per second.
    pub tick_rate: f32,
}

impl ConvergenceParams {
    pub fn validate(&self, total_leds: usize) -> Result<(), ConfigError> {
        if self.target >= total_leds {
            return Err(ConfigError::TargetOutOfRange {
                target: self.target,
                len: total_leds,
            });
        }
        validate_duration(self.duration_secs)?;
        validate_rate(self.tick_rate)?;
        self.half_duration().map(|_| ())
    }

    /// Time the fronts take to reach the target.
    pub fn half_duration(&self) -> Result<Duration, ConfigError> {
        secs_to_duration(self.duration_secs / 2.0, ConfigError::InvalidDuration)
    }
}

/// Brightness wave converging on one device of the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrightnessParams {
    /// Index of the device (in topology order) that stays at full brightness.
    pub target_device: usize,
    /// Starting brightness of every other device, in [0, 1].
    pub base_brightness: f32,
    /// Total effect duration in seconds.
    pub duration_secs: f32,
    /// Steps per second.
    pub fps: f32,
}

impl Default for BrightnessParams {
    fn default() -> Self {
        Self {
            target_device: 0,
            base_brightness: 0.5,
            duration_secs: 10.0,
            fps: 30.0,
        }
    }
}

impl BrightnessParams {
    pub fn validate(&self, device_count: usize) -> Result<(), ConfigError> {
        if self.target_device >= device_count {
            return Err(ConfigError::TargetOutOfRange {
                target: self.target_device,
                len: device_count,
            });
        }
        if !(0.0..=1.0).contains(&self.base_brightness) {
            return Err(ConfigError::InvalidBrightness(self.base_brightness));
        }
        validate_duration(self.duration_secs)?;
        validate_rate(self.fps)?;
        self.step_period().map(|_| ())
    }

    /// Number of discrete steps (`duration * fps`, truncated).
    pub fn total_steps(&self) -> usize {
        (self.duration_secs * self.fps) as usize
    }

    /// Time between steps; a rate so low that the period overflows is rejected.
    pub fn step_period(&self) -> Result<Duration, ConfigError> {
        secs_to_duration(1.0 / self.fps, ConfigError::InvalidRate)
    }
}

/// Serializable description of any procedural pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatternSpec {
    /// Every LED the same colour (one frame).
    Solid { color: Pixel },
    /// Even LEDs `color1`, odd LEDs `color2` (one frame).
    Alternating { color1: Pixel, color2: Pixel },
    /// Pattern repeated along the string (one frame).
    Repeating { pattern: Vec<Pixel> },
    /// Flashing checkerboard.
    AlternatingMovie {
        num_frames: usize,
        color1: Pixel,
        color2: Pixel,
    },
    /// Single LED walking the string.
    MovingDot {
        color: Rgb,
        #[serde(default)]
        white: u8,
    },
    /// Walking LED followed by a fading trail.
    Trail {
        color: Rgb,
        #[serde(default = "default_trail_length")]
        trail_length: usize,
        #[serde(default = "default_white_peak")]
        white_peak: u8,
    },
    /// Fixed bitmap of `'0'`/`'1'` rows (one frame).
    BitPattern {
        rows: Vec<String>,
        on: Pixel,
        #[serde(default)]
        off: Pixel,
    },
    /// Border ring shrinking towards the centre of a zigzag grid.
    ZigzagInward {
        width: usize,
        height: usize,
        on: Pixel,
        #[serde(default)]
        off: Pixel,
    },
    /// Border ring growing from the centre of a zigzag grid.
    ZigzagOutward {
        width: usize,
        height: usize,
        on: Pixel,
        #[serde(default)]
        off: Pixel,
    },
    /// Falling rain or snow.
    Precipitation {
        width: usize,
        height: usize,
        color: Pixel,
        num_frames: usize,
        density: f32,
        /// Fixed RNG seed; entropy when absent.
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl PatternSpec {
    /// Generate the movie for a string of `num_leds` LEDs.
    ///
    /// Grid patterns size their frames from the grid and ignore `num_leds`.
    pub fn generate(&self, num_leds: usize) -> Result<Movie, ConfigError> {
        let single = |frame: Frame| Movie::from_uniform(vec![frame]);
        match self {
            Self::Solid { color } => Ok(single(Frame::solid(num_leds, *color))),
            Self::Alternating { color1, color2 } => {
                Ok(single(pattern::alternating(num_leds, *color1, *color2)))
            }
            Self::Repeating { pattern: colors } => {
                Ok(single(pattern::repeating(num_leds, colors)))
            }
            Self::AlternatingMovie {
                num_frames,
                color1,
                color2,
            } => Ok(pattern::alternating_movie(
                num_leds,
                *num_frames,
                *color1,
                *color2,
            )),
            Self::MovingDot { color, white } => Ok(pattern::moving_dot(num_leds, *color, *white)),
            Self::Trail {
                color,
                trail_length,
                white_peak,
            } => pattern::trail_movie(num_leds, *color, *trail_length, *white_peak),
            Self::BitPattern { rows, on, off } => {
                let grid = pattern::BitGrid::parse(rows)?;
                Ok(single(grid.to_frame(*on, *off)))
            }
            Self::ZigzagInward {
                width,
                height,
                on,
                off,
            } => pattern::zigzag_movie(*width, *height, pattern::Direction::Inward, *on, *off),
            Self::ZigzagOutward {
                width,
                height,
                on,
                off,
            } => pattern::zigzag_movie(*width, *height, pattern::Direction::Outward, *on, *off),
            Self::Precipitation {
                width,
                height,
                color,
                num_frames,
                density,
                seed,
            } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                pattern::precipitation_movie(
                    *width,
                    *height,
                    *color,
                    *num_frames,
                    *density,
                    &mut rng,
                )
            }
        }
    }
}
