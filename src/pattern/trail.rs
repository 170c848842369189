//! Moving dot animations.

use crate::schema::{ConfigError, Frame, Movie, Pixel, Rgb};

/// Trail length used by the stock trail animation.
pub const DEFAULT_TRAIL_LENGTH: usize = 49;

/// White reached by the tail end of a trail.
pub const DEFAULT_TRAIL_WHITE_PEAK: u8 = 1;

/// One LED walks from the first to the last position.
pub fn moving_dot(num_leds: usize, color: Rgb, white: u8) -> Movie {
    let on = Pixel::from_rgb(color, white);
    let frames = (0..num_leds)
        .map(|head| {
            let mut frame = Frame::off(num_leds);
            frame[head] = on;
            frame
        })
        .collect();
    Movie::from_uniform(frames)
}

/// Pixel `t` LEDs behind the head of a trail of `trail_length`.
///
/// Colour fades linearly to zero and white rises linearly to `white_peak`
/// as `t` approaches `trail_length`. Channels are floored.
#[inline]
pub fn trail_pixel(color: Rgb, t: usize, trail_length: usize, white_peak: u8) -> Pixel {
    debug_assert!(trail_length > 0 && t <= trail_length);
    let len = trail_length as u128;
    let t = t as u128;
    let fade = |c: u8| (u128::from(c) * (len - t) / len) as u8;
    let white = (u128::from(white_peak) * t / len) as u8;
    Pixel::new(white, fade(color.r), fade(color.g), fade(color.b))
}

/// One LED walks the string followed by `trail_length` fading LEDs.
///
/// Frame `i` has its head at LED `i`; trail LEDs that fall before the
/// start of the string are dropped (no wraparound).
pub fn trail_movie(
    num_leds: usize,
    color: Rgb,
    trail_length: usize,
    white_peak: u8,
) -> Result<Movie, ConfigError> {
    if trail_length == 0 {
        return Err(ConfigError::ZeroTrailLength);
    }

    // The trail looks identical at every head position, so build it once,
    // no longer than the string can show.
    let visible = trail_length.min(num_leds.saturating_sub(1));
    let tail: Vec<Pixel> = (0..=visible)
        .map(|t| trail_pixel(color, t, trail_length, white_peak))
        .collect();

    let frames = (0..num_leds)
        .map(|head| {
            let mut frame = Frame::off(num_leds);
            for (t, pixel) in tail.iter().enumerate().take(head + 1) {
                frame[head - t] = *pixel;
            }
            frame
        })
        .collect();

    Ok(Movie::from_uniform(frames))
}
