//! Alternating and repeating colour patterns.

use crate::schema::{Frame, Movie, Pixel};

/// Even LEDs get `color1`, odd LEDs `color2`.
pub fn alternating(num_leds: usize, color1: Pixel, color2: Pixel) -> Frame {
    Frame::from_fn(num_leds, |i| if i % 2 == 0 { color1 } else { color2 })
}

/// Repeat `pattern` along the string. An empty pattern leaves every LED off.
pub fn repeating(num_leds: usize, pattern: &[Pixel]) -> Frame {
    if pattern.is_empty() {
        return Frame::off(num_leds);
    }
    Frame::from_fn(num_leds, |i| pattern[i % pattern.len()])
}

/// Flashing checkerboard: odd frames swap the two colours.
pub fn alternating_movie(num_leds: usize, num_frames: usize, color1: Pixel, color2: Pixel) -> Movie {
    let even = alternating(num_leds, color1, color2);
    let odd = alternating(num_leds, color2, color1);
    let frames = (0..num_frames)
        .map(|f| if f % 2 == 0 { even.clone() } else { odd.clone() })
        .collect();
    Movie::from_uniform(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Pixel = Pixel::new(0, 255, 0, 0);
    const GREEN: Pixel = Pixel::new(0, 0, 255, 0);

    #[test]
    fn test_alternating_pattern() {
        let frame = alternating(4, RED, GREEN);
        assert_eq!(frame.as_slice(), &[RED, GREEN, RED, GREEN]);
        assert!(alternating(0, RED, GREEN).is_empty());
    }

    #[test]
    fn test_repeating_pattern() {
        let blue = Pixel::new(0, 0, 0, 255);
        let frame = repeating(5, &[RED, GREEN, blue]);
        assert_eq!(frame.as_slice(), &[RED, GREEN, blue, RED, GREEN]);
        assert_eq!(repeating(3, &[]), Frame::off(3));
    }

    #[test]
    fn test_alternating_movie_inverts_odd_frames() {
        let movie = alternating_movie(3, 3, RED, GREEN);
        assert_eq!(movie.len(), 3);
        assert_eq!(movie.frames()[0].as_slice(), &[RED, GREEN, RED]);
        assert_eq!(movie.frames()[1].as_slice(), &[GREEN, RED, GREEN]);
        assert_eq!(movie.frames()[2], movie.frames()[0]);
    }
}
