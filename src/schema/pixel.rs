//! Pixel, frame and movie value types.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One WRGB LED value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub w: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    /// All channels zero.
    pub const OFF: Pixel = Pixel::new(0, 0, 0, 0);

    pub const fn new(w: u8, r: u8, g: u8, b: u8) -> Self {
        Self { w, r, g, b }
    }

    /// Combine an RGB colour with a white channel.
    pub const fn from_rgb(rgb: Rgb, white: u8) -> Self {
        Self::new(white, rgb.r, rgb.g, rgb.b)
    }

    /// Channels in wire order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.w, self.r, self.g, self.b]
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Sum of the colour channels, ignoring white.
    pub fn rgb_magnitude(self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

impl From<(u8, u8, u8, u8)> for Pixel {
    fn from((w, r, g, b): (u8, u8, u8, u8)) -> Self {
        Self::new(w, r, g, b)
    }
}

/// An RGB colour without a white channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor` (clamped to [0, 1]), truncating.
    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (f32::from(c) * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Fixed-length sequence of pixels.
///
/// The length is set at construction. Mutable access goes through the
/// slice, so pixels can be rewritten but never added or removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(Vec<Pixel>);

impl Frame {
    /// A frame with every LED off.
    pub fn off(len: usize) -> Self {
        Self::solid(len, Pixel::OFF)
    }

    /// A frame with every LED set to `pixel`.
    pub fn solid(len: usize, pixel: Pixel) -> Self {
        Self(vec![pixel; len])
    }

    pub fn from_pixels(pixels: Vec<Pixel>) -> Self {
        Self(pixels)
    }

    /// Build a frame by evaluating `f` for every index.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> Pixel) -> Self {
        Self((0..len).map(f).collect())
    }

    pub fn as_slice(&self) -> &[Pixel] {
        &self.0
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.0
    }

    /// Indices of the pixels that are not off.
    pub fn lit_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_off())
            .map(|(i, _)| i)
            .collect()
    }
}

impl Deref for Frame {
    type Target = [Pixel];

    fn deref(&self) -> &[Pixel] {
        &self.0
    }
}

impl DerefMut for Frame {
    fn deref_mut(&mut self) -> &mut [Pixel] {
        &mut self.0
    }
}

impl FromIterator<Pixel> for Frame {
    fn from_iter<I: IntoIterator<Item = Pixel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Finite, restartable sequence of equal-length frames.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Frame>", into = "Vec<Frame>")]
pub struct Movie {
    frames: Vec<Frame>,
}

impl Movie {
    /// Build a movie, rejecting frames whose length differs from the first.
    pub fn new(frames: Vec<Frame>) -> Result<Self, ConfigError> {
        if let Some(first) = frames.first() {
            let expected = first.len();
            if let Some((frame, found)) = frames
                .iter()
                .map(|f| f.len())
                .enumerate()
                .find(|&(_, len)| len != expected)
            {
                return Err(ConfigError::UnevenMovie {
                    frame,
                    expected,
                    found,
                });
            }
        }
        Ok(Self { frames })
    }

    /// Generators produce equal-length frames by construction.
    pub(crate) fn from_uniform(frames: Vec<Frame>) -> Self {
        debug_assert!(frames.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pixels per frame, or `None` for an empty movie.
    pub fn frame_len(&self) -> Option<usize> {
        self.frames.first().map(|f| f.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl TryFrom<Vec<Frame>> for Movie {
    type Error = ConfigError;

    fn try_from(frames: Vec<Frame>) -> Result<Self, Self::Error> {
        Self::new(frames)
    }
}

impl From<Movie> for Vec<Frame> {
    fn from(movie: Movie) -> Self {
        movie.frames
    }
}

impl<'a> IntoIterator for &'a Movie {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_wire_order() {
        let p = Pixel::new(1, 2, 3, 4);
        assert_eq!(p.to_bytes(), [1, 2, 3, 4]);
        assert_eq!(Pixel::from((1, 2, 3, 4)), p);
        assert_eq!(Pixel::from_rgb(Rgb::new(2, 3, 4), 1), p);
    }

    #[test]
    fn test_rgb_scaled_truncates() {
        let c = Rgb::new(255, 223, 191).scaled(0.5);
        assert_eq!(c, Rgb::new(127, 111, 95));
        assert_eq!(Rgb::new(10, 10, 10).scaled(2.0), Rgb::new(10, 10, 10));
        assert_eq!(Rgb::new(10, 10, 10).scaled(-1.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_frame_keeps_length() {
        let mut frame = Frame::off(5);
        frame[2] = Pixel::new(0, 255, 0, 0);
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.lit_indices(), vec![2]);
    }

    #[test]
    fn test_movie_rejects_uneven_frames() {
        let err = Movie::new(vec![Frame::off(3), Frame::off(3), Frame::off(4)]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnevenMovie {
                frame: 2,
                expected: 3,
                found: 4
            }
        ));

        let movie = Movie::new(vec![Frame::off(3); 2]).unwrap();
        assert_eq!(movie.len(), 2);
        assert_eq!(movie.frame_len(), Some(3));
        assert_eq!(Movie::default().frame_len(), None);
    }

    #[test]
    fn test_pixel_json_shape() {
        let json = serde_json::to_string(&Pixel::new(0, 255, 0, 0)).unwrap();
        assert_eq!(json, r#"{"w":0,"r":255,"g":0,"b":0}"#);
        let frame: Frame = serde_json::from_str(r#"[{"w":1,"r":2,"g":3,"b":4}]"#).unwrap();
        assert_eq!(frame.as_slice(), &[Pixel::new(1, 2, 3, 4)]);

        let movie: Result<Movie, _> = serde_json::from_str(
            r#"[[{"w":0,"r":0,"g":0,"b":0}], [{"w":0,"r":0,"g":0,"b":0}, {"w":0,"r":0,"g":0,"b":0}]]"#,
        );
        assert!(movie.is_err());
    }
}
