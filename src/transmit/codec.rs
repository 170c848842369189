//! Real-time frame payload layout.
//!
//! ```text
//! payload = pixel[0] pixel[1] ... pixel[n-1]
//! pixel   = W R G B          (one byte each)
//! ```
//!
//! The payload is handed to the transport together with the protocol
//! version and the LED count; framing on the wire is the transport's job.

use crate::schema::Frame;

/// Bytes per pixel in the payload.
pub const BYTES_PER_PIXEL: usize = 4;

/// Payload size for `led_count` LEDs.
#[inline]
pub fn payload_len(led_count: usize) -> usize {
    led_count * BYTES_PER_PIXEL
}

/// Encode a frame into a fresh payload.
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload_len(frame.len()));
    encode_frame_into(frame, &mut buf);
    buf
}

/// Encode a frame into `buf`, replacing its contents.
pub fn encode_frame_into(frame: &Frame, buf: &mut Vec<u8>) {
    buf.clear();
    buf.reserve(payload_len(frame.len()));
    for pixel in frame.iter() {
        buf.extend_from_slice(&pixel.to_bytes());
    }
}
