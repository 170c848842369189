//! Single-device frame delivery and timed playback.

use std::time::Duration;

use super::codec::encode_frame_into;
use super::pacer::Pacer;
use crate::device::Device;
use crate::error::{FleetResult, TransmissionError};
use crate::schema::{DEFAULT_PROTOCOL_VERSION, Frame, LoopPolicy, Movie};
use crate::sync::CancelHandle;

/// Outcome of a completed single-device playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    pub passes: u64,
    pub frames_sent: u64,
}

/// Pushes frames to devices over their transport capability.
#[derive(Debug, Clone, Copy)]
pub struct Transmitter {
    protocol_version: u8,
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL_VERSION)
    }
}

impl Transmitter {
    pub fn new(protocol_version: u8) -> Self {
        Self { protocol_version }
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    /// Send one frame. The frame must match the device's LED count exactly.
    pub fn send(&self, device: &Device, frame: &Frame) -> Result<(), TransmissionError> {
        let mut payload = Vec::new();
        self.send_with(device, frame, &mut payload)
    }

    fn send_with(
        &self,
        device: &Device,
        frame: &Frame,
        payload: &mut Vec<u8>,
    ) -> Result<(), TransmissionError> {
        if frame.len() != device.led_count() {
            return Err(TransmissionError::LengthMismatch {
                device: device.id().clone(),
                expected: device.led_count(),
                found: frame.len(),
            });
        }
        encode_frame_into(frame, payload);
        device
            .transport()
            .send_realtime_frame(payload, self.protocol_version, device.led_count())
            .map_err(|source| TransmissionError::Transport {
                device: device.id().clone(),
                source,
            })
    }

    /// Play a movie on one device with a fixed delay after every frame.
    ///
    /// Cancellation is observed at frame boundaries and surfaces as
    /// [`FleetError::Cancelled`](crate::FleetError::Cancelled); the device
    /// is blanked with an all-off frame before returning. The first failed
    /// send aborts playback and leaves the last frame up. An empty movie
    /// completes immediately whatever the loop policy.
    pub fn play(
        &self,
        device: &Device,
        movie: &Movie,
        frame_delay: Duration,
        policy: LoopPolicy,
        cancel: &CancelHandle,
    ) -> FleetResult<Playback> {
        let mut summary = Playback::default();
        if movie.is_empty() {
            return Ok(summary);
        }
        match self.play_passes(device, movie, frame_delay, policy, cancel, &mut summary) {
            Ok(()) => {
                log::debug!(
                    "Played {} frames in {} passes on {}",
                    summary.frames_sent,
                    summary.passes,
                    device.id()
                );
                Ok(summary)
            }
            Err(err) if err.is_cancellation() => {
                if let Err(blank) = self.send(device, &Frame::off(device.led_count())) {
                    log::warn!("Could not blank {} after cancel: {blank}", device.id());
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn play_passes(
        &self,
        device: &Device,
        movie: &Movie,
        frame_delay: Duration,
        policy: LoopPolicy,
        cancel: &CancelHandle,
        summary: &mut Playback,
    ) -> FleetResult<()> {
        let mut payload = Vec::new();
        let mut pacer = Pacer::new(frame_delay);
        while policy.allows_pass(summary.passes) {
            for frame in movie {
                cancel.check()?;
                self.send_with(device, frame, &mut payload)?;
                summary.frames_sent += 1;
                pacer.wait(cancel)?;
            }
            summary.passes += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::error::FleetError;
    use crate::pattern::alternating_movie;
    use crate::schema::Pixel;
    use crate::sim::SimulatedDevice;

    fn device(n: usize) -> (Arc<SimulatedDevice>, Device) {
        let sim = Arc::new(SimulatedDevice::new(n));
        let device = Device::new("strip", n, sim.clone());
        (sim, device)
    }

    #[test]
    fn test_send_tags_protocol_and_count() {
        let (sim, device) = device(3);
        let frame = Frame::solid(3, Pixel::new(0, 9, 8, 7));
        Transmitter::default().send(&device, &frame).unwrap();

        let received = sim.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].protocol_version, 3);
        assert_eq!(received[0].led_count, 3);
        assert_eq!(received[0].pixels(), frame);
    }

    #[test]
    fn test_length_mismatch_sends_nothing() {
        let (sim, device) = device(3);
        let err = Transmitter::default()
            .send(&device, &Frame::off(4))
            .unwrap_err();
        assert!(matches!(
            err,
            TransmissionError::LengthMismatch {
                expected: 3,
                found: 4,
                ..
            }
        ));
        assert_eq!(sim.frame_count(), 0);
    }

    #[test]
    fn test_transport_failure_is_wrapped() {
        let (sim, device) = device(2);
        sim.set_reject_frames(true);
        let err = Transmitter::new(2).send(&device, &Frame::off(2)).unwrap_err();
        assert!(matches!(err, TransmissionError::Transport { .. }));
        assert_eq!(err.device().as_str(), "strip");
    }

    #[test]
    fn test_play_counts_passes() {
        let (sim, device) = device(4);
        let movie = alternating_movie(4, 3, Pixel::new(0, 255, 0, 0), Pixel::OFF);
        let summary = Transmitter::default()
            .play(
                &device,
                &movie,
                Duration::ZERO,
                LoopPolicy::Count(2),
                &CancelHandle::new(),
            )
            .unwrap();
        assert_eq!(summary, Playback { passes: 2, frames_sent: 6 });
        assert_eq!(sim.frame_count(), 6);
    }

    #[test]
    fn test_play_zero_count_sends_nothing() {
        let (sim, device) = device(4);
        let movie = alternating_movie(4, 3, Pixel::new(0, 255, 0, 0), Pixel::OFF);
        let summary = Transmitter::default()
            .play(
                &device,
                &movie,
                Duration::ZERO,
                LoopPolicy::Count(0),
                &CancelHandle::new(),
            )
            .unwrap();
        assert_eq!(summary.frames_sent, 0);
        assert_eq!(sim.frame_count(), 0);
    }

    #[test]
    fn test_play_forever_stops_on_cancel() {
        let (sim, device) = device(4);
        let movie = alternating_movie(4, 2, Pixel::new(0, 255, 0, 0), Pixel::OFF);
        let cancel = CancelHandle::new();
        let remote = cancel.clone();

        let player = std::thread::spawn(move || {
            Transmitter::default().play(
                &device,
                &movie,
                Duration::from_millis(2),
                LoopPolicy::Forever,
                &cancel,
            )
        });
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel();

        let result = player.join().unwrap();
        assert!(matches!(result, Err(FleetError::Cancelled)));
        assert!(sim.frame_count() > 1);
        assert!(sim.last_frame().unwrap().lit_indices().is_empty());
    }

    #[test]
    fn test_play_spaces_frames_by_delay() {
        let (sim, device) = device(4);
        let movie = alternating_movie(4, 3, Pixel::new(0, 255, 0, 0), Pixel::OFF);
        let delay = Duration::from_millis(5);
        let start = Instant::now();
        Transmitter::default()
            .play(&device, &movie, delay, LoopPolicy::Once, &CancelHandle::new())
            .unwrap();

        let received = sim.received();
        assert_eq!(received.len(), 3);
        assert!(received.windows(2).all(|w| w[0].received_at <= w[1].received_at));
        assert!(received[2].received_at - start >= delay * 2);
    }

    #[test]
    fn test_play_aborts_on_first_failure() {
        let (sim, device) = device(4);
        sim.set_offline(true);
        let movie = alternating_movie(4, 2, Pixel::new(0, 255, 0, 0), Pixel::OFF);
        let result = Transmitter::default().play(
            &device,
            &movie,
            Duration::ZERO,
            LoopPolicy::Once,
            &CancelHandle::new(),
        );
        assert!(matches!(result, Err(FleetError::Transmission(_))));
    }
}
