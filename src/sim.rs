//! In-memory device for dry runs, tests and benchmarks.
//!
//! [`SimulatedDevice`] implements both capabilities, records every call
//! and can be switched to fail on demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::device::{DeviceLifecycle, DeviceTransport, Mode};
use crate::error::CapabilityError;
use crate::schema::{Frame, Pixel};

/// Lifecycle call observed by a simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCall {
    TurnOn,
    TurnOff,
    SetMode(Mode),
}

/// One real-time frame as received by a simulated device.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub payload: Vec<u8>,
    pub protocol_version: u8,
    pub led_count: usize,
    pub received_at: Instant,
}

impl ReceivedFrame {
    /// Reassemble the pixels from the flat WRGB payload.
    pub fn pixels(&self) -> Frame {
        self.payload
            .chunks_exact(4)
            .map(|c| Pixel::new(c[0], c[1], c[2], c[3]))
            .collect()
    }
}

#[derive(Debug)]
struct SimState {
    on: bool,
    mode: Mode,
    calls: Vec<LifecycleCall>,
    frames: Vec<ReceivedFrame>,
}

/// Device that lives entirely in memory.
#[derive(Debug)]
pub struct SimulatedDevice {
    led_count: usize,
    offline: AtomicBool,
    reject_frames: AtomicBool,
    state: Mutex<SimState>,
}

impl SimulatedDevice {
    pub fn new(led_count: usize) -> Self {
        Self {
            led_count,
            offline: AtomicBool::new(false),
            reject_frames: AtomicBool::new(false),
            state: Mutex::new(SimState {
                on: false,
                mode: Mode::Color,
                calls: Vec::new(),
                frames: Vec::new(),
            }),
        }
    }

    /// Make every call fail, as if the device dropped off the network.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail real-time frames only; lifecycle calls keep working.
    pub fn set_reject_frames(&self, reject: bool) {
        self.reject_frames.store(reject, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> Result<(), CapabilityError> {
        if self.offline.load(Ordering::SeqCst) {
            Err("device unreachable".into())
        } else {
            Ok(())
        }
    }

    fn record(&self, call: LifecycleCall) -> Result<(), CapabilityError> {
        self.check_online()?;
        let mut state = self.lock();
        match call {
            LifecycleCall::TurnOn => state.on = true,
            LifecycleCall::TurnOff => state.on = false,
            LifecycleCall::SetMode(mode) => state.mode = mode,
        }
        state.calls.push(call);
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.lock().on
    }

    pub fn current_mode(&self) -> Mode {
        self.lock().mode
    }

    pub fn lifecycle_calls(&self) -> Vec<LifecycleCall> {
        self.lock().calls.clone()
    }

    pub fn received(&self) -> Vec<ReceivedFrame> {
        self.lock().frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    /// Pixels of the most recent frame.
    pub fn last_frame(&self) -> Option<Frame> {
        self.lock().frames.last().map(ReceivedFrame::pixels)
    }
}

impl DeviceLifecycle for SimulatedDevice {
    fn turn_on(&self) -> Result<(), CapabilityError> {
        self.record(LifecycleCall::TurnOn)
    }

    fn turn_off(&self) -> Result<(), CapabilityError> {
        self.record(LifecycleCall::TurnOff)
    }

    fn set_mode(&self, mode: Mode) -> Result<(), CapabilityError> {
        self.record(LifecycleCall::SetMode(mode))
    }

    fn mode(&self) -> Result<Mode, CapabilityError> {
        self.check_online()?;
        Ok(self.lock().mode)
    }

    fn led_count(&self) -> Result<usize, CapabilityError> {
        self.check_online()?;
        Ok(self.led_count)
    }
}

impl DeviceTransport for SimulatedDevice {
    fn send_realtime_frame(
        &self,
        payload: &[u8],
        protocol_version: u8,
        led_count: usize,
    ) -> Result<(), CapabilityError> {
        self.check_online()?;
        if self.reject_frames.load(Ordering::SeqCst) {
            return Err("frame rejected".into());
        }
        self.lock().frames.push(ReceivedFrame {
            payload: payload.to_vec(),
            protocol_version,
            led_count,
            received_at: Instant::now(),
        });
        Ok(())
    }
}
