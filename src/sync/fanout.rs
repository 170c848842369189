//! Parallel per-tick dispatch to many devices.
//!
//! Every job of a tick runs on the rayon pool; collecting the results is
//! the barrier that ends the tick. A failing device is logged and reported
//! but never stops the others.

use rayon::prelude::*;
use serde::Serialize;

use crate::device::{Device, DeviceLifecycle};
use crate::error::CapabilityError;
use crate::schema::{DeviceId, Frame};
use crate::transmit::Transmitter;

/// One device that failed during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceFailure {
    pub device: DeviceId,
    pub message: String,
}

/// Per-device outcome of a fleet-wide operation, in fleet order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub succeeded: Vec<DeviceId>,
    pub failed: Vec<DeviceFailure>,
}

impl FanOutReport {
    /// True when no device failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    fn collect(action: &str, outcomes: Vec<(DeviceId, Result<(), String>)>) -> Self {
        let mut report = Self::default();
        for (device, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded.push(device),
                Err(message) => {
                    log::warn!("{action} failed on {device}: {message}");
                    report.failed.push(DeviceFailure { device, message });
                }
            }
        }
        report
    }
}

/// Run a lifecycle operation on every device.
pub(crate) fn lifecycle<F>(devices: &[Device], action: &str, op: F) -> FanOutReport
where
    F: Fn(&dyn DeviceLifecycle) -> Result<(), CapabilityError> + Sync,
{
    let outcomes = devices
        .par_iter()
        .map(|device| {
            let outcome = op(device.lifecycle()).map_err(|e| e.to_string());
            (device.id().clone(), outcome)
        })
        .collect();
    FanOutReport::collect(action, outcomes)
}

/// Send one frame per job.
pub(crate) fn frames(transmitter: &Transmitter, jobs: &[(&Device, Frame)]) -> FanOutReport {
    let outcomes = jobs
        .par_iter()
        .map(|(device, frame)| {
            let outcome = transmitter.send(device, frame).map_err(|e| e.to_string());
            (device.id().clone(), outcome)
        })
        .collect();
    FanOutReport::collect("frame send", outcomes)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sim::SimulatedDevice;

    fn fleet(n: usize) -> (Vec<Arc<SimulatedDevice>>, Vec<Device>) {
        let sims: Vec<_> = (0..n).map(|_| Arc::new(SimulatedDevice::new(2))).collect();
        let devices = sims
            .iter()
            .enumerate()
            .map(|(i, sim)| Device::new(format!("d{i}"), 2, sim.clone()))
            .collect();
        (sims, devices)
    }

    #[test]
    fn test_failures_do_not_block_others() {
        let (sims, devices) = fleet(4);
        sims[1].set_offline(true);

        let report = lifecycle(&devices, "turn on", |d| d.turn_on());
        assert_eq!(report.attempted(), 4);
        assert!(!report.is_complete());
        assert_eq!(report.failed[0].device.as_str(), "d1");
        let ok: Vec<&str> = report.succeeded.iter().map(DeviceId::as_str).collect();
        assert_eq!(ok, vec!["d0", "d2", "d3"]);
        assert!(sims[3].is_on());
    }

    #[test]
    fn test_frame_jobs_only_touch_listed_devices() {
        let (sims, devices) = fleet(3);
        let jobs = vec![(&devices[2], Frame::off(2)), (&devices[0], Frame::off(3))];

        let report = frames(&Transmitter::default(), &jobs);
        assert_eq!(report.succeeded, vec![DeviceId::new("d2")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(sims[1].frame_count(), 0);
        assert_eq!(sims[2].frame_count(), 1);
    }
}
