//! Global LED index space over an ordered fleet of devices.
//!
//! Devices are concatenated in topology order. A prefix-sum table of LED
//! counts maps a global index to `(device, local index)` with a binary
//! search, so a lookup costs O(log devices) regardless of string length.
//!
//! A topology is immutable. When the device set changes a new one is
//! built from scratch.

use std::collections::HashSet;
use std::ops::Range;

use crate::error::{FleetError, FleetResult};
use crate::schema::{ConfigError, DeviceId, DeviceSpec, Frame};

/// Position of one LED on a specific device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Index of the device in topology order.
    pub device_index: usize,
    /// Index of the LED on that device.
    pub local_index: usize,
}

/// Prefix-sum mapping from global LED indices to devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    ids: Vec<DeviceId>,
    /// `cumulative[i]` is the first global index of device `i`;
    /// the last entry is the total LED count.
    cumulative: Vec<usize>,
}

impl Topology {
    /// Build the mapping for `devices` in the given order.
    pub fn build(devices: &[DeviceSpec]) -> Result<Self, ConfigError> {
        if devices.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }

        let mut seen = HashSet::with_capacity(devices.len());
        let mut cumulative = Vec::with_capacity(devices.len() + 1);
        cumulative.push(0);

        for spec in devices {
            if spec.led_count == 0 {
                return Err(ConfigError::ZeroLedCount {
                    device: spec.id.clone(),
                });
            }
            if !seen.insert(&spec.id) {
                return Err(ConfigError::DuplicateDevice {
                    device: spec.id.clone(),
                });
            }
            let start = cumulative[cumulative.len() - 1];
            cumulative.push(start + spec.led_count);
        }

        Ok(Self {
            ids: devices.iter().map(|d| d.id.clone()).collect(),
            cumulative,
        })
    }

    /// Sum of all device LED counts.
    #[inline]
    pub fn total_led_count(&self) -> usize {
        self.cumulative[self.ids.len()]
    }

    pub fn device_count(&self) -> usize {
        self.ids.len()
    }

    pub fn device_ids(&self) -> &[DeviceId] {
        &self.ids
    }

    pub fn device_id(&self, device_index: usize) -> Option<&DeviceId> {
        self.ids.get(device_index)
    }

    pub fn led_count(&self, device_index: usize) -> Option<usize> {
        self.device_range(device_index).map(|r| r.len())
    }

    /// Global indices covered by a device.
    pub fn device_range(&self, device_index: usize) -> Option<Range<usize>> {
        (device_index < self.ids.len())
            .then(|| self.cumulative[device_index]..self.cumulative[device_index + 1])
    }

    /// Map a global index to its device and local index.
    pub fn resolve(&self, global_index: usize) -> FleetResult<Location> {
        let total = self.total_led_count();
        if global_index >= total {
            return Err(FleetError::IndexOutOfRange {
                index: global_index,
                total,
            });
        }

        // First boundary strictly above the index, minus one, is the owner.
        let device_index = self.cumulative.partition_point(|&start| start <= global_index) - 1;
        Ok(Location {
            device_index,
            local_index: global_index - self.cumulative[device_index],
        })
    }

    /// Inverse of [`resolve`](Self::resolve).
    pub fn global_index(&self, location: Location) -> Option<usize> {
        let range = self.device_range(location.device_index)?;
        (location.local_index < range.len()).then(|| range.start + location.local_index)
    }

    /// Cut a frame spanning the global index space into one frame per device.
    pub fn split_frame(&self, frame: &Frame) -> FleetResult<Vec<Frame>> {
        let total = self.total_led_count();
        if frame.len() != total {
            return Err(FleetError::FrameShape {
                found: frame.len(),
                total,
            });
        }
        Ok(self
            .cumulative
            .windows(2)
            .map(|w| Frame::from_pixels(frame[w[0]..w[1]].to_vec()))
            .collect())
    }
}
