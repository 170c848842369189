//! Device capabilities and the ordered fleet.
//!
//! Discovery, connection management and the wire transport live in
//! external collaborators. The core only sees them through the two
//! capability traits below and keeps a lightweight [`Device`] handle
//! (id, LED count, capability references) per physical unit.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CapabilityError, FleetError, FleetResult};
use crate::schema::{ConfigError, DeviceId, DeviceSpec};
use crate::topology::Topology;

/// Operating mode of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Static colour mode, the neutral "on" state.
    #[serde(rename = "color")]
    Color,
    /// Real-time mode, frames are taken from the network.
    #[serde(rename = "rt")]
    Realtime,
}

impl Mode {
    /// Name used by device firmware.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Realtime => "rt",
        }
    }
}

/// Power and mode control of one device.
pub trait DeviceLifecycle: Send + Sync {
    fn turn_on(&self) -> Result<(), CapabilityError>;
    fn turn_off(&self) -> Result<(), CapabilityError>;
    fn set_mode(&self, mode: Mode) -> Result<(), CapabilityError>;
    fn mode(&self) -> Result<Mode, CapabilityError>;
    /// Number of LEDs the device reports.
    fn led_count(&self) -> Result<usize, CapabilityError>;
}

/// Real-time frame delivery to one device.
pub trait DeviceTransport: Send + Sync {
    /// Push one frame of flat channel bytes. No retries are expected from callers.
    fn send_realtime_frame(
        &self,
        payload: &[u8],
        protocol_version: u8,
        led_count: usize,
    ) -> Result<(), CapabilityError>;
}

/// Handle to one physical device.
#[derive(Clone)]
pub struct Device {
    id: DeviceId,
    led_count: usize,
    lifecycle: Arc<dyn DeviceLifecycle>,
    transport: Arc<dyn DeviceTransport>,
}

impl Device {
    /// Wrap a handle implementing both capabilities.
    pub fn new<H>(id: impl Into<DeviceId>, led_count: usize, handle: Arc<H>) -> Self
    where
        H: DeviceLifecycle + DeviceTransport + 'static,
    {
        Self {
            id: id.into(),
            led_count,
            lifecycle: handle.clone(),
            transport: handle,
        }
    }

    /// Build from separate capability objects.
    pub fn from_parts(
        id: impl Into<DeviceId>,
        led_count: usize,
        lifecycle: Arc<dyn DeviceLifecycle>,
        transport: Arc<dyn DeviceTransport>,
    ) -> Self {
        Self {
            id: id.into(),
            led_count,
            lifecycle,
            transport,
        }
    }

    /// Wrap a handle, asking the device for its LED count.
    pub fn probe<H>(id: impl Into<DeviceId>, handle: Arc<H>) -> FleetResult<Self>
    where
        H: DeviceLifecycle + DeviceTransport + 'static,
    {
        let id = id.into();
        let led_count = handle
            .led_count()
            .map_err(|source| FleetError::Lifecycle {
                device: id.clone(),
                source,
            })?;
        Ok(Self::new(id, led_count, handle))
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub fn lifecycle(&self) -> &dyn DeviceLifecycle {
        self.lifecycle.as_ref()
    }

    pub fn transport(&self) -> &dyn DeviceTransport {
        self.transport.as_ref()
    }

    pub fn spec(&self) -> DeviceSpec {
        DeviceSpec::new(self.id.clone(), self.led_count)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("led_count", &self.led_count)
            .finish_non_exhaustive()
    }
}

/// A device as yielded by discovery, before ordering.
pub struct DiscoveredDevice<H> {
    pub handle: Arc<H>,
    pub id: DeviceId,
    pub led_count: usize,
    /// Optional ordering hint supplied alongside discovery.
    pub position: Option<i32>,
}

/// Ordered devices plus the topology derived from them.
#[derive(Debug, Clone)]
pub struct Fleet {
    devices: Vec<Device>,
    topology: Topology,
}

impl Fleet {
    /// Build a fleet; device order defines the global index order.
    pub fn new(devices: Vec<Device>) -> Result<Self, ConfigError> {
        let specs: Vec<DeviceSpec> = devices.iter().map(Device::spec).collect();
        let topology = Topology::build(&specs)?;
        Ok(Self { devices, topology })
    }

    /// Build a fleet from discovery results ordered by their position hint.
    ///
    /// Positioned devices come first in ascending order; the rest keep
    /// their discovery order.
    pub fn from_discovered<H>(mut found: Vec<DiscoveredDevice<H>>) -> Result<Self, ConfigError>
    where
        H: DeviceLifecycle + DeviceTransport + 'static,
    {
        found.sort_by_key(|d| (d.position.is_none(), d.position));
        let devices = found
            .into_iter()
            .map(|d| Device::new(d.id, d.led_count, d.handle))
            .collect();
        Self::new(devices)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedDevice;

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Realtime.as_str(), "rt");
        assert_eq!(serde_json::to_string(&Mode::Color).unwrap(), r#""color""#);
        let mode: Mode = serde_json::from_str(r#""rt""#).unwrap();
        assert_eq!(mode, Mode::Realtime);
    }

    #[test]
    fn test_probe_reads_led_count() {
        let device = Device::probe("tree", Arc::new(SimulatedDevice::new(250))).unwrap();
        assert_eq!(device.led_count(), 250);
        assert_eq!(device.id().as_str(), "tree");
    }

    #[test]
    fn test_probe_failure_is_lifecycle_error() {
        let sim = Arc::new(SimulatedDevice::new(10));
        sim.set_offline(true);
        let err = Device::probe("tree", sim).unwrap_err();
        assert!(matches!(err, FleetError::Lifecycle { .. }));
    }

    #[test]
    fn test_fleet_orders_by_position_hint() {
        let found = vec![
            DiscoveredDevice {
                handle: Arc::new(SimulatedDevice::new(3)),
                id: DeviceId::new("c"),
                led_count: 3,
                position: None,
            },
            DiscoveredDevice {
                handle: Arc::new(SimulatedDevice::new(5)),
                id: DeviceId::new("b"),
                led_count: 5,
                position: Some(2),
            },
            DiscoveredDevice {
                handle: Arc::new(SimulatedDevice::new(7)),
                id: DeviceId::new("a"),
                led_count: 7,
                position: Some(1),
            },
            DiscoveredDevice {
                handle: Arc::new(SimulatedDevice::new(2)),
                id: DeviceId::new("d"),
                led_count: 2,
                position: None,
            },
        ];
        let fleet = Fleet::from_discovered(found).unwrap();
        let ids: Vec<&str> = fleet.devices().iter().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(fleet.topology().total_led_count(), 17);
        assert_eq!(fleet.topology().resolve(7).unwrap().device_index, 1);
    }

    #[test]
    fn test_empty_fleet_rejected() {
        assert_eq!(Fleet::new(Vec::new()).unwrap_err(), ConfigError::EmptyFleet);
    }
}
