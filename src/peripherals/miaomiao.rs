//! MiaoMiao Libre reader peripheral and its last-known device state.

use crate::peripherals::types::{BluetoothPeripheral, PeripheralType};
use chrono::{DateTime, Utc};
use std::any::Any;
use std::cell::{Ref, RefCell};
use uuid::Uuid;

/// Last decoded values reported by a MiaoMiao.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Battery level percentage, 0 until the device reports one
    pub battery_level: u8,
    /// Firmware version
    pub firmware: Option<String>,
    /// Hardware version
    pub hardware: Option<String>,
    /// Serial number of the Libre sensor currently attached
    pub sensor_serial_number: Option<String>,
    /// When any field was last written
    pub last_updated: Option<DateTime<Utc>>,
}

/// A paired MiaoMiao.
///
/// The snapshot is written by whoever receives telemetry on behalf of the
/// app (normally the peripheral manager) and read by the settings screen.
#[derive(Debug)]
pub struct MiaoMiao {
    id: Uuid,
    address: String,
    name: String,
    snapshot: RefCell<DeviceSnapshot>,
}

impl MiaoMiao {
    /// Create a MiaoMiao with an empty snapshot.
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            name: name.into(),
            snapshot: RefCell::new(DeviceSnapshot::default()),
        }
    }

    /// Battery level percentage, 0 if unknown.
    pub fn battery_level(&self) -> u8 {
        self.snapshot.borrow().battery_level
    }

    pub fn firmware(&self) -> Option<String> {
        self.snapshot.borrow().firmware.clone()
    }

    pub fn hardware(&self) -> Option<String> {
        self.snapshot.borrow().hardware.clone()
    }

    pub fn sensor_serial_number(&self) -> Option<String> {
        self.snapshot.borrow().sensor_serial_number.clone()
    }

    /// Borrow the whole snapshot.
    pub fn snapshot(&self) -> Ref<'_, DeviceSnapshot> {
        self.snapshot.borrow()
    }

    /// Apply a change to the snapshot and stamp the update time.
    pub fn update_snapshot(&self, change: impl FnOnce(&mut DeviceSnapshot)) {
        let mut snapshot = self.snapshot.borrow_mut();
        change(&mut snapshot);
        snapshot.last_updated = Some(Utc::now());
    }
}

impl BluetoothPeripheral for MiaoMiao {
    fn id(&self) -> Uuid {
        self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn peripheral_type(&self) -> PeripheralType {
        PeripheralType::MiaoMiao
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
