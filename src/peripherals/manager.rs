//! Process-wide registry of paired peripherals and their transmitters.
//!
//! The manager outlives every settings screen. Whenever no screen is showing,
//! it is the subscriber of each transmitter it created, so telemetry always
//! lands in the peripheral's snapshot and on the event channel.

use crate::peripherals::miaomiao::MiaoMiao;
use crate::peripherals::transmitter::{
    BluetoothTransmitter, CgmMiaoMiaoTransmitter, CgmMiaoMiaoTransmitterDelegate, DelegateRole,
    MiaoMiaoTelemetry,
};
use crate::peripherals::types::{BluetoothPeripheral, PeripheralError, PeripheralType};
use chrono::{DateTime, Utc};
use crossbeam::channel::{Receiver, Sender};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Events published by the peripheral manager.
#[derive(Debug, Clone, PartialEq)]
pub enum PeripheralEvent {
    /// A peripheral was added to the registry
    Registered {
        address: String,
        peripheral_type: PeripheralType,
    },
    /// A peripheral and its transmitter were removed
    Removed { address: String },
    /// A transmitter was created for a registered peripheral
    TransmitterCreated { address: String },
    /// A telemetry value was stored in the peripheral's snapshot
    Telemetry {
        address: String,
        telemetry: MiaoMiaoTelemetry,
        received_at: DateTime<Utc>,
    },
}

/// What a settings screen needs from the peripheral manager.
pub trait BluetoothPeripheralManaging {
    /// Look up the transmitter for `peripheral`.
    ///
    /// With `create_if_necessary == false` this never creates one.
    fn bluetooth_transmitter(
        &self,
        peripheral: &dyn BluetoothPeripheral,
        create_if_necessary: bool,
    ) -> Option<Rc<dyn BluetoothTransmitter>>;

    /// The manager as a MiaoMiao telemetry subscriber, if it is one.
    fn as_miaomiao_delegate(self: Rc<Self>) -> Option<Rc<dyn CgmMiaoMiaoTransmitterDelegate>> {
        None
    }
}

struct Entry {
    peripheral: Rc<dyn BluetoothPeripheral>,
    transmitter: Option<Rc<dyn BluetoothTransmitter>>,
}

/// Registry of peripherals and fallback telemetry subscriber.
pub struct BluetoothPeripheralManager {
    /// Handle to ourselves, used to subscribe to new transmitters
    this: Weak<BluetoothPeripheralManager>,
    /// Registered peripherals (address -> entry)
    entries: RefCell<HashMap<String, Entry>>,
    /// Channel for publishing peripheral events
    event_tx: RefCell<Option<Sender<PeripheralEvent>>>,
}

impl BluetoothPeripheralManager {
    /// Create an empty manager.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            entries: RefCell::new(HashMap::new()),
            event_tx: RefCell::new(None),
        })
    }

    /// Get an event receiver for peripheral events.
    pub fn event_receiver(&self) -> Receiver<PeripheralEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        *self.event_tx.borrow_mut() = Some(tx);
        rx
    }

    /// Send an event if the channel is available.
    fn send_event(&self, event: PeripheralEvent) {
        if let Some(tx) = self.event_tx.borrow().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Add a paired peripheral.
    pub fn register(&self, peripheral: Rc<dyn BluetoothPeripheral>) -> Result<(), PeripheralError> {
        let address = peripheral.address().to_string();
        let peripheral_type = peripheral.peripheral_type();

        {
            let mut entries = self.entries.borrow_mut();
            if entries.contains_key(&address) {
                return Err(PeripheralError::AlreadyRegistered(address));
            }
            entries.insert(
                address.clone(),
                Entry {
                    peripheral,
                    transmitter: None,
                },
            );
        }

        tracing::info!("Registered {} at {}", peripheral_type, address);
        self.send_event(PeripheralEvent::Registered {
            address,
            peripheral_type,
        });
        Ok(())
    }

    /// Remove a peripheral and drop its transmitter.
    pub fn remove(&self, address: &str) -> Result<(), PeripheralError> {
        self.entries
            .borrow_mut()
            .remove(address)
            .ok_or_else(|| PeripheralError::NotFound(address.to_string()))?;

        tracing::info!("Removed peripheral {}", address);
        self.send_event(PeripheralEvent::Removed {
            address: address.to_string(),
        });
        Ok(())
    }

    /// Look up a registered peripheral by address.
    pub fn peripheral(&self, address: &str) -> Option<Rc<dyn BluetoothPeripheral>> {
        self.entries
            .borrow()
            .get(address)
            .map(|entry| entry.peripheral.clone())
    }

    /// Addresses of all registered peripherals.
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.entries.borrow().keys().cloned().collect();
        addresses.sort();
        addresses
    }

    fn create_transmitter(
        &self,
        peripheral: &dyn BluetoothPeripheral,
    ) -> Result<Rc<dyn BluetoothTransmitter>, PeripheralError> {
        match peripheral.peripheral_type() {
            PeripheralType::MiaoMiao => {
                let transmitter = CgmMiaoMiaoTransmitter::new(peripheral.address());
                let delegate: Weak<dyn CgmMiaoMiaoTransmitterDelegate> = self.this.clone();
                transmitter.set_delegate(Some(delegate));
                Ok(Rc::new(transmitter))
            }
            other => Err(PeripheralError::UnsupportedTransmitter(other)),
        }
    }

    /// Store a telemetry value in the snapshot of the peripheral at `address`.
    fn store(&self, address: &str, telemetry: MiaoMiaoTelemetry) {
        let Some(peripheral) = self.peripheral(address) else {
            tracing::warn!("Telemetry for unknown peripheral {}: {:?}", address, telemetry);
            return;
        };
        let Some(miaomiao) = peripheral.downcast_ref::<MiaoMiao>() else {
            tracing::warn!(
                "Telemetry for {} which is a {}, not a MiaoMiao",
                address,
                peripheral.peripheral_type()
            );
            return;
        };

        miaomiao.update_snapshot(|snapshot| match &telemetry {
            MiaoMiaoTelemetry::BatteryLevel(level) => snapshot.battery_level = *level,
            MiaoMiaoTelemetry::SerialNumber(serial) => {
                snapshot.sensor_serial_number = Some(serial.clone())
            }
            MiaoMiaoTelemetry::Firmware(firmware) => snapshot.firmware = Some(firmware.clone()),
            MiaoMiaoTelemetry::Hardware(hardware) => snapshot.hardware = Some(hardware.clone()),
        });

        tracing::debug!("Stored {:?} for {}", telemetry, address);
        self.send_event(PeripheralEvent::Telemetry {
            address: address.to_string(),
            telemetry,
            received_at: Utc::now(),
        });
    }
}

impl BluetoothPeripheralManaging for BluetoothPeripheralManager {
    fn bluetooth_transmitter(
        &self,
        peripheral: &dyn BluetoothPeripheral,
        create_if_necessary: bool,
    ) -> Option<Rc<dyn BluetoothTransmitter>> {
        let address = peripheral.address();

        if let Some(existing) = self
            .entries
            .borrow()
            .get(address)
            .and_then(|entry| entry.transmitter.clone())
        {
            return Some(existing);
        }

        if !create_if_necessary {
            return None;
        }

        if !self.entries.borrow().contains_key(address) {
            tracing::warn!("Cannot create transmitter for unregistered {}", address);
            return None;
        }

        let transmitter = match self.create_transmitter(peripheral) {
            Ok(transmitter) => transmitter,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        if let Some(entry) = self.entries.borrow_mut().get_mut(address) {
            entry.transmitter = Some(transmitter.clone());
        }

        tracing::info!("Created transmitter for {}", address);
        self.send_event(PeripheralEvent::TransmitterCreated {
            address: address.to_string(),
        });
        Some(transmitter)
    }

    fn as_miaomiao_delegate(self: Rc<Self>) -> Option<Rc<dyn CgmMiaoMiaoTransmitterDelegate>> {
        Some(self)
    }
}

impl CgmMiaoMiaoTransmitterDelegate for BluetoothPeripheralManager {
    fn received_battery_level(&self, battery_level: u8, from: &CgmMiaoMiaoTransmitter) {
        self.store(
            from.device_address(),
            MiaoMiaoTelemetry::BatteryLevel(battery_level),
        );
    }

    fn received_serial_number(&self, serial_number: &str, from: &CgmMiaoMiaoTransmitter) {
        self.store(
            from.device_address(),
            MiaoMiaoTelemetry::SerialNumber(serial_number.to_string()),
        );
    }

    fn received_firmware(&self, firmware: &str, from: &CgmMiaoMiaoTransmitter) {
        self.store(
            from.device_address(),
            MiaoMiaoTelemetry::Firmware(firmware.to_string()),
        );
    }

    fn received_hardware(&self, hardware: &str, from: &CgmMiaoMiaoTransmitter) {
        self.store(
            from.device_address(),
            MiaoMiaoTelemetry::Hardware(hardware.to_string()),
        );
    }

    fn role(&self) -> DelegateRole {
        DelegateRole::Manager
    }
}
