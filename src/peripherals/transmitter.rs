//! Transmitter (driver) side of a peripheral: typed telemetry callbacks and
//! the single subscriber slot.
//!
//! A transmitter lives as long as its peripheral stays connected. It decodes
//! device notifications elsewhere and hands each decoded field to exactly one
//! delegate. The delegate is held weakly: a dismissed settings screen never
//! stays alive because the driver still points at it.

use crate::peripherals::types::PeripheralType;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Common interface of all transmitters held by the peripheral manager.
pub trait BluetoothTransmitter {
    /// BLE address of the device this transmitter talks to.
    fn device_address(&self) -> &str;

    fn peripheral_type(&self) -> PeripheralType;

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn BluetoothTransmitter + 'a {
    /// Downcast to a concrete transmitter.
    pub fn downcast_ref<T: BluetoothTransmitter + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Who currently owns a transmitter's subscriber slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateRole {
    /// The long-lived peripheral manager
    Manager,
    /// A settings screen view model
    ViewModel,
}

/// Subscription state of a transmitter, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    SubscribedToManager,
    SubscribedToViewModel,
}

/// One decoded value from a MiaoMiao.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiaoMiaoTelemetry {
    BatteryLevel(u8),
    SerialNumber(String),
    Firmware(String),
    Hardware(String),
}

/// Receiver of MiaoMiao telemetry.
pub trait CgmMiaoMiaoTransmitterDelegate {
    fn received_battery_level(&self, battery_level: u8, from: &CgmMiaoMiaoTransmitter);

    fn received_serial_number(&self, serial_number: &str, from: &CgmMiaoMiaoTransmitter);

    fn received_firmware(&self, firmware: &str, from: &CgmMiaoMiaoTransmitter);

    fn received_hardware(&self, hardware: &str, from: &CgmMiaoMiaoTransmitter);

    /// Role of this delegate in the subscription.
    fn role(&self) -> DelegateRole;
}

/// Driver for a MiaoMiao Libre reader.
pub struct CgmMiaoMiaoTransmitter {
    address: String,
    delegate: RefCell<Option<Weak<dyn CgmMiaoMiaoTransmitterDelegate>>>,
}

impl CgmMiaoMiaoTransmitter {
    /// Create a transmitter for the device at `address` with no subscriber.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            delegate: RefCell::new(None),
        }
    }

    /// Replace the subscriber. Whoever sets it last owns the slot.
    pub fn set_delegate(&self, delegate: Option<Weak<dyn CgmMiaoMiaoTransmitterDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    /// Current subscriber, if it is still alive.
    pub fn delegate(&self) -> Option<Rc<dyn CgmMiaoMiaoTransmitterDelegate>> {
        self.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn subscription_state(&self) -> SubscriptionState {
        match self.delegate().map(|d| d.role()) {
            None => SubscriptionState::Unsubscribed,
            Some(DelegateRole::Manager) => SubscriptionState::SubscribedToManager,
            Some(DelegateRole::ViewModel) => SubscriptionState::SubscribedToViewModel,
        }
    }

    /// Hand one decoded value to the current subscriber.
    ///
    /// The slot borrow is released before the callback runs, so a delegate
    /// may replace itself from inside the callback.
    pub fn deliver(&self, telemetry: MiaoMiaoTelemetry) {
        let Some(delegate) = self.delegate() else {
            tracing::warn!(
                "MiaoMiao {} has no live subscriber, dropping {:?}",
                self.address,
                telemetry
            );
            return;
        };

        match &telemetry {
            MiaoMiaoTelemetry::BatteryLevel(level) => delegate.received_battery_level(*level, self),
            MiaoMiaoTelemetry::SerialNumber(serial) => delegate.received_serial_number(serial, self),
            MiaoMiaoTelemetry::Firmware(firmware) => delegate.received_firmware(firmware, self),
            MiaoMiaoTelemetry::Hardware(hardware) => delegate.received_hardware(hardware, self),
        }
    }
}

impl BluetoothTransmitter for CgmMiaoMiaoTransmitter {
    fn device_address(&self) -> &str {
        &self.address
    }

    fn peripheral_type(&self) -> PeripheralType {
        PeripheralType::MiaoMiao
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for CgmMiaoMiaoTransmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CgmMiaoMiaoTransmitter")
            .field("address", &self.address)
            .field("subscription", &self.subscription_state())
            .finish()
    }
}
