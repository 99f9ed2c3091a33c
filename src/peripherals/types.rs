//! Peripheral types and the common peripheral interface.

use std::any::Any;
use thiserror::Error;
use uuid::Uuid;

/// Kind of Bluetooth peripheral the app can pair with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeripheralType {
    /// MiaoMiao Libre reader
    MiaoMiao,
    /// Bubble Libre reader
    Bubble,
    /// Libre 2 direct connection
    Libre2,
    /// Dexcom G5 transmitter
    DexcomG5,
    /// M5Stack glucose display
    M5Stack,
}

/// Broad category a peripheral type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeripheralCategory {
    /// Continuous glucose monitor or reader
    Cgm,
    /// Anything that consumes readings rather than producing them
    Other,
}

impl PeripheralType {
    /// Name shown as screen and section title.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MiaoMiao => "MiaoMiao",
            Self::Bubble => "Bubble",
            Self::Libre2 => "Libre 2",
            Self::DexcomG5 => "Dexcom G5",
            Self::M5Stack => "M5Stack",
        }
    }

    /// Category of this peripheral type.
    pub fn category(&self) -> PeripheralCategory {
        match self {
            Self::M5Stack => PeripheralCategory::Other,
            _ => PeripheralCategory::Cgm,
        }
    }

    /// Whether raw sensor data from this type can be calibrated by the web OOP algorithm.
    pub fn can_web_oop(&self) -> bool {
        matches!(self, Self::MiaoMiao | Self::Bubble | Self::Libre2)
    }

    /// Get all peripheral types.
    pub fn all() -> &'static [PeripheralType] {
        &[
            Self::MiaoMiao,
            Self::Bubble,
            Self::Libre2,
            Self::DexcomG5,
            Self::M5Stack,
        ]
    }
}

impl std::fmt::Display for PeripheralType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A paired Bluetooth peripheral.
///
/// Concrete peripherals are reached through [`BluetoothPeripheral::as_any`] so
/// that a view model can check it was handed the type it specializes in.
pub trait BluetoothPeripheral {
    /// Unique identifier
    fn id(&self) -> Uuid;

    /// BLE device address
    fn address(&self) -> &str;

    /// User-friendly name (from BLE advertisement)
    fn name(&self) -> &str;

    /// Type of peripheral
    fn peripheral_type(&self) -> PeripheralType;

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn BluetoothPeripheral + 'a {
    /// Downcast to a concrete peripheral.
    pub fn downcast_ref<T: BluetoothPeripheral + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl<'a> std::fmt::Debug for dyn BluetoothPeripheral + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BluetoothPeripheral")
            .field("type", &self.peripheral_type())
            .field("address", &self.address())
            .field("name", &self.name())
            .finish()
    }
}

/// Peripheral registry errors.
#[derive(Debug, Error)]
pub enum PeripheralError {
    #[error("Peripheral already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Peripheral not found: {0}")]
    NotFound(String),

    #[error("No transmitter available for {0}")]
    UnsupportedTransmitter(PeripheralType),
}
