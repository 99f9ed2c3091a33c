//! Paired Bluetooth peripherals, their transmitters and the peripheral manager.

pub mod manager;
pub mod miaomiao;
pub mod transmitter;
pub mod types;

pub use manager::{BluetoothPeripheralManager, BluetoothPeripheralManaging, PeripheralEvent};
pub use miaomiao::{DeviceSnapshot, MiaoMiao};
pub use transmitter::{
    BluetoothTransmitter, CgmMiaoMiaoTransmitter, CgmMiaoMiaoTransmitterDelegate, DelegateRole,
    MiaoMiaoTelemetry, SubscriptionState,
};
pub use types::{BluetoothPeripheral, PeripheralCategory, PeripheralError, PeripheralType};
