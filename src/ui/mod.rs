//! Settings screen view models and the table interface they drive.

pub mod screens;
pub mod table;

pub use screens::{BluetoothPeripheralViewModel, PeripheralSettingsHost};
pub use table::{
    AccessoryType, AccessoryView, IndexPath, RowAnimation, SettingsCell,
    SettingsSelectedRowAction, SettingsTable,
};
