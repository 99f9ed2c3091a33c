//! CGM peripherals - settings screens for Bluetooth glucose monitors
//!
//! Presents the state of a paired CGM reader (battery, firmware, hardware,
//! sensor serial number) as settings table rows, and relays telemetry from the
//! reader's transmitter to the peripheral manager while a settings screen is
//! open.

pub mod i18n;
pub mod peripherals;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use peripherals::manager::BluetoothPeripheralManager;
pub use peripherals::miaomiao::MiaoMiao;
pub use storage::config::AppConfig;
pub use ui::screens::miaomiao::MiaoMiaoBluetoothPeripheralViewModel;
