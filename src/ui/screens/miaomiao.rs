//! Settings screen view model for the MiaoMiao.
//!
//! While its screen is showing, the view model is the MiaoMiao transmitter's
//! subscriber: every telemetry value is passed on to the peripheral manager
//! first and then the matching row is redrawn. When the view model is dropped
//! the manager gets its subscription back.

use crate::i18n::t;
use crate::peripherals::manager::BluetoothPeripheralManaging;
use crate::peripherals::miaomiao::MiaoMiao;
use crate::peripherals::transmitter::{
    BluetoothTransmitter, CgmMiaoMiaoTransmitter, CgmMiaoMiaoTransmitterDelegate, DelegateRole,
};
use crate::peripherals::types::{BluetoothPeripheral, PeripheralType};
use crate::ui::screens::{BluetoothPeripheralViewModel, PeripheralSettingsHost};
use crate::ui::table::{
    AccessoryType, IndexPath, RowAnimation, SettingsCell, SettingsSelectedRowAction,
    SettingsTable,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// MiaoMiao specific settings, one row each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    BatteryLevel = 0,
    Firmware = 1,
    Hardware = 2,
    SensorSerialNumber = 3,
}

impl Setting {
    /// All settings in row order.
    pub const ALL: [Setting; 4] = [
        Setting::BatteryLevel,
        Setting::Firmware,
        Setting::Hardware,
        Setting::SensorSerialNumber,
    ];

    pub fn from_row(row: usize) -> Option<Self> {
        Self::ALL.get(row).copied()
    }

    pub fn row(self) -> usize {
        self as usize
    }

    /// Localized name shown in the primary label.
    pub fn label(self) -> String {
        match self {
            Setting::BatteryLevel => t("battery-level"),
            Setting::Firmware => t("firmware"),
            Setting::Hardware => t("hardware"),
            Setting::SensorSerialNumber => t("sensor-serial-number"),
        }
    }
}

/// MiaoMiao settings sit in section 0 after the general sections.
const MIAOMIAO_SECTION: usize = 0;

/// References handed over in `configure`. Only the peripheral is owned.
#[derive(Default)]
struct Bindings {
    manager: Option<Weak<dyn BluetoothPeripheralManaging>>,
    table: Option<Weak<dyn SettingsTable>>,
    host: Option<Weak<dyn PeripheralSettingsHost>>,
    peripheral: Option<Rc<dyn BluetoothPeripheral>>,
}

/// View model for one presentation of the MiaoMiao settings screen.
pub struct MiaoMiaoBluetoothPeripheralViewModel {
    this: Weak<MiaoMiaoBluetoothPeripheralViewModel>,
    bindings: RefCell<Bindings>,
}

impl MiaoMiaoBluetoothPeripheralViewModel {
    /// Create an unconfigured view model.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            bindings: RefCell::new(Bindings::default()),
        })
    }

    fn manager(&self) -> Option<Rc<dyn BluetoothPeripheralManaging>> {
        self.bindings.borrow().manager.as_ref().and_then(Weak::upgrade)
    }

    fn expect_miaomiao<'a>(peripheral: &'a dyn BluetoothPeripheral, operation: &str) -> &'a MiaoMiao {
        peripheral.downcast_ref::<MiaoMiao>().unwrap_or_else(|| {
            panic!(
                "MiaoMiaoBluetoothPeripheralViewModel {}, peripheral is a {}, not a MiaoMiao",
                operation,
                peripheral.peripheral_type()
            )
        })
    }

    fn expect_setting(row: usize, operation: &str) -> Setting {
        Setting::from_row(row).unwrap_or_else(|| {
            panic!(
                "MiaoMiaoBluetoothPeripheralViewModel {}, unexpected setting row {}",
                operation, row
            )
        })
    }

    /// Run `f` on the MiaoMiao transmitter of `peripheral`, if one exists.
    fn with_transmitter(
        manager: &dyn BluetoothPeripheralManaging,
        peripheral: &dyn BluetoothPeripheral,
        f: impl FnOnce(&CgmMiaoMiaoTransmitter),
    ) -> bool {
        let Some(transmitter) = manager.bluetooth_transmitter(peripheral, false) else {
            return false;
        };
        match transmitter.downcast_ref::<CgmMiaoMiaoTransmitter>() {
            Some(miaomiao_transmitter) => {
                f(miaomiao_transmitter);
                true
            }
            None => false,
        }
    }

    /// Pass an event to the manager, then redraw the row for `setting`.
    fn relay(&self, setting: Setting, forward: impl FnOnce(&dyn CgmMiaoMiaoTransmitterDelegate)) {
        match self.manager().and_then(|manager| manager.as_miaomiao_delegate()) {
            Some(delegate) => forward(delegate.as_ref()),
            None => tracing::debug!(
                "Peripheral manager gone or not a MiaoMiao subscriber, {:?} not forwarded",
                setting
            ),
        }

        self.reload_row(setting);
    }

    fn reload_row(&self, setting: Setting) {
        let (host, table) = {
            let bindings = self.bindings.borrow();
            (
                bindings.host.as_ref().and_then(Weak::upgrade),
                bindings.table.as_ref().and_then(Weak::upgrade),
            )
        };

        let Some(host) = host else {
            tracing::debug!("Settings screen is gone, not refreshing {:?}", setting);
            return;
        };
        let Some(table) = table else {
            tracing::debug!("Settings table is gone, not refreshing {:?}", setting);
            return;
        };

        // The number of general sections can change, ask every time.
        let index_path = IndexPath::new(
            host.number_of_general_sections() + MIAOMIAO_SECTION,
            setting.row(),
        );
        table.reload_rows(&[index_path], RowAnimation::None);
    }
}

impl BluetoothPeripheralViewModel for MiaoMiaoBluetoothPeripheralViewModel {
    fn configure(
        &self,
        peripheral: Option<Rc<dyn BluetoothPeripheral>>,
        manager: &Rc<dyn BluetoothPeripheralManaging>,
        table: &Rc<dyn SettingsTable>,
        host: &Rc<dyn PeripheralSettingsHost>,
    ) {
        if let Some(peripheral) = &peripheral {
            Self::expect_miaomiao(peripheral.as_ref(), "configure");
        }

        {
            let mut bindings = self.bindings.borrow_mut();
            bindings.manager = Some(Rc::downgrade(manager));
            bindings.table = Some(Rc::downgrade(table));
            bindings.host = Some(Rc::downgrade(host));
            bindings.peripheral = peripheral.clone();
        }

        let Some(peripheral) = peripheral else {
            return;
        };

        let delegate: Weak<dyn CgmMiaoMiaoTransmitterDelegate> = self.this.clone();
        let subscribed = Self::with_transmitter(manager.as_ref(), peripheral.as_ref(), |transmitter| {
            transmitter.set_delegate(Some(delegate))
        });

        if subscribed {
            tracing::info!(
                "MiaoMiao settings screen subscribed to {}",
                peripheral.address()
            );
        } else {
            tracing::debug!("No transmitter for {}, not subscribing", peripheral.address());
        }
    }

    fn screen_title(&self) -> String {
        PeripheralType::MiaoMiao.display_name().to_string()
    }

    fn section_title(&self, _section: usize) -> String {
        PeripheralType::MiaoMiao.display_name().to_string()
    }

    fn number_of_sections(&self) -> usize {
        1
    }

    fn number_of_settings(&self, _section: usize) -> usize {
        Setting::ALL.len()
    }

    fn update(
        &self,
        cell: &mut SettingsCell,
        row: usize,
        _section: usize,
        peripheral: &dyn BluetoothPeripheral,
    ) {
        let miaomiao = Self::expect_miaomiao(peripheral, "update");
        let setting = Self::expect_setting(row, "update");

        cell.accessory_view = None;
        cell.text = Some(setting.label());

        match setting {
            Setting::BatteryLevel => {
                let level = miaomiao.battery_level();
                cell.detail_text = Some(if level > 0 {
                    format!("{} %", level)
                } else {
                    String::new()
                });
                cell.accessory_type = AccessoryType::None;
            }
            Setting::Firmware => {
                cell.detail_text = miaomiao.firmware();
                cell.accessory_type = AccessoryType::DisclosureIndicator;
            }
            Setting::Hardware => {
                cell.detail_text = miaomiao.hardware();
                cell.accessory_type = AccessoryType::DisclosureIndicator;
            }
            Setting::SensorSerialNumber => {
                cell.detail_text = miaomiao.sensor_serial_number();
                cell.accessory_type = AccessoryType::DisclosureIndicator;
            }
        }
    }

    fn user_did_select_row(
        &self,
        row: usize,
        _section: usize,
        peripheral: &dyn BluetoothPeripheral,
        _manager: &dyn BluetoothPeripheralManaging,
    ) -> SettingsSelectedRowAction {
        let miaomiao = Self::expect_miaomiao(peripheral, "user_did_select_row");
        let setting = Self::expect_setting(row, "user_did_select_row");

        // Versions and serial can be wider than the row, the pop-up shows them in full.
        let value = match setting {
            Setting::BatteryLevel => None,
            Setting::Firmware => miaomiao.firmware(),
            Setting::Hardware => miaomiao.hardware(),
            Setting::SensorSerialNumber => miaomiao.sensor_serial_number(),
        };

        match value {
            Some(value) => SettingsSelectedRowAction::ShowInfoText {
                title: t("info"),
                message: format!("{} : {}", setting.label(), value),
            },
            None => SettingsSelectedRowAction::Nothing,
        }
    }

    fn can_web_oop(&self) -> bool {
        PeripheralType::MiaoMiao.can_web_oop()
    }
}

impl CgmMiaoMiaoTransmitterDelegate for MiaoMiaoBluetoothPeripheralViewModel {
    fn received_battery_level(&self, battery_level: u8, from: &CgmMiaoMiaoTransmitter) {
        self.relay(Setting::BatteryLevel, |manager| {
            manager.received_battery_level(battery_level, from)
        });
    }

    fn received_serial_number(&self, serial_number: &str, from: &CgmMiaoMiaoTransmitter) {
        self.relay(Setting::SensorSerialNumber, |manager| {
            manager.received_serial_number(serial_number, from)
        });
    }

    fn received_firmware(&self, firmware: &str, from: &CgmMiaoMiaoTransmitter) {
        self.relay(Setting::Firmware, |manager| {
            manager.received_firmware(firmware, from)
        });
    }

    fn received_hardware(&self, hardware: &str, from: &CgmMiaoMiaoTransmitter) {
        self.relay(Setting::Hardware, |manager| {
            manager.received_hardware(hardware, from)
        });
    }

    fn role(&self) -> DelegateRole {
        DelegateRole::ViewModel
    }
}

/// Hands the transmitter back to the manager.
///
/// This happens even when a newer view model has taken the slot in the
/// meantime: only one MiaoMiao settings screen is expected at a time.
impl Drop for MiaoMiaoBluetoothPeripheralViewModel {
    fn drop(&mut self) {
        let bindings = self.bindings.get_mut();

        let Some(manager) = bindings.manager.as_ref().and_then(Weak::upgrade) else {
            tracing::trace!("MiaoMiao view model dropped without a live manager");
            return;
        };
        let Some(peripheral) = bindings.peripheral.as_ref() else {
            tracing::trace!("MiaoMiao view model dropped without a peripheral");
            return;
        };

        let restored = Self::with_transmitter(manager.as_ref(), peripheral.as_ref(), |transmitter| {
            match manager.clone().as_miaomiao_delegate() {
                Some(delegate) => transmitter.set_delegate(Some(Rc::downgrade(&delegate))),
                None => {
                    tracing::warn!(
                        "Peripheral manager does not take MiaoMiao telemetry, {} left unsubscribed",
                        transmitter.device_address()
                    );
                    transmitter.set_delegate(None);
                }
            }
        });

        if restored {
            tracing::info!(
                "MiaoMiao settings screen closed, manager subscribed to {} again",
                peripheral.address()
            );
        }
    }
}
