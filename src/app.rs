//! Headless settings screen used by the binary.
//!
//! Renders the MiaoMiao settings table to the log instead of a window, and
//! walks through presenting the screen, receiving telemetry and dismissing it.

use anyhow::Context;
use cgm_peripherals::i18n::t;
use cgm_peripherals::peripherals::{
    BluetoothPeripheral, BluetoothPeripheralManager, BluetoothPeripheralManaging,
    CgmMiaoMiaoTransmitter, MiaoMiao, MiaoMiaoTelemetry,
};
use cgm_peripherals::ui::screens::miaomiao::Setting;
use cgm_peripherals::ui::{
    AccessoryType, BluetoothPeripheralViewModel, IndexPath, PeripheralSettingsHost, RowAnimation,
    SettingsCell, SettingsSelectedRowAction, SettingsTable,
};
use cgm_peripherals::MiaoMiaoBluetoothPeripheralViewModel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Settings screen that writes its rows to the log.
pub struct ConsoleSettingsScreen {
    peripheral: Rc<dyn BluetoothPeripheral>,
    /// Sections shown before the peripheral specific ones
    general_sections: Cell<usize>,
    /// The screen owns its view model
    view_model: RefCell<Option<Rc<dyn BluetoothPeripheralViewModel>>>,
}

impl ConsoleSettingsScreen {
    pub fn new(peripheral: Rc<dyn BluetoothPeripheral>, general_sections: usize) -> Rc<Self> {
        Rc::new(Self {
            peripheral,
            general_sections: Cell::new(general_sections),
            view_model: RefCell::new(None),
        })
    }

    /// Present the screen with `view_model` and bind it to the manager.
    pub fn present(
        self: &Rc<Self>,
        view_model: Rc<dyn BluetoothPeripheralViewModel>,
        manager: &Rc<dyn BluetoothPeripheralManaging>,
    ) {
        let table: Rc<dyn SettingsTable> = self.clone();
        let host: Rc<dyn PeripheralSettingsHost> = self.clone();
        view_model.configure(Some(self.peripheral.clone()), manager, &table, &host);

        tracing::info!("== {} ==", view_model.screen_title());
        *self.view_model.borrow_mut() = Some(view_model);
        self.render_all();
    }

    /// Close the screen, dropping its view model.
    pub fn dismiss(&self) {
        let view_model = self.view_model.borrow_mut().take();
        if let Some(view_model) = view_model {
            tracing::info!("Closing {} settings", view_model.screen_title());
        }
    }

    pub fn set_general_sections(&self, count: usize) {
        self.general_sections.set(count);
    }

    /// Tap a row of the peripheral specific section.
    pub fn tap(&self, row: usize, manager: &dyn BluetoothPeripheralManaging) {
        let Some(view_model) = self.view_model.borrow().clone() else {
            return;
        };
        match view_model.user_did_select_row(row, 0, self.peripheral.as_ref(), manager) {
            SettingsSelectedRowAction::Nothing => tracing::info!("Tapped row {}, nothing to show", row),
            SettingsSelectedRowAction::ShowInfoText { title, message } => {
                tracing::info!("[{}] {}", title, message)
            }
        }
    }

    fn render_all(&self) {
        let Some(view_model) = self.view_model.borrow().clone() else {
            return;
        };
        let general = self.general_sections.get();
        for section in 0..view_model.number_of_sections() {
            tracing::info!("-- {} --", view_model.section_title(section));
            for row in 0..view_model.number_of_settings(section) {
                self.render_row(view_model.as_ref(), IndexPath::new(general + section, row));
            }
        }
    }

    fn render_row(&self, view_model: &dyn BluetoothPeripheralViewModel, index_path: IndexPath) {
        let Some(section) = index_path.section.checked_sub(self.general_sections.get()) else {
            tracing::info!("{} {}", index_path, t("general"));
            return;
        };

        let mut cell = SettingsCell::new();
        view_model.update(&mut cell, index_path.row, section, self.peripheral.as_ref());

        let chevron = match cell.accessory_type {
            AccessoryType::DisclosureIndicator => " >",
            _ => "",
        };
        tracing::info!(
            "{} {}: {}{}",
            index_path,
            cell.text.as_deref().unwrap_or(""),
            cell.detail_display(),
            chevron
        );
    }
}

impl PeripheralSettingsHost for ConsoleSettingsScreen {
    fn number_of_general_sections(&self) -> usize {
        self.general_sections.get()
    }
}

impl SettingsTable for ConsoleSettingsScreen {
    fn reload_rows(&self, index_paths: &[IndexPath], _animation: RowAnimation) {
        let Some(view_model) = self.view_model.borrow().clone() else {
            return;
        };
        for index_path in index_paths {
            self.render_row(view_model.as_ref(), *index_path);
        }
    }
}

/// Present the MiaoMiao settings screen around a stream of telemetry.
pub fn run_walkthrough() -> anyhow::Result<()> {
    let manager = BluetoothPeripheralManager::new();
    let events = manager.event_receiver();

    let miaomiao: Rc<dyn BluetoothPeripheral> =
        Rc::new(MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2"));
    manager.register(miaomiao.clone())?;
    tracing::info!("Paired peripherals: {}", manager.addresses().join(", "));

    let transmitter = manager
        .bluetooth_transmitter(miaomiao.as_ref(), true)
        .context("no transmitter for the MiaoMiao")?;
    let driver = transmitter
        .downcast_ref::<CgmMiaoMiaoTransmitter>()
        .context("transmitter is not a MiaoMiao transmitter")?;

    // Before the screen is shown only the manager hears the device.
    driver.deliver(MiaoMiaoTelemetry::BatteryLevel(87));

    let manager_handle: Rc<dyn BluetoothPeripheralManaging> = manager.clone();
    let screen = ConsoleSettingsScreen::new(miaomiao.clone(), 1);
    screen.present(MiaoMiaoBluetoothPeripheralViewModel::new(), &manager_handle);

    driver.deliver(MiaoMiaoTelemetry::Firmware("0x39".to_string()));
    driver.deliver(MiaoMiaoTelemetry::Hardware("0x0A".to_string()));
    screen.set_general_sections(2);
    driver.deliver(MiaoMiaoTelemetry::SerialNumber("0M00009DHCR".to_string()));

    screen.tap(Setting::BatteryLevel.row(), &*manager);
    screen.tap(Setting::Firmware.row(), &*manager);

    screen.dismiss();
    driver.deliver(MiaoMiaoTelemetry::BatteryLevel(86));

    for event in events.try_iter() {
        tracing::info!("Peripheral event: {:?}", event);
    }

    Ok(())
}
