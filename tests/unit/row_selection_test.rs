//! Unit tests for tapping MiaoMiao settings rows.

use cgm_peripherals::peripherals::{
    BluetoothPeripheral, BluetoothPeripheralManager, MiaoMiao, PeripheralType,
};
use cgm_peripherals::ui::screens::miaomiao::Setting;
use cgm_peripherals::ui::{BluetoothPeripheralViewModel, SettingsSelectedRowAction};
use cgm_peripherals::MiaoMiaoBluetoothPeripheralViewModel;

fn select(peripheral: &MiaoMiao, setting: Setting) -> SettingsSelectedRowAction {
    let view_model = MiaoMiaoBluetoothPeripheralViewModel::new();
    let manager = BluetoothPeripheralManager::new();
    view_model.user_did_select_row(setting.row(), 0, peripheral, &*manager)
}

/// A display, not a reader.
struct M5Stack;

impl BluetoothPeripheral for M5Stack {
    fn id(&self) -> uuid::Uuid {
        uuid::Uuid::nil()
    }

    fn address(&self) -> &str {
        "00:11:22:33:44:55"
    }

    fn name(&self) -> &str {
        "M5Stack"
    }

    fn peripheral_type(&self) -> PeripheralType {
        PeripheralType::M5Stack
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn info(message: &str) -> SettingsSelectedRowAction {
    SettingsSelectedRowAction::ShowInfoText {
        title: "Info".to_string(),
        message: message.to_string(),
    }
}

#[test]
fn test_battery_row_does_nothing() {
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    peripheral.update_snapshot(|s| s.battery_level = 57);

    assert_eq!(
        select(&peripheral, Setting::BatteryLevel),
        SettingsSelectedRowAction::Nothing
    );
}

#[test]
fn test_missing_firmware_does_nothing() {
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    assert_eq!(
        select(&peripheral, Setting::Firmware),
        SettingsSelectedRowAction::Nothing
    );
}

#[test]
fn test_missing_hardware_does_nothing() {
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    peripheral.update_snapshot(|s| s.firmware = Some("1.2.3".to_string()));

    assert_eq!(
        select(&peripheral, Setting::Hardware),
        SettingsSelectedRowAction::Nothing
    );
}

#[test]
fn test_missing_serial_number_does_nothing() {
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    peripheral.update_snapshot(|s| s.hardware = Some("0x0A".to_string()));

    assert_eq!(
        select(&peripheral, Setting::SensorSerialNumber),
        SettingsSelectedRowAction::Nothing
    );
}

#[test]
fn test_present_values_show_info_popup() {
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    peripheral.update_snapshot(|s| {
        s.firmware = Some("1.2.3".to_string());
        s.hardware = Some("0x0A".to_string());
        s.sensor_serial_number = Some("0M00009DHCR".to_string());
    });

    assert_eq!(select(&peripheral, Setting::Firmware), info("Firmware : 1.2.3"));
    assert_eq!(select(&peripheral, Setting::Hardware), info("Hardware : 0x0A"));
    assert_eq!(
        select(&peripheral, Setting::SensorSerialNumber),
        info("Sensor Serial Number : 0M00009DHCR")
    );
}

#[test]
#[should_panic(expected = "unexpected setting row")]
fn test_unknown_row_panics() {
    let view_model = MiaoMiaoBluetoothPeripheralViewModel::new();
    let manager = BluetoothPeripheralManager::new();
    let peripheral = MiaoMiao::new("C4:7C:8D:6A:12:F0", "miaomiao2");
    view_model.user_did_select_row(9, 0, &peripheral, &*manager);
}

#[test]
#[should_panic(expected = "not a MiaoMiao")]
fn test_selecting_row_of_other_peripheral_panics() {
    let view_model = MiaoMiaoBluetoothPeripheralViewModel::new();
    let manager = BluetoothPeripheralManager::new();
    view_model.user_did_select_row(Setting::Firmware.row(), 0, &M5Stack, &*manager);
}
