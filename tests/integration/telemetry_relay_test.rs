//! Telemetry relay: manager first, then exactly one row refresh.

use super::mock_host::{
    miaomiao_transmitter, real_manager, Call, CallLog, RecordingManager, RecordingScreen, ADDRESS,
};
use cgm_peripherals::peripherals::{
    BluetoothPeripheral, BluetoothPeripheralManaging, CgmMiaoMiaoTransmitter, MiaoMiao,
    MiaoMiaoTelemetry, PeripheralEvent, SubscriptionState,
};
use cgm_peripherals::ui::screens::miaomiao::Setting;
use cgm_peripherals::ui::{
    BluetoothPeripheralViewModel, IndexPath, PeripheralSettingsHost, RowAnimation, SettingsCell,
    SettingsTable,
};
use cgm_peripherals::MiaoMiaoBluetoothPeripheralViewModel;
use std::cell::RefCell;
use std::rc::Rc;

struct Presented {
    log: CallLog,
    manager: Rc<RecordingManager>,
    screen: Rc<RecordingScreen>,
    view_model: Rc<MiaoMiaoBluetoothPeripheralViewModel>,
}

fn present(general_sections: usize, accepts_telemetry: bool) -> Presented {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let manager = RecordingManager::new(&log, accepts_telemetry);
    let screen = RecordingScreen::new(&log, general_sections);
    let peripheral: Rc<dyn BluetoothPeripheral> = Rc::new(MiaoMiao::new(ADDRESS, "miaomiao2"));

    let view_model = MiaoMiaoBluetoothPeripheralViewModel::new();
    let manager_handle: Rc<dyn BluetoothPeripheralManaging> = manager.clone();
    let table: Rc<dyn SettingsTable> = screen.clone();
    let host: Rc<dyn PeripheralSettingsHost> = screen.clone();
    view_model.configure(Some(peripheral), &manager_handle, &table, &host);

    Presented {
        log,
        manager,
        screen,
        view_model,
    }
}

#[test]
fn test_serial_number_refreshes_one_row_after_general_sections() {
    for general_sections in 0..=2 {
        let presented = present(general_sections, true);

        presented
            .manager
            .transmitter
            .deliver(MiaoMiaoTelemetry::SerialNumber("0M00009DHCR".to_string()));

        assert_eq!(
            presented.screen.reloads(),
            vec![vec![IndexPath::new(general_sections, 3)]]
        );
    }
}

#[test]
fn test_manager_is_informed_before_refresh() {
    let presented = present(1, true);

    presented
        .manager
        .transmitter
        .deliver(MiaoMiaoTelemetry::Firmware("0x39".to_string()));

    assert_eq!(
        *presented.log.borrow(),
        vec![
            Call::ManagerFirmware("0x39".to_string()),
            Call::GeneralSectionsQueried,
            Call::ReloadRows(vec![IndexPath::new(1, 1)], RowAnimation::None),
        ]
    );
}

#[test]
fn test_each_kind_targets_its_own_row() {
    let presented = present(0, true);
    let transmitter = &presented.manager.transmitter;

    transmitter.deliver(MiaoMiaoTelemetry::BatteryLevel(57));
    transmitter.deliver(MiaoMiaoTelemetry::Firmware("0x39".to_string()));
    transmitter.deliver(MiaoMiaoTelemetry::Hardware("0x0A".to_string()));
    transmitter.deliver(MiaoMiaoTelemetry::SerialNumber("0M00009DHCR".to_string()));

    assert_eq!(
        presented.screen.reloads(),
        vec![
            vec![IndexPath::new(0, Setting::BatteryLevel.row())],
            vec![IndexPath::new(0, Setting::Firmware.row())],
            vec![IndexPath::new(0, Setting::Hardware.row())],
            vec![IndexPath::new(0, Setting::SensorSerialNumber.row())],
        ]
    );
    assert_eq!(
        presented.manager.manager_calls(),
        vec![
            Call::ManagerBatteryLevel(57),
            Call::ManagerFirmware("0x39".to_string()),
            Call::ManagerHardware("0x0A".to_string()),
            Call::ManagerSerialNumber("0M00009DHCR".to_string()),
        ]
    );
}

#[test]
fn test_section_offset_is_queried_on_every_refresh() {
    let presented = present(1, true);
    let transmitter = &presented.manager.transmitter;

    transmitter.deliver(MiaoMiaoTelemetry::BatteryLevel(80));
    presented.screen.general_sections.set(3);
    transmitter.deliver(MiaoMiaoTelemetry::BatteryLevel(79));

    assert_eq!(
        presented.screen.reloads(),
        vec![vec![IndexPath::new(1, 0)], vec![IndexPath::new(3, 0)]]
    );
}

#[test]
fn test_refresh_skipped_once_screen_is_gone() {
    let Presented {
        log,
        manager,
        screen,
        view_model,
    } = present(1, true);
    drop(screen);

    manager
        .transmitter
        .deliver(MiaoMiaoTelemetry::Hardware("0x0A".to_string()));

    // The manager still hears about it, nothing is redrawn.
    assert_eq!(
        *log.borrow(),
        vec![Call::ManagerHardware("0x0A".to_string())]
    );
    drop(view_model);
}

#[test]
fn test_manager_without_capability_is_skipped() {
    let presented = present(0, false);

    presented
        .manager
        .transmitter
        .deliver(MiaoMiaoTelemetry::BatteryLevel(42));

    assert!(presented.manager.manager_calls().is_empty());
    assert_eq!(presented.screen.reloads(), vec![vec![IndexPath::new(0, 0)]]);
}

#[test]
fn test_manager_without_capability_leaves_transmitter_unsubscribed() {
    let presented = present(0, false);
    let transmitter = presented.manager.transmitter.clone();
    assert_eq!(
        transmitter.subscription_state(),
        SubscriptionState::SubscribedToViewModel
    );

    drop(presented.view_model);

    assert_eq!(transmitter.subscription_state(), SubscriptionState::Unsubscribed);
}

#[test]
fn test_relayed_value_is_shown_after_refresh() {
    let (manager, peripheral) = real_manager();
    let events = manager.event_receiver();
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let screen = RecordingScreen::new(&log, 1);

    let view_model = MiaoMiaoBluetoothPeripheralViewModel::new();
    let manager_handle: Rc<dyn BluetoothPeripheralManaging> = manager.clone();
    let table: Rc<dyn SettingsTable> = screen.clone();
    let host: Rc<dyn PeripheralSettingsHost> = screen.clone();
    view_model.configure(Some(peripheral.clone()), &manager_handle, &table, &host);

    let transmitter = miaomiao_transmitter(&*manager, peripheral.as_ref());
    let driver = transmitter
        .downcast_ref::<CgmMiaoMiaoTransmitter>()
        .unwrap();
    driver.deliver(MiaoMiaoTelemetry::BatteryLevel(57));

    // The real manager stored the value, so redrawing the row shows it.
    let mut cell = SettingsCell::new();
    view_model.update(&mut cell, Setting::BatteryLevel.row(), 0, peripheral.as_ref());
    assert_eq!(cell.detail_display(), "57 %");
    assert_eq!(screen.reloads(), vec![vec![IndexPath::new(1, 0)]]);

    let published: Vec<PeripheralEvent> = events.try_iter().collect();
    assert!(matches!(
        published.as_slice(),
        [PeripheralEvent::Telemetry {
            telemetry: MiaoMiaoTelemetry::BatteryLevel(57),
            ..
        }]
    ));
}
