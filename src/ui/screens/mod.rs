//! Peripheral settings screens.
//!
//! A settings screen host shows a few general sections common to every
//! peripheral, followed by sections owned by a type-specific view model.

pub mod miaomiao;

pub use miaomiao::{MiaoMiaoBluetoothPeripheralViewModel, Setting};

use crate::peripherals::manager::BluetoothPeripheralManaging;
use crate::peripherals::types::BluetoothPeripheral;
use crate::ui::table::{SettingsCell, SettingsSelectedRowAction, SettingsTable};
use std::rc::Rc;

/// The screen hosting a peripheral settings table.
pub trait PeripheralSettingsHost {
    /// Number of general sections shown before the view model's own sections.
    ///
    /// May change while the screen is showing.
    fn number_of_general_sections(&self) -> usize;
}

/// Type-specific part of a peripheral settings screen.
///
/// Section numbers passed to these methods are local to the view model.
pub trait BluetoothPeripheralViewModel {
    /// Bind the view model to the screen and, when possible, subscribe it to
    /// the peripheral's transmitter.
    fn configure(
        &self,
        peripheral: Option<Rc<dyn BluetoothPeripheral>>,
        manager: &Rc<dyn BluetoothPeripheralManaging>,
        table: &Rc<dyn SettingsTable>,
        host: &Rc<dyn PeripheralSettingsHost>,
    );

    fn screen_title(&self) -> String;

    fn section_title(&self, section: usize) -> String;

    fn number_of_sections(&self) -> usize;

    fn number_of_settings(&self, section: usize) -> usize;

    /// Fill `cell` for `row` of `section`.
    fn update(
        &self,
        cell: &mut SettingsCell,
        row: usize,
        section: usize,
        peripheral: &dyn BluetoothPeripheral,
    );

    fn user_did_select_row(
        &self,
        row: usize,
        section: usize,
        peripheral: &dyn BluetoothPeripheral,
        manager: &dyn BluetoothPeripheralManaging,
    ) -> SettingsSelectedRowAction;

    /// Whether readings from this peripheral can use web OOP calibration.
    fn can_web_oop(&self) -> bool;
}
