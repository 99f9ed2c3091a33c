//! Settings table primitives shared by every peripheral settings screen.
//!
//! The table itself (layout, rendering) belongs to the host. View models only
//! fill in cells, compute index paths and ask for rows to be redrawn.

/// Position of a row in the settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl std::fmt::Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Animation used when redrawing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowAnimation {
    /// Redraw in place
    #[default]
    None,
}

/// Standard decoration at the trailing edge of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessoryType {
    #[default]
    None,
    /// Chevron telling the user that tapping shows more
    DisclosureIndicator,
    Checkmark,
}

/// Custom control shown instead of the standard accessory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessoryView {
    Switch { on: bool },
}

/// Content of one settings row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsCell {
    /// Primary label (setting name)
    pub text: Option<String>,
    /// Secondary label (setting value)
    pub detail_text: Option<String>,
    pub accessory_type: AccessoryType,
    pub accessory_view: Option<AccessoryView>,
}

impl SettingsCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Secondary label as displayed, empty when unset.
    pub fn detail_display(&self) -> &str {
        self.detail_text.as_deref().unwrap_or("")
    }
}

/// What the host should do after the user tapped a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SettingsSelectedRowAction {
    /// Nothing to do
    #[default]
    Nothing,
    /// Show a pop-up with an informational text
    ShowInfoText { title: String, message: String },
}

/// Table owned by the settings screen host.
pub trait SettingsTable {
    /// Redraw the given rows only.
    fn reload_rows(&self, index_paths: &[IndexPath], animation: RowAnimation);
}
