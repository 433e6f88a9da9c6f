use crate::api::{Device, DeviceId};
use crate::ui::mvi::UiState;

/// Where the list is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Last load failed; the previous page is still shown.
    Failed,
}

/// Everything the device list screen renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceListState {
    pub phase: LoadPhase,
    /// Visible page, in server order.
    pub devices: Vec<Device>,
    pub total: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub loading: bool,
    /// Message of the most recent failed load.
    pub error: Option<String>,
    /// Id of the newest load started; responses to older ones are dropped.
    pub latest_request: u64,
}

impl UiState for DeviceListState {}

impl DeviceListState {
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
