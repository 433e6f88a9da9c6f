use crate::api::{Device, Page};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum DeviceListIntent {
    /// A list request was issued.
    LoadStarted { request_id: u64 },
    LoadSucceeded { request_id: u64, page: Page<Device> },
    LoadFailed { request_id: u64, message: String },
    /// Server returned a fresh copy of one device (e.g. after a toggle).
    DeviceUpdated { device: Device },
}

impl Intent for DeviceListIntent {}
