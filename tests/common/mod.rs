//! Shared test utilities and fakes.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use device_inventory::api::{
    self, ApiClient, ApiError, Device, DeviceApi, DeviceClient, DeviceId, DevicePayload, Page,
};
use device_inventory::config::ApiConfig;
use device_inventory::filters::{FilterCriteria, PageRequest};
use device_inventory::ui::notify::Notifier;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

// -- Devices ------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A device purchased on 2024-03-01, owned by user 1.
pub fn device(id: DeviceId, name: &str, location: &str, in_use: bool) -> Device {
    let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    Device {
        id,
        name: name.to_string(),
        location: location.to_string(),
        purchase_date: date(2024, 3, 1),
        in_use,
        user_id: 1,
        created_at: stamp,
        updated_at: stamp,
        deleted_at: None,
    }
}

/// `count` devices with ids `1..=count`, alternating between two labs.
pub fn devices(count: u64) -> Vec<Device> {
    (1..=count)
        .map(|id| {
            let lab = if id % 2 == 1 { "Lab A" } else { "Lab B" };
            device(id, &format!("Device {}", id), lab, id % 3 == 0)
        })
        .collect()
}

/// Device as the backend serializes it.
pub fn device_json(device: &Device) -> Value {
    json!({
        "id": device.id,
        "name": device.name,
        "location": device.location,
        "purchase_date": device.purchase_date.format("%Y-%m-%d").to_string(),
        "in_use": if device.in_use { 1 } else { 0 },
        "user_id": device.user_id,
        "created_at": device.created_at.to_rfc3339(),
        "updated_at": device.updated_at.to_rfc3339(),
        "deleted_at": null,
    })
}

/// Paginated `data` payload holding `items`.
pub fn page_json(items: &[Device], total: u64, per_page: u32, current_page: u32) -> Value {
    let last_page = total.div_ceil(u64::from(per_page)).max(1);
    json!({
        "data": items.iter().map(device_json).collect::<Vec<_>>(),
        "total": total,
        "per_page": per_page,
        "current_page": current_page,
        "last_page": last_page,
        "from": if items.is_empty() { Value::Null } else { json!(1) },
        "to": if items.is_empty() { Value::Null } else { json!(items.len()) },
    })
}

// -- Clients ------------------------------------------------------------------

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
        ..ApiConfig::default()
    }
}

pub fn device_client(base_url: &str) -> DeviceClient {
    let api = ApiClient::new(&api_config(base_url)).expect("client");
    DeviceClient::new(api, "devices")
}

// -- Fake device API ----------------------------------------------------------

/// In-memory [`DeviceApi`] with soft delete and scripted failures.
#[derive(Default)]
pub struct FakeDeviceApi {
    devices: Mutex<Vec<Device>>,
    failures: Mutex<VecDeque<ApiError>>,
    calls: Mutex<Vec<String>>,
    list_requests: Mutex<Vec<PageRequest>>,
}

impl FakeDeviceApi {
    pub fn with_devices(devices: Vec<Device>) -> Arc<Self> {
        let fake = Self::default();
        *fake.devices.lock() = devices;
        Arc::new(fake)
    }

    /// The next call of any kind fails with `err`.
    pub fn fail_next(&self, err: ApiError) {
        self.failures.lock().push_back(err);
    }

    /// Operation log, e.g. `["list", "toggle 3", "remove 5"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn list_requests(&self) -> Vec<PageRequest> {
        self.list_requests.lock().clone()
    }

    pub fn list_count(&self) -> usize {
        self.list_requests.lock().len()
    }

    fn record(&self, call: String) -> api::Result<()> {
        self.calls.lock().push(call);
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn live(&self) -> Vec<Device> {
        self.devices
            .lock()
            .iter()
            .filter(|d| d.deleted_at.is_none())
            .cloned()
            .collect()
    }
}

fn matches(device: &Device, criteria: &FilterCriteria) -> bool {
    criteria
        .location
        .as_ref()
        .is_none_or(|l| &device.location == l)
        && criteria.in_use.is_none_or(|u| device.in_use == u)
        && criteria.date_from.is_none_or(|d| device.purchase_date >= d)
        && criteria.date_to.is_none_or(|d| device.purchase_date <= d)
}

fn not_found(id: DeviceId) -> ApiError {
    ApiError::NotFound {
        resource: format!("Device {}", id),
    }
}

#[async_trait]
impl DeviceApi for FakeDeviceApi {
    async fn list(&self, request: &PageRequest) -> api::Result<Page<Device>> {
        self.list_requests.lock().push(request.clone());
        self.record("list".to_string())?;

        let matching: Vec<Device> = self
            .live()
            .into_iter()
            .filter(|d| matches(d, &request.criteria))
            .collect();
        let per_page = request.cursor.per_page();
        let page = request.cursor.page();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();

        Ok(Page {
            items,
            total,
            per_page,
            current_page: page,
            last_page: total.div_ceil(u64::from(per_page)).max(1) as u32,
        })
    }

    async fn get(&self, id: DeviceId) -> api::Result<Device> {
        self.record(format!("get {}", id))?;
        self.live()
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, payload: &DevicePayload) -> api::Result<Device> {
        self.record("create".to_string())?;
        payload.validate()?;
        let mut devices = self.devices.lock();
        let id = devices.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let mut created = device(id, &payload.name, &payload.location, payload.in_use);
        created.purchase_date = payload.purchase_date;
        devices.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: DeviceId, payload: &DevicePayload) -> api::Result<Device> {
        self.record(format!("update {}", id))?;
        payload.validate()?;
        let mut devices = self.devices.lock();
        let existing = devices
            .iter_mut()
            .find(|d| d.id == id && d.deleted_at.is_none())
            .ok_or_else(|| not_found(id))?;
        existing.name = payload.name.clone();
        existing.location = payload.location.clone();
        existing.purchase_date = payload.purchase_date;
        existing.in_use = payload.in_use;
        Ok(existing.clone())
    }

    async fn remove(&self, id: DeviceId) -> api::Result<()> {
        self.record(format!("remove {}", id))?;
        let mut devices = self.devices.lock();
        let existing = devices
            .iter_mut()
            .find(|d| d.id == id && d.deleted_at.is_none())
            .ok_or_else(|| not_found(id))?;
        existing.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn toggle_in_use(&self, id: DeviceId) -> api::Result<Device> {
        self.record(format!("toggle {}", id))?;
        let mut devices = self.devices.lock();
        let existing = devices
            .iter_mut()
            .find(|d| d.id == id && d.deleted_at.is_none())
            .ok_or_else(|| not_found(id))?;
        existing.in_use = !existing.in_use;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }
}

// -- Notifications ------------------------------------------------------------

/// A notification as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error(m) => Some(m),
                Notice::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.lock().push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().push(Notice::Error(message.to_string()));
    }
}
