use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use super::client::ApiClient;
use super::error::Result;
use super::types::{Device, DeviceId, DevicePayload, Page, Paginated};
use crate::filters::PageRequest;

/// Operations on the device collection.
///
/// Every call resolves to exactly one success value or error; errors are
/// passed through untouched.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Fetch one page. Only set filter fields are sent.
    async fn list(&self, request: &PageRequest) -> Result<Page<Device>>;

    async fn get(&self, id: DeviceId) -> Result<Device>;

    async fn create(&self, payload: &DevicePayload) -> Result<Device>;

    async fn update(&self, id: DeviceId, payload: &DevicePayload) -> Result<Device>;

    /// Soft-delete a device. Callers confirm intent before calling.
    async fn remove(&self, id: DeviceId) -> Result<()>;

    /// Flip `in_use` server-side without sending the full payload.
    async fn toggle_in_use(&self, id: DeviceId) -> Result<Device>;
}

/// HTTP implementation of [`DeviceApi`] over one collection path.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    api: ApiClient,
    collection: String,
}

impl DeviceClient {
    pub fn new(api: ApiClient, collection: impl Into<String>) -> Self {
        let collection = collection.into().trim_matches('/').to_string();
        Self { api, collection }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn item_path(&self, id: DeviceId) -> String {
        format!("{}/{}", self.collection, id)
    }
}

fn resource(id: DeviceId) -> String {
    format!("Device {}", id)
}

#[async_trait]
impl DeviceApi for DeviceClient {
    async fn list(&self, request: &PageRequest) -> Result<Page<Device>> {
        let mut url = self.api.url(&self.collection)?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        let builder = self.api.request(Method::GET, url);
        let paginated: Paginated<Device> = self.api.send(builder, "Devices").await?;
        let page = Page::try_from(paginated)?;

        debug!(
            page = page.current_page,
            items = page.items.len(),
            total = page.total,
            "Fetched device page"
        );
        Ok(page)
    }

    async fn get(&self, id: DeviceId) -> Result<Device> {
        let url = self.api.url(&self.item_path(id))?;
        let builder = self.api.request(Method::GET, url);
        self.api.send(builder, &resource(id)).await
    }

    async fn create(&self, payload: &DevicePayload) -> Result<Device> {
        payload.validate()?;
        let url = self.api.url(&self.collection)?;
        let builder = self.api.request(Method::POST, url).json(payload);
        let device: Device = self.api.send(builder, "Devices").await?;
        info!(id = device.id, name = %device.name, "Device created");
        Ok(device)
    }

    async fn update(&self, id: DeviceId, payload: &DevicePayload) -> Result<Device> {
        payload.validate()?;
        let url = self.api.url(&self.item_path(id))?;
        let builder = self.api.request(Method::PUT, url).json(payload);
        let device: Device = self.api.send(builder, &resource(id)).await?;
        info!(id = device.id, "Device updated");
        Ok(device)
    }

    async fn remove(&self, id: DeviceId) -> Result<()> {
        let url = self.api.url(&self.item_path(id))?;
        let builder = self.api.request(Method::DELETE, url);
        self.api.send_empty(builder, &resource(id)).await?;
        info!(id, "Device removed");
        Ok(())
    }

    async fn toggle_in_use(&self, id: DeviceId) -> Result<Device> {
        let url = self.api.url(&format!("{}/use", self.item_path(id)))?;
        let builder = self
            .api
            .request(Method::PATCH, url)
            .json(&serde_json::json!({}));
        let device: Device = self.api.send(builder, &resource(id)).await?;
        info!(id, in_use = device.in_use, "Device usage toggled");
        Ok(device)
    }
}
