use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{self, ApiError, Device, DeviceApi, DeviceId, Page};
use crate::filters::{FilterCriteria, FilterStateStore, PageRequest};
use crate::ui::device_list::intent::DeviceListIntent;
use crate::ui::device_list::reducer::DeviceListReducer;
use crate::ui::device_list::state::DeviceListState;
use crate::ui::mvi::Reducer;
use crate::ui::notify::{Confirm, Notifier};

/// Shown before a device is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this device?";

/// A list request that has been issued but not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub request_id: u64,
    pub request: PageRequest,
}

/// Runs the effects behind the device list and feeds their outcomes to
/// [`DeviceListReducer`].
///
/// The filter store is passed in rather than looked up, so several lists
/// can coexist with independent filters. Every state change, including entry
/// to `Loading`, is published to [`Self::watch_state`] receivers.
pub struct DeviceListPresenter<A: DeviceApi> {
    api: Arc<A>,
    filters: FilterStateStore,
    notifier: Arc<dyn Notifier>,
    state: DeviceListState,
    states: watch::Sender<DeviceListState>,
    next_request_id: u64,
}

impl<A: DeviceApi> DeviceListPresenter<A> {
    pub fn new(api: Arc<A>, filters: FilterStateStore, notifier: Arc<dyn Notifier>) -> Self {
        let (states, _) = watch::channel(DeviceListState::default());
        Self {
            api,
            filters,
            notifier,
            state: DeviceListState::default(),
            states,
            next_request_id: 0,
        }
    }

    pub fn state(&self) -> &DeviceListState {
        &self.state
    }

    pub fn filters(&self) -> &FilterStateStore {
        &self.filters
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Receiver that sees each new state as soon as it is reduced.
    pub fn watch_state(&self) -> watch::Receiver<DeviceListState> {
        self.states.subscribe()
    }

    fn dispatch(&mut self, intent: DeviceListIntent) {
        let state = std::mem::take(&mut self.state);
        self.state = DeviceListReducer::reduce(state, intent);

        let next = &self.state;
        self.states.send_if_modified(|current| {
            if current == next {
                return false;
            }
            *current = next.clone();
            true
        });
    }

    /// Enter `Loading` and hand back the request to send.
    pub fn begin_load(&mut self) -> PendingLoad {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let request = self.filters.page_request();

        debug!(
            request_id,
            page = request.cursor.page(),
            per_page = request.cursor.per_page(),
            "Loading devices"
        );
        self.dispatch(DeviceListIntent::LoadStarted { request_id });
        PendingLoad {
            request_id,
            request,
        }
    }

    /// Apply the outcome of a request started with [`Self::begin_load`].
    /// Outcomes of superseded requests are discarded.
    pub fn complete_load(&mut self, request_id: u64, result: api::Result<Page<Device>>) {
        let current = request_id == self.state.latest_request;
        match result {
            Ok(page) => {
                if !current {
                    debug!(request_id, "Discarding stale device page");
                }
                self.dispatch(DeviceListIntent::LoadSucceeded { request_id, page });
            }
            Err(err) => {
                if current {
                    warn!(
                        request_id,
                        error_type = err.error_type(),
                        error = %err,
                        "Device list load failed"
                    );
                    self.notifier
                        .error(&format!("Failed to load devices: {}", err));
                } else {
                    debug!(request_id, "Discarding stale load failure");
                }
                self.dispatch(DeviceListIntent::LoadFailed {
                    request_id,
                    message: err.to_string(),
                });
            }
        }
    }

    /// Fetch the page described by the current filters and cursor.
    pub async fn load(&mut self) {
        let pending = self.begin_load();
        let result = self.api.list(&pending.request).await;
        self.complete_load(pending.request_id, result);
    }

    /// Paginator moved. `page_index` is zero-based.
    pub async fn on_page_change(&mut self, page_index: u32, page_size: u32) {
        self.filters.set_page(page_index.saturating_add(1), page_size);
        self.load().await;
    }

    /// Filters settled on new criteria: back to the first page.
    pub async fn on_filters_changed(&mut self, criteria: FilterCriteria) {
        info!(filters = ?criteria, "Reloading devices for new filters");
        self.filters.reset_page();
        self.load().await;
    }

    /// Flip a device's usage flag and patch its row without a reload.
    pub async fn toggle_in_use(&mut self, id: DeviceId) -> Result<Device, ApiError> {
        match self.api.toggle_in_use(id).await {
            Ok(device) => {
                self.notifier
                    .success(&format!("Device marked as {}", device.status_label()));
                self.dispatch(DeviceListIntent::DeviceUpdated {
                    device: device.clone(),
                });
                Ok(device)
            }
            Err(err) => {
                self.notifier
                    .error(&format!("Failed to change device status: {}", err));
                Err(err)
            }
        }
    }

    /// Delete a device after confirmation, then reload the current page.
    ///
    /// Returns `Ok(false)` when the user declines; nothing is sent then.
    pub async fn remove(&mut self, id: DeviceId, confirm: &dyn Confirm) -> Result<bool, ApiError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id, "Delete cancelled");
            return Ok(false);
        }

        match self.api.remove(id).await {
            Ok(()) => {
                self.notifier.success("Device deleted");
                self.load().await;
                Ok(true)
            }
            Err(err) => {
                self.notifier
                    .error(&format!("Failed to delete device: {}", err));
                Err(err)
            }
        }
    }
}
