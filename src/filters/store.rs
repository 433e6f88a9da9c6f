use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::criteria::{FilterCriteria, FilterError, FilterKey};
use super::cursor::{PageCursor, PageRequest, DEFAULT_PER_PAGE};
use super::subscription::FilterSubscription;
use crate::config::ListConfig;
use crate::storage::{KeyValueStore, StorageError, FILTERS_KEY};

/// Default quiet period before a filter edit is acted upon.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Criteria and cursor captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub criteria: FilterCriteria,
    pub cursor: PageCursor,
}

impl FilterSnapshot {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.cursor, self.criteria.clone())
    }
}

/// Owner of the current filter criteria and pagination cursor.
///
/// Cheap to clone; clones share state. The current criteria live in a
/// `watch` channel, which doubles as the single-slot mailbox read by
/// [`FilterSubscription`].
#[derive(Clone)]
pub struct FilterStateStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn KeyValueStore>,
    criteria: watch::Sender<FilterCriteria>,
    cursor: Mutex<PageCursor>,
    debounce: Duration,
}

impl FilterStateStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_settings(storage, DEFAULT_PER_PAGE, DEFAULT_DEBOUNCE)
    }

    pub fn from_config(storage: Arc<dyn KeyValueStore>, config: &ListConfig) -> Self {
        Self::with_settings(
            storage,
            config.per_page,
            Duration::from_millis(config.debounce_ms),
        )
    }

    pub fn with_settings(
        storage: Arc<dyn KeyValueStore>,
        per_page: u32,
        debounce: Duration,
    ) -> Self {
        let (criteria, _) = watch::channel(FilterCriteria::default());
        Self {
            inner: Arc::new(Inner {
                storage,
                criteria,
                cursor: Mutex::new(PageCursor::first(per_page)),
                debounce,
            }),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Update one criterion from its string form.
    ///
    /// Subscribers are woken only when the criteria actually change. The
    /// page is reset and the criteria persisted once the change settles,
    /// not here.
    pub fn set_filter(&self, key: FilterKey, value: &str) -> Result<(), FilterError> {
        let mut result = Ok(());
        let changed = self.inner.criteria.send_if_modified(|current| {
            let mut next = current.clone();
            if let Err(e) = next.set(key, value) {
                result = Err(e);
                return false;
            }
            if next == *current {
                return false;
            }
            *current = next;
            true
        });
        result?;

        if changed {
            debug!(filter = key.as_str(), value = %value, "Filter updated");
        }
        Ok(())
    }

    /// Replace all criteria at once, waking subscribers if they differ.
    pub fn set_criteria(&self, criteria: FilterCriteria) {
        self.inner.criteria.send_if_modified(|current| {
            if *current == criteria {
                return false;
            }
            *current = criteria;
            true
        });
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.inner.criteria.borrow().clone()
    }

    pub fn cursor(&self) -> PageCursor {
        *self.inner.cursor.lock()
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            criteria: self.criteria(),
            cursor: self.cursor(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        self.snapshot().page_request()
    }

    pub fn set_page(&self, page: u32, per_page: u32) {
        *self.inner.cursor.lock() = PageCursor::new(page, per_page);
    }

    pub fn reset_page(&self) {
        self.inner.cursor.lock().reset();
    }

    /// Load persisted criteria, replacing the current ones.
    ///
    /// A missing, unreadable or malformed record yields empty criteria.
    /// Subscribers are only woken when the criteria actually change.
    pub fn restore(&self) -> FilterCriteria {
        let criteria = match self.inner.storage.get(FILTERS_KEY) {
            Ok(Some(json)) => FilterCriteria::from_json(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring saved filters");
                FilterCriteria::default()
            }),
            Ok(None) => FilterCriteria::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read saved filters");
                FilterCriteria::default()
            }
        };

        self.inner.criteria.send_if_modified(|current| {
            if *current == criteria {
                return false;
            }
            *current = criteria.clone();
            true
        });
        criteria
    }

    /// Empty the criteria and drop the persisted copy.
    pub fn clear(&self) {
        self.inner.criteria.send_if_modified(|current| {
            if current.is_empty() {
                return false;
            }
            *current = FilterCriteria::default();
            true
        });
        if let Err(e) = self.inner.storage.remove(FILTERS_KEY) {
            warn!(error = %e, "Failed to remove saved filters");
        }
    }

    /// Write the current criteria to durable storage.
    ///
    /// Empty criteria remove the key instead of storing an empty record.
    pub fn persist(&self) -> Result<(), StorageError> {
        let criteria = self.criteria();
        if criteria.is_empty() {
            self.inner.storage.remove(FILTERS_KEY)
        } else {
            self.inner.storage.set(FILTERS_KEY, &criteria.to_json())
        }
    }

    /// Start a debounced, deduplicated stream of settled criteria.
    ///
    /// Must be called within a tokio runtime. The background task stops when
    /// the returned subscription is dropped.
    pub fn subscribe(&self) -> FilterSubscription {
        FilterSubscription::spawn(self.clone(), self.inner.criteria.subscribe())
    }

    /// Applied by the subscription when a change settles.
    pub(super) fn settle(&self) {
        self.reset_page();
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to save filters");
        }
    }
}

impl std::fmt::Debug for FilterStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStateStore")
            .field("criteria", &self.criteria())
            .field("cursor", &self.cursor())
            .field("debounce", &self.inner.debounce)
            .finish()
    }
}
