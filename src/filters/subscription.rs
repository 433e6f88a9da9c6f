//! Debounced, deduplicated filter change stream.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use super::criteria::FilterCriteria;
use super::store::FilterStateStore;

/// Receiving end of [`FilterStateStore::subscribe`].
///
/// Yields criteria once a burst of edits has been quiet for the store's
/// debounce delay and the settled value differs from the previous emission.
/// Dropping it stops the background task.
pub struct FilterSubscription {
    rx: mpsc::Receiver<FilterCriteria>,
    task: JoinHandle<()>,
}

impl FilterSubscription {
    pub(super) fn spawn(
        store: FilterStateStore,
        mut changes: watch::Receiver<FilterCriteria>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Baseline is taken now so edits made before the task first runs
        // still count as changes.
        let baseline = changes.borrow_and_update().clone();
        let task = tokio::spawn(debounce_loop(store, changes, baseline, tx));
        Self { rx, task }
    }

    /// Wait for the next settled change. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<FilterCriteria> {
        self.rx.recv().await
    }

    /// Take a settled change if one is already waiting.
    pub fn try_next(&mut self) -> Option<FilterCriteria> {
        self.rx.try_recv().ok()
    }
}

impl Drop for FilterSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits for a change, then keeps pushing the deadline back while further
/// changes arrive. When the deadline passes unchallenged the latest value is
/// compared against the last emission and, if different, settled and sent.
async fn debounce_loop(
    store: FilterStateStore,
    mut changes: watch::Receiver<FilterCriteria>,
    mut last_emitted: FilterCriteria,
    tx: mpsc::Sender<FilterCriteria>,
) {
    let debounce = store.debounce();

    loop {
        if changes.changed().await.is_err() {
            break;
        }

        let mut deadline = Instant::now() + debounce;
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    deadline = Instant::now() + debounce;
                }
                _ = sleep_until(deadline) => break,
            }
        }

        let latest = changes.borrow_and_update().clone();
        if latest == last_emitted {
            debug!("Filter edits settled on the previous criteria");
            continue;
        }

        store.settle();
        info!(criteria = ?latest, "Filter change settled");
        last_emitted = latest.clone();

        if tx.send(latest).await.is_err() {
            break;
        }
    }
}
