use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::api::{DeviceApi, DeviceId};
use crate::ui::device_list::presenter::DeviceListPresenter;
use crate::ui::device_list::state::DeviceListState;
use crate::ui::notify::Confirm;

/// User actions on the device list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Refresh,
    /// `page_index` is zero-based.
    ChangePage { page_index: u32, page_size: u32 },
    ToggleInUse(DeviceId),
    Remove(DeviceId),
}

/// Event loop of the device list screen.
///
/// Single task: filter emissions and commands are handled one at a time.
/// States, including `Loading` while a request is in flight, reach the
/// receiver returned by [`Self::new`].
pub struct DeviceListView<A: DeviceApi> {
    presenter: DeviceListPresenter<A>,
    confirm: Box<dyn Confirm>,
}

impl<A: DeviceApi> DeviceListView<A> {
    pub fn new(
        presenter: DeviceListPresenter<A>,
        confirm: impl Confirm + 'static,
    ) -> (Self, watch::Receiver<DeviceListState>) {
        let rx = presenter.watch_state();
        let view = Self {
            presenter,
            confirm: Box::new(confirm),
        };
        (view, rx)
    }

    /// Restore saved filters, load the first page, then react to filter
    /// changes and commands until `commands` closes.
    ///
    /// The filter subscription lives exactly as long as this call.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ListCommand>,
    ) -> DeviceListPresenter<A> {
        self.presenter.filters().restore();
        let mut subscription = self.presenter.filters().subscribe();

        self.presenter.load().await;

        loop {
            tokio::select! {
                Some(criteria) = subscription.next() => {
                    self.presenter.on_filters_changed(criteria).await;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }

        debug!("Device list view closed");
        drop(subscription);
        self.presenter
    }

    async fn handle(&mut self, command: ListCommand) {
        match command {
            ListCommand::Refresh => self.presenter.load().await,
            ListCommand::ChangePage {
                page_index,
                page_size,
            } => self.presenter.on_page_change(page_index, page_size).await,
            ListCommand::ToggleInUse(id) => {
                let _ = self.presenter.toggle_in_use(id).await;
            }
            ListCommand::Remove(id) => {
                let _ = self.presenter.remove(id, self.confirm.as_ref()).await;
            }
        }
    }
}
