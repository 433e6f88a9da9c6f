mod intent;
mod presenter;
mod reducer;
mod state;
mod view;

pub use intent::DeviceListIntent;
pub use presenter::{DeviceListPresenter, PendingLoad, DELETE_PROMPT};
pub use reducer::DeviceListReducer;
pub use state::{DeviceListState, LoadPhase};
pub use view::{DeviceListView, ListCommand};
