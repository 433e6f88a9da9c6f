use crate::ui::device_list::intent::DeviceListIntent;
use crate::ui::device_list::state::{DeviceListState, LoadPhase};
use crate::ui::mvi::Reducer;

pub struct DeviceListReducer;

impl Reducer for DeviceListReducer {
    type State = DeviceListState;
    type Intent = DeviceListIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            DeviceListIntent::LoadStarted { request_id } => DeviceListState {
                phase: LoadPhase::Loading,
                loading: true,
                latest_request: request_id,
                ..state
            },
            DeviceListIntent::LoadSucceeded { request_id, page } => {
                if request_id != state.latest_request {
                    return state;
                }
                DeviceListState {
                    phase: LoadPhase::Loaded,
                    devices: page.items,
                    total: page.total,
                    current_page: page.current_page,
                    per_page: page.per_page,
                    last_page: page.last_page,
                    loading: false,
                    error: None,
                    latest_request: state.latest_request,
                }
            }
            DeviceListIntent::LoadFailed {
                request_id,
                message,
            } => {
                if request_id != state.latest_request {
                    return state;
                }
                // Keep the previous page visible.
                DeviceListState {
                    phase: LoadPhase::Failed,
                    loading: false,
                    error: Some(message),
                    ..state
                }
            }
            DeviceListIntent::DeviceUpdated { device } => {
                let mut state = state;
                if let Some(row) = state.devices.iter_mut().find(|d| d.id == device.id) {
                    *row = device;
                }
                state
            }
        }
    }
}
