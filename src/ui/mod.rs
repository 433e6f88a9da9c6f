pub mod device_list;
pub mod mvi;
pub mod notify;
