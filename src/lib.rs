//! Device inventory client.
//!
//! Lists, filters and edits devices held by a REST backend. The pieces,
//! leaves first:
//!
//! - [`storage`]: durable key-value state (filters, session)
//! - [`api`]: typed HTTP access to the device collection
//! - [`filters`]: filter criteria, pagination cursor and the debounced store
//! - [`ui`]: the device list presenter and its event loop

pub mod api;
pub mod config;
pub mod filters;
pub mod logging;
pub mod storage;
pub mod ui;
