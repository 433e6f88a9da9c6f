//! Typed access to the device backend.
//!
//! - [`ApiClient`]: connection pool, base URL and bearer token
//! - [`DeviceClient`]: the [`DeviceApi`] operations over the device collection
//! - [`SessionStore`]: durable token and user record

mod auth;
mod client;
mod credentials;
mod devices;
mod error;
mod types;

pub use auth::{AuthSession, SessionStore};
pub use client::ApiClient;
pub use credentials::{bearer_header, AuthHeader, SecureString};
pub use devices::{DeviceApi, DeviceClient};
pub use error::{ApiError, Result};
pub use types::{
    AuthPayload, Device, DeviceId, DevicePayload, Envelope, Page, Paginated, User,
    MIN_PASSWORD_LEN, MIN_TEXT_LEN,
};
