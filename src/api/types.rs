//! Wire types for the device backend.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ApiError;

/// Server-assigned device identifier.
pub type DeviceId = u64;

/// Minimum length of `name` and `location` after trimming.
pub const MIN_TEXT_LEN: usize = 2;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A device as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub location: String,
    #[serde(deserialize_with = "date_or_timestamp")]
    pub purchase_date: NaiveDate,
    /// Sent as `0`/`1` by some backends.
    #[serde(deserialize_with = "bool_or_int")]
    pub in_use: bool,
    /// Owner of the device.
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Device {
    pub fn status_label(&self) -> &'static str {
        if self.in_use {
            "in use"
        } else {
            "available"
        }
    }
}

/// Body of create and update requests. Ids and timestamps are server-owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePayload {
    pub name: String,
    pub location: String,
    #[serde(with = "iso_date")]
    pub purchase_date: NaiveDate,
    pub in_use: bool,
}

impl DevicePayload {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        purchase_date: NaiveDate,
        in_use: bool,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            purchase_date,
            in_use,
        }
    }

    /// Payload that would recreate `device` as-is, for editing.
    pub fn from_device(device: &Device) -> Self {
        Self::new(
            device.name.clone(),
            device.location.clone(),
            device.purchase_date,
            device.in_use,
        )
    }

    /// Checks the same rules as the backend form: `name` and `location`
    /// need at least two characters.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = BTreeMap::new();
        for (field, value) in [("name", &self.name), ("location", &self.location)] {
            if value.trim().chars().count() < MIN_TEXT_LEN {
                fields.insert(
                    field.to_string(),
                    vec![format!(
                        "The {} must be at least {} characters.",
                        field, MIN_TEXT_LEN
                    )],
                );
            }
        }

        if fields.is_empty() {
            return Ok(());
        }

        let message = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        Err(ApiError::Validation { message, fields })
    }
}

/// Standard response wrapper: `{success, message, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Absent on most rejections.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap `data`, turning `success: false` into [`ApiError::Rejected`].
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message,
            });
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
    }
}

/// Paginated `data` payload of the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
}

/// One page of results in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> TryFrom<Paginated<T>> for Page<T> {
    type Error = ApiError;

    fn try_from(p: Paginated<T>) -> Result<Self, Self::Error> {
        if p.data.len() > p.per_page as usize {
            return Err(ApiError::Decode(format!(
                "page holds {} items but per_page is {}",
                p.data.len(),
                p.per_page
            )));
        }
        Ok(Self {
            items: p.data,
            total: p.total,
            per_page: p.per_page,
            current_page: p.current_page,
            last_page: p.last_page,
        })
    }
}

/// Authenticated user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// `data` of the login and register responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

impl RegisterRequest<'_> {
    /// Password rules of the registration form.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = BTreeMap::new();
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            fields.insert(
                "password".to_string(),
                vec![format!(
                    "The password must be at least {} characters.",
                    MIN_PASSWORD_LEN
                )],
            );
        }
        if self.password != self.password_confirmation {
            fields.insert(
                "password_confirmation".to_string(),
                vec!["The password confirmation does not match.".to_string()],
            );
        }

        if fields.is_empty() {
            return Ok(());
        }
        let message = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        Err(ApiError::Validation { message, fields })
    }
}

fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// Accepts `2023-01-01` as well as `2023-01-01T00:00:00.000000Z`.
fn date_or_timestamp<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.split('T').next().unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(serde::de::Error::custom)
    }
}
