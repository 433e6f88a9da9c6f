//! Filter criteria and their string/record forms.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while parsing filter values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Unknown filter '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for filter '{key}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Malformed filter record: {0}")]
    Malformed(String),
}

/// Identifier of a single filter field.
///
/// The `as_str()` value is both the query parameter name and the key in the
/// persisted record; do not rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Location,
    InUse,
    DateFrom,
    DateTo,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::InUse => "in_use",
            Self::DateFrom => "date_from",
            Self::DateTo => "date_to",
        }
    }

    /// All keys, in query order.
    pub fn all() -> &'static [FilterKey] {
        &[Self::Location, Self::InUse, Self::DateFrom, Self::DateTo]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "location" => Some(Self::Location),
            "in_use" => Some(Self::InUse),
            "date_from" => Some(Self::DateFrom),
            "date_to" => Some(Self::DateTo),
            _ => None,
        }
    }
}

impl std::str::FromStr for FilterKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FilterError::UnknownKey(s.to_string()))
    }
}

/// User-chosen constraints narrowing the device list.
///
/// `None` means unset. Unset fields never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub location: Option<String>,
    pub in_use: Option<bool>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = normalize_text(&location.into());
        self
    }

    pub fn with_in_use(mut self, in_use: bool) -> Self {
        self.in_use = Some(in_use);
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.in_use.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// Set `key` from its string form. An empty (or blank) string unsets it.
    pub fn set(&mut self, key: FilterKey, raw: &str) -> Result<(), FilterError> {
        let raw = raw.trim();
        match key {
            FilterKey::Location => self.location = normalize_text(raw),
            FilterKey::InUse => self.in_use = parse_flag(key, raw)?,
            FilterKey::DateFrom => self.date_from = parse_date(key, raw)?,
            FilterKey::DateTo => self.date_to = parse_date(key, raw)?,
        }
        Ok(())
    }

    pub fn unset(&mut self, key: FilterKey) {
        match key {
            FilterKey::Location => self.location = None,
            FilterKey::InUse => self.in_use = None,
            FilterKey::DateFrom => self.date_from = None,
            FilterKey::DateTo => self.date_to = None,
        }
    }

    /// String form of `key`, or `None` when unset.
    pub fn get(&self, key: FilterKey) -> Option<String> {
        match key {
            FilterKey::Location => self.location.clone(),
            FilterKey::InUse => self.in_use.map(|v| v.to_string()),
            FilterKey::DateFrom => self.date_from.map(format_date),
            FilterKey::DateTo => self.date_to.map(format_date),
        }
    }

    /// Query parameters for the set fields only.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        FilterKey::all()
            .iter()
            .filter_map(|key| self.get(*key).map(|value| (key.as_str(), value)))
            .collect()
    }

    /// Flat record for durable storage. Unset fields are written as `""`.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        for key in FilterKey::all() {
            let value = match key {
                FilterKey::InUse => self.in_use.map(Value::Bool),
                _ => self.get(*key).map(Value::String),
            };
            record.insert(
                key.as_str().to_string(),
                value.unwrap_or_else(|| Value::String(String::new())),
            );
        }
        record
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.to_record()).to_string()
    }

    /// Parse a persisted record.
    ///
    /// Empty strings and nulls are unset; unknown keys are ignored. Any
    /// value of the wrong shape makes the whole record malformed.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| FilterError::Malformed(e.to_string()))?;
        let Value::Object(record) = value else {
            return Err(FilterError::Malformed("expected a JSON object".to_string()));
        };
        Self::from_record(&record)
    }

    pub fn from_record(record: &Map<String, Value>) -> Result<Self, FilterError> {
        let mut criteria = Self::default();
        for key in FilterKey::all() {
            let Some(value) = record.get(key.as_str()) else {
                continue;
            };
            let raw = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) if *key == FilterKey::InUse => b.to_string(),
                Value::Number(n) if *key == FilterKey::InUse => n.to_string(),
                other => {
                    return Err(FilterError::Malformed(format!(
                        "unexpected value {} for '{}'",
                        other,
                        key.as_str()
                    )))
                }
            };
            criteria
                .set(*key, &raw)
                .map_err(|e| FilterError::Malformed(e.to_string()))?;
        }
        Ok(criteria)
    }
}

fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_flag(key: FilterKey, raw: &str) -> Result<Option<bool>, FilterError> {
    match raw.to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(FilterError::InvalidValue {
            key: key.as_str(),
            value: raw.to_string(),
            reason: "expected true or false",
        }),
    }
}

/// Accepts `YYYY-MM-DD` or a full timestamp whose date part is used.
fn parse_date(key: FilterKey, raw: &str) -> Result<Option<NaiveDate>, FilterError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map(Some)
        .map_err(|_| FilterError::InvalidValue {
            key: key.as_str(),
            value: raw.to_string(),
            reason: "expected a date as YYYY-MM-DD",
        })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
