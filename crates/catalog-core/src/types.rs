//! Core data types for the TV catalog.
//!
//! A [`Tv`] is one catalog record owned by exactly one user. Records enter the
//! system as a [`TvDraft`] (the loosely-typed request body), are validated into
//! [`TvFields`], and are stamped with an id, owner, and version by the store.
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize`. The wire
//! format is camelCase (`isSmart`, `fabricationDate`, `ownerId`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::identity::OwnerId;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a TV record.
///
/// Assigned by the store on insert and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TvId(pub Uuid);

impl TvId {
    /// Creates a new random TvId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TvId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TvId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TvId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ============================================================================
// Records
// ============================================================================

/// A stored TV record.
///
/// `id` and `owner_id` are immutable once the record exists. `version` starts at 1
/// and grows by exactly one per successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tv {
    pub id: TvId,
    pub manufacturer: String,
    pub model: String,
    pub is_smart: bool,
    pub fabrication_date: DateTime<Utc>,
    pub price: f64,
    pub owner_id: OwnerId,
    pub version: u64,
}

impl Tv {
    /// Version assigned to every freshly inserted record.
    pub const INITIAL_VERSION: u64 = 1;

    /// Assemble a record from validated fields.
    #[must_use]
    pub fn from_fields(id: TvId, owner_id: OwnerId, fields: TvFields, version: u64) -> Self {
        Self {
            id,
            manufacturer: fields.manufacturer,
            model: fields.model,
            is_smart: fields.is_smart,
            fabrication_date: fields.fabrication_date,
            price: fields.price,
            owner_id,
            version,
        }
    }

    /// The user-editable part of this record.
    #[must_use]
    pub fn fields(&self) -> TvFields {
        TvFields {
            manufacturer: self.manufacturer.clone(),
            model: self.model.clone(),
            is_smart: self.is_smart,
            fabrication_date: self.fabrication_date,
            price: self.price,
        }
    }

    /// Returns a copy of this record carrying `version`.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// The validated, user-editable fields of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct TvFields {
    pub manufacturer: String,
    pub model: String,
    pub is_smart: bool,
    pub fabrication_date: DateTime<Utc>,
    pub price: f64,
}

/// A request body for create or update.
///
/// Every field is optional at the wire level so that a missing field surfaces as a
/// [`ValidationError`] rather than a deserialization failure. `ownerId` is never
/// read from the body; the caller identity decides ownership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvDraft {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<TvId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_smart: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabrication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl TvDraft {
    /// Names of the fields every record must carry, in wire format.
    pub const REQUIRED_FIELDS: [&'static str; 5] =
        ["manufacturer", "model", "fabricationDate", "price", "isSmart"];

    /// Validate the draft into [`TvFields`].
    ///
    /// Strings must be present and non-blank, `price` must be a finite number and
    /// `fabricationDate` must parse with [`parse_date`].
    pub fn validate(&self) -> Result<TvFields, ValidationError> {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().is_none_or(|v| v.trim().is_empty())
        }

        let mut missing = Vec::new();
        if blank(&self.manufacturer) {
            missing.push("manufacturer");
        }
        if blank(&self.model) {
            missing.push("model");
        }
        if blank(&self.fabrication_date) {
            missing.push("fabricationDate");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.is_smart.is_none() {
            missing.push("isSmart");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let raw_date = self.fabrication_date.as_deref().unwrap_or_default();
        let fabrication_date =
            parse_date(raw_date).ok_or_else(|| ValidationError::InvalidDate(raw_date.to_string()))?;

        let price = self.price.unwrap_or_default();
        if !price.is_finite() {
            return Err(ValidationError::InvalidPrice);
        }

        Ok(TvFields {
            manufacturer: self.manufacturer.clone().unwrap_or_default(),
            model: self.model.clone().unwrap_or_default(),
            is_smart: self.is_smart.unwrap_or_default(),
            fabrication_date,
            price,
        })
    }
}

impl From<&Tv> for TvDraft {
    fn from(tv: &Tv) -> Self {
        Self {
            id: Some(tv.id),
            manufacturer: Some(tv.manufacturer.clone()),
            model: Some(tv.model.clone()),
            is_smart: Some(tv.is_smart),
            fabrication_date: Some(tv.fabrication_date.to_rfc3339()),
            price: Some(tv.price),
            version: Some(tv.version),
        }
    }
}

/// Error returned when a draft cannot become a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    MissingFields(Vec<&'static str>),
    /// `fabricationDate` was present but not a recognised date.
    InvalidDate(String),
    /// `price` was NaN or infinite.
    InvalidPrice,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                let quoted: Vec<String> = fields.iter().map(|name| format!("'{}'", name)).collect();
                write!(f, "the following fields are required: {}", quoted.join(", "))
            }
            Self::InvalidDate(value) => write!(f, "invalid fabricationDate: {:?}", value),
            Self::InvalidPrice => write!(f, "price must be a finite number"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse a date as accepted on the wire.
///
/// Accepts RFC 3339 timestamps (`2020-06-06T10:00:00Z`) and plain calendar dates
/// (`2020-06-06`, read as midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
