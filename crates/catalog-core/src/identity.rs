//! Caller identity and ownership checks.
//!
//! Identity is resolved outside the core (JWT, dev header, ...) and handed in as a
//! [`Caller`]. The core never re-derives or re-verifies it. Every read or write of a
//! single record goes through [`Caller::claim`], which is the one place ownership
//! is decided.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Tv, TvId};

/// Identity of the user owning a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap a user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability handed to every core operation: "this request acts as this user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    owner_id: OwnerId,
}

impl Caller {
    /// Create a caller from an already-trusted identity.
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        Self { owner_id }
    }

    /// The identity this caller acts as.
    #[must_use]
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Whether this caller owns `tv`.
    #[must_use]
    pub fn owns(&self, tv: &Tv) -> bool {
        tv.owner_id == self.owner_id
    }

    /// Resolve a lookup result into a record this caller may act on.
    ///
    /// Absent records are `NotFound`; records owned by someone else are `Forbidden`.
    pub fn claim(&self, id: TvId, found: Option<Tv>) -> Result<Tv, AccessDenied> {
        match found {
            None => Err(AccessDenied::NotFound(id)),
            Some(tv) if !self.owns(&tv) => Err(AccessDenied::Forbidden(id)),
            Some(tv) => Ok(tv),
        }
    }
}

/// Why a caller may not act on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No record with this id exists for anyone.
    NotFound(TvId),
    /// The record exists but belongs to another user.
    Forbidden(TvId),
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "tv with id {} not found", id),
            Self::Forbidden(_) => write!(f, "access forbidden"),
        }
    }
}

impl std::error::Error for AccessDenied {}
