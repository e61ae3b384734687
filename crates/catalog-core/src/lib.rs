//! catalog-core: Core types and primitives for the TV catalog
//!
//! This crate provides:
//! - Domain types (Tv, TvDraft, TvFields, TvId)
//! - Caller identity and the ownership check applied to every read and write
//! - The query engine shaping a caller's resource set (pagination, search, filters)
//!
//! Nothing in here performs I/O. Storage lives in `catalog-store`, transport in
//! `catalog-server`.

pub mod identity;
pub mod query;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use identity::{AccessDenied, Caller, OwnerId};
pub use query::{QueryError, QueryMode, QueryPage, QueryParams, SmartKind, TvQuery};
pub use types::{Tv, TvDraft, TvFields, TvId, ValidationError, parse_date};
