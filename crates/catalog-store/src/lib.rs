//! catalog-store: Storage layer for the TV catalog
//!
//! This crate provides:
//! - `TvStore`, the versioned record store with optimistic concurrency control
//! - The `Collection` trait, the minimal persistence contract the store depends on
//! - An in-memory backend and a PostgreSQL backend (via sqlx)
//! - Embedded schema migration for PostgreSQL
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_store::{Filter, StoreConfig, TvStore};
//!
//! let store = TvStore::connect(StoreConfig::from_env()?).await?;
//!
//! let tv = store.insert(&owner, &draft).await?;
//! let mine = store.find(&Filter::by_owner(owner.clone())).await?;
//! ```

pub mod collection;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use collection::{Collection, Document, Filter};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryCollection;
pub use postgres::PgCollection;
pub use store::{StoreConfig, TvStore};

// Re-export catalog-core for downstream crates
pub use catalog_core;
