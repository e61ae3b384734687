//! Versioned record store.
//!
//! `TvStore` sits on top of any [`Collection`] and owns the record lifecycle:
//! id and initial version on insert, and compare-and-set on `version` for every
//! update. Callers never write a version themselves.

use std::sync::Arc;

use catalog_core::{OwnerId, Tv, TvDraft, TvId};

use crate::collection::{Collection, Filter};
use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryCollection;
use crate::postgres::PgCollection;

/// Configuration for the storage backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection URL. `None` selects the in-memory backend.
    pub database_url: Option<String>,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DATABASE_URL` - Optional; without it records are kept in memory
    /// - `DATABASE_MAX_CONNECTIONS` - Optional, defaults to 10
    /// - `DATABASE_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DATABASE_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env() -> StoreResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        if min_connections > max_connections {
            return Err(StoreError::ConfigError(format!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                min_connections, max_connections
            )));
        }

        let run_migrations = std::env::var("DATABASE_RUN_MIGRATIONS")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(true);

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            run_migrations,
        })
    }
}

/// Store of TV records with optimistic concurrency control.
#[derive(Clone)]
pub struct TvStore {
    collection: Arc<dyn Collection<Tv>>,
}

impl std::fmt::Debug for TvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvStore").finish_non_exhaustive()
    }
}

impl TvStore {
    /// Wrap an existing collection.
    pub fn new(collection: Arc<dyn Collection<Tv>>) -> Self {
        Self { collection }
    }

    /// Store backed by an empty in-memory collection.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCollection::<Tv>::new()))
    }

    /// Open the backend named by `config`.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        match config.database_url.as_deref() {
            Some(url) => {
                let collection = PgCollection::connect(&config, url).await?;
                Ok(Self::new(Arc::new(collection)))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                Ok(Self::in_memory())
            }
        }
    }

    /// Validate `draft` and persist it as a new record owned by `owner_id`.
    ///
    /// Any id, owner or version in the draft is ignored: the record gets a fresh
    /// id and version 1.
    pub async fn insert(&self, owner_id: &OwnerId, draft: &TvDraft) -> StoreResult<Tv> {
        let fields = draft.validate()?;
        let tv = Tv::from_fields(TvId::new(), owner_id.clone(), fields, Tv::INITIAL_VERSION);
        let stored = self.collection.insert(tv).await?;
        tracing::debug!(tv_id = %stored.id, owner_id = %stored.owner_id, "Inserted tv");
        Ok(stored)
    }

    /// All records matching `filter`, in creation order.
    pub async fn find(&self, filter: &Filter) -> StoreResult<Vec<Tv>> {
        self.collection.find(filter).await
    }

    /// The first record matching `filter`.
    pub async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Tv>> {
        self.collection.find_one(filter).await
    }

    /// Replace the record selected by `filter` with `tv`.
    ///
    /// `tv.version` is the version the caller read. The write happens only if it
    /// is still the stored version, and the stored record then carries
    /// `tv.version + 1`. Returns the number of records written:
    ///
    /// - `Ok(1)` on success
    /// - `Err(VersionConflict)` if the record exists under another version
    /// - `Ok(0)` if the record no longer exists
    pub async fn update(&self, filter: &Filter, tv: Tv) -> StoreResult<u64> {
        let Some(id) = filter.id else {
            return Err(StoreError::InvalidFilter(
                "update requires a record id".to_string(),
            ));
        };

        let submitted = tv.version;
        let next = submitted.checked_add(1).ok_or_else(|| {
            StoreError::InvalidFilter(format!("version {} cannot be incremented", submitted))
        })?;

        let guarded = filter.clone().with_version(submitted);
        let written = self
            .collection
            .update(&guarded, tv.with_version(next))
            .await?;
        if written > 0 {
            tracing::debug!(tv_id = %id, version = next, "Updated tv");
            return Ok(written);
        }

        let unguarded = Filter {
            version: None,
            ..filter.clone()
        };
        match self.collection.find_one(&unguarded).await? {
            Some(stored) => {
                tracing::debug!(
                    tv_id = %id,
                    submitted,
                    stored = stored.version,
                    "Rejected stale update"
                );
                Err(StoreError::VersionConflict {
                    id,
                    submitted,
                    stored: stored.version,
                })
            }
            None => Ok(0),
        }
    }

    /// Delete the first record matching `filter`. Returns 0 or 1.
    pub async fn remove(&self, filter: &Filter) -> StoreResult<u64> {
        let removed = self.collection.remove(filter).await?;
        if removed > 0 {
            tracing::debug!(?filter, "Removed tv");
        }
        Ok(removed)
    }
}
