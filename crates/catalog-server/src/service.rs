//! Record operations as seen by one caller.
//!
//! `TvService` ties the store, the query engine and the notification hub
//! together. Every method takes the resolved [`Caller`]; ownership of a single
//! record is always decided by [`Caller::claim`]. Notifications go out after the
//! write succeeded and never fail the request.

use catalog_core::{Caller, QueryPage, QueryParams, Tv, TvDraft, TvId, TvQuery};
use catalog_store::{Filter, TvStore};

use crate::error::{ApiError, ApiResult};
use crate::events::{NotificationHub, TvEvent};

/// Version assumed when an update body carries none.
const DEFAULT_SUBMITTED_VERSION: u64 = 1;

#[derive(Debug, Clone)]
pub struct TvService {
    store: TvStore,
    hub: NotificationHub,
}

impl TvService {
    pub fn new(store: TvStore, hub: NotificationHub) -> Self {
        Self { store, hub }
    }

    /// The caller's records, shaped by `params`.
    pub async fn get_all(&self, caller: &Caller, params: &QueryParams) -> ApiResult<QueryPage<Tv>> {
        let query = TvQuery::from_params(params)?;
        let tvs = self
            .store
            .find(&Filter::by_owner(caller.owner_id().clone()))
            .await?;

        let page = query.apply(tvs);
        tracing::debug!(
            owner_id = %caller.owner_id(),
            mode = ?query.mode(),
            count = page.items.len(),
            "Listed tvs"
        );
        Ok(page)
    }

    pub async fn get_by_id(&self, caller: &Caller, id: TvId) -> ApiResult<Tv> {
        let found = self.store.find_one(&Filter::by_id(id)).await?;
        Ok(caller.claim(id, found)?)
    }

    /// Insert a record owned by the caller and notify their sessions.
    pub async fn create(&self, caller: &Caller, draft: &TvDraft) -> ApiResult<Tv> {
        let tv = self.store.insert(caller.owner_id(), draft).await?;
        tracing::info!(tv_id = %tv.id, owner_id = %tv.owner_id, "Tv created");

        self.hub
            .send(caller.owner_id(), &TvEvent::created(tv.clone()))
            .await;
        Ok(tv)
    }

    /// Replace record `id` with `draft`.
    ///
    /// `draft.version` is the version the caller last saw (1 when absent). The
    /// stored record must still carry it; the result carries it plus one.
    pub async fn update(&self, caller: &Caller, id: TvId, draft: &TvDraft) -> ApiResult<Tv> {
        if let Some(body_id) = draft.id.filter(|body_id| *body_id != id) {
            return Err(ApiError::IdMismatch { path: id, body: body_id });
        }

        let found = self.store.find_one(&Filter::by_id(id)).await?;
        let current = caller.claim(id, found)?;

        let fields = draft.validate()?;
        let submitted = draft.version.unwrap_or(DEFAULT_SUBMITTED_VERSION);
        if current.version != submitted {
            return Err(ApiError::VersionConflict {
                id,
                submitted,
                stored: current.version,
            });
        }

        let owner_id = caller.owner_id().clone();
        let next = Tv::from_fields(id, owner_id.clone(), fields, submitted);
        let filter = Filter {
            id: Some(id),
            owner_id: Some(owner_id),
            version: None,
        };

        // the store re-checks the version atomically with the write
        let written = self.store.update(&filter, next.clone()).await?;
        if written == 0 {
            tracing::warn!(tv_id = %id, "Tv vanished before update was written");
            return Err(ApiError::StaleWrite(id));
        }

        let updated = next.with_version(submitted + 1);
        tracing::info!(tv_id = %id, version = updated.version, "Tv updated");

        self.hub
            .send(caller.owner_id(), &TvEvent::updated(updated.clone()))
            .await;
        Ok(updated)
    }

    /// Delete record `id` and notify with its last state.
    pub async fn remove(&self, caller: &Caller, id: TvId) -> ApiResult<()> {
        let found = self.store.find_one(&Filter::by_id(id)).await?;
        let snapshot = caller.claim(id, found)?;

        let filter = Filter {
            id: Some(id),
            owner_id: Some(caller.owner_id().clone()),
            version: None,
        };
        if self.store.remove(&filter).await? == 0 {
            return Err(ApiError::NotFound(format!("tv {}", id)));
        }
        tracing::info!(tv_id = %id, "Tv deleted");

        self.hub
            .send(caller.owner_id(), &TvEvent::deleted(snapshot))
            .await;
        Ok(())
    }
}
