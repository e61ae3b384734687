//! The persistence contract behind `TvStore`.
//!
//! A [`Collection`] is a bag of typed documents with five operations: `find`,
//! `find_one`, `insert`, `update`, `remove`. All selection is by equality
//! [`Filter`]. Any backend that honours this contract can sit behind the store.
//!
//! `update` is conditional on the whole filter, including `version` when set. A
//! backend must evaluate the filter and write the replacement as one atomic step;
//! this is what turns the store's version check into a compare-and-set.

use async_trait::async_trait;
use catalog_core::{OwnerId, Tv, TvId};

use crate::error::StoreResult;

/// A document a [`Collection`] can hold and match against a [`Filter`].
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> TvId;
    fn owner_id(&self) -> &OwnerId;
    fn version(&self) -> u64;

    /// Overwrite the mutable part of `self` with `next`.
    ///
    /// Identity fields (`id`, `owner_id`) of `self` are kept.
    fn replace_with(&mut self, next: Self);
}

impl Document for Tv {
    fn id(&self) -> TvId {
        self.id
    }

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn replace_with(&mut self, next: Self) {
        self.manufacturer = next.manufacturer;
        self.model = next.model;
        self.is_smart = next.is_smart;
        self.fabrication_date = next.fabrication_date;
        self.price = next.price;
        self.version = next.version;
    }
}

/// Equality filter. Unset fields match anything; set fields must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub id: Option<TvId>,
    pub owner_id: Option<OwnerId>,
    pub version: Option<u64>,
}

impl Filter {
    /// Match every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with this id.
    pub fn by_id(id: TvId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Match every document owned by `owner_id`.
    pub fn by_owner(owner_id: OwnerId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    /// Additionally require `version`.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Whether `doc` satisfies every set field.
    pub fn matches<D: Document>(&self, doc: &D) -> bool {
        self.id.is_none_or(|id| doc.id() == id)
            && self.owner_id.as_ref().is_none_or(|owner| doc.owner_id() == owner)
            && self.version.is_none_or(|version| doc.version() == version)
    }
}

/// Minimal persistence interface over documents of type `D`.
#[async_trait]
pub trait Collection<D: Document>: Send + Sync {
    /// All documents matching `filter`, in insertion order.
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<D>>;

    /// The first document matching `filter`, if any.
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<D>>;

    /// Persist a new document and return it as stored.
    async fn insert(&self, doc: D) -> StoreResult<D>;

    /// Atomically replace the first document matching `filter` with `doc`.
    ///
    /// Returns the number of documents updated (0 or 1).
    async fn update(&self, filter: &Filter, doc: D) -> StoreResult<u64>;

    /// Delete the first document matching `filter`.
    ///
    /// Returns the number of documents removed (0 or 1).
    async fn remove(&self, filter: &Filter) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::TvDraft;

    fn tv(owner: &str, version: u64) -> Tv {
        let fields = TvDraft {
            manufacturer: Some("LG".into()),
            model: Some("32LWG6000".into()),
            is_smart: Some(false),
            fabrication_date: Some("2020-07-08".into()),
            price: Some(299.0),
            ..TvDraft::default()
        }
        .validate()
        .unwrap();
        Tv::from_fields(TvId::new(), OwnerId::new(owner), fields, version)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&tv("a", 1)));
    }

    #[test]
    fn test_filter_fields_are_conjunctive() {
        let doc = tv("a", 3);
        assert!(Filter::by_id(doc.id).with_version(3).matches(&doc));
        assert!(!Filter::by_id(doc.id).with_version(2).matches(&doc));
        assert!(!Filter::by_owner(OwnerId::new("b")).matches(&doc));
        assert!(Filter::by_owner(OwnerId::new("a")).matches(&doc));
    }

    #[test]
    fn test_replace_with_keeps_identity() {
        let mut stored = tv("a", 1);
        let original_id = stored.id;
        let mut next = tv("b", 2);
        next.price = 10.0;
        stored.replace_with(next);
        assert_eq!(stored.id, original_id);
        assert_eq!(stored.owner_id, OwnerId::new("a"));
        assert_eq!(stored.version, 2);
        assert_eq!(stored.price, 10.0);
    }
}
