//! In-memory collection backend.
//!
//! Documents live in a vector behind a single `RwLock`, so insertion order is the
//! iteration order and every `update`/`remove` runs its match and its write under
//! one write guard. Readers never observe a half-written document.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collection::{Collection, Document, Filter};
use crate::error::StoreResult;

/// Process-local document collection.
#[derive(Debug, Default)]
pub struct MemoryCollection<D> {
    docs: RwLock<Vec<D>>,
}

impl<D: Document> MemoryCollection<D> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Create a collection seeded with `docs`, kept in the given order.
    pub fn with_documents(docs: Vec<D>) -> Self {
        Self {
            docs: RwLock::new(docs),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl<D: Document> Collection<D> for MemoryCollection<D> {
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<D>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| filter.matches(*d)).cloned().collect())
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<D>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| filter.matches(*d)).cloned())
    }

    async fn insert(&self, doc: D) -> StoreResult<D> {
        self.docs.write().await.push(doc.clone());
        Ok(doc)
    }

    async fn update(&self, filter: &Filter, doc: D) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| filter.matches(&**d)) {
            Some(slot) => {
                slot.replace_with(doc);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, filter: &Filter) -> StoreResult<u64> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{OwnerId, Tv, TvDraft, TvId};

    fn tv(owner: &str, model: &str) -> Tv {
        let fields = TvDraft {
            manufacturer: Some("Samsung".into()),
            model: Some(model.into()),
            is_smart: Some(true),
            fabrication_date: Some("2019-10-10".into()),
            price: Some(399.0),
            ..TvDraft::default()
        }
        .validate()
        .unwrap();
        Tv::from_fields(TvId::new(), OwnerId::new(owner), fields, 1)
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order() {
        let collection = MemoryCollection::new();
        for model in ["a", "b", "c"] {
            collection.insert(tv("u", model)).await.unwrap();
        }
        collection.insert(tv("other", "x")).await.unwrap();

        let found = collection
            .find(&Filter::by_owner(OwnerId::new("u")))
            .await
            .unwrap();
        let models: Vec<_> = found.iter().map(|t| t.model.as_str()).collect();
        assert_eq!(models, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_find_with_no_match_is_empty_not_error() {
        let collection: MemoryCollection<Tv> = MemoryCollection::new();
        let found = collection
            .find(&Filter::by_owner(OwnerId::new("nobody")))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_update_respects_version_in_filter() {
        let doc = tv("u", "a");
        let collection = MemoryCollection::with_documents(vec![doc.clone()]);

        let stale = collection
            .update(&Filter::by_id(doc.id).with_version(7), doc.clone().with_version(8))
            .await
            .unwrap();
        assert_eq!(stale, 0);

        let fresh = collection
            .update(&Filter::by_id(doc.id).with_version(1), doc.clone().with_version(2))
            .await
            .unwrap();
        assert_eq!(fresh, 1);

        let stored = collection.find_one(&Filter::by_id(doc.id)).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_remove_at_most_one() {
        let collection = MemoryCollection::with_documents(vec![tv("u", "a"), tv("u", "b")]);
        let removed = collection
            .remove(&Filter::by_owner(OwnerId::new("u")))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(collection.len().await, 1);

        let missing = collection.remove(&Filter::by_id(TvId::new())).await.unwrap();
        assert_eq!(missing, 0);
    }
}
