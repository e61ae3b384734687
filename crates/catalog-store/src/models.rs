//! Database models for the storage layer.
//!
//! These types map directly to rows of the `tvs` table and are kept apart from
//! the domain types in catalog-core.

use catalog_core::{OwnerId, Tv, TvId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Column list selected for every `tvs` query, in [`TvRow`] order.
pub const TV_COLUMNS: &str =
    "id, owner_id, manufacturer, model, is_smart, fabrication_date, price, version";

/// Database row for the `tvs` table.
#[derive(Debug, Clone, FromRow)]
pub struct TvRow {
    pub id: Uuid,
    pub owner_id: String,
    pub manufacturer: String,
    pub model: String,
    pub is_smart: bool,
    pub fabrication_date: DateTime<Utc>,
    pub price: f64,
    /// Postgres has no unsigned integers; always >= 1 by table constraint.
    pub version: i64,
}

impl TvRow {
    /// Convert to the domain record.
    pub fn into_tv(self) -> StoreResult<Tv> {
        let version = u64::try_from(self.version).map_err(|_| {
            StoreError::CorruptRow(format!("tv {} has negative version {}", self.id, self.version))
        })?;

        Ok(Tv {
            id: TvId::from_uuid(self.id),
            manufacturer: self.manufacturer,
            model: self.model,
            is_smart: self.is_smart,
            fabrication_date: self.fabrication_date,
            price: self.price,
            owner_id: OwnerId::new(self.owner_id),
            version,
        })
    }
}

/// Convert a domain version to the column type.
pub fn version_to_db(version: u64) -> StoreResult<i64> {
    i64::try_from(version)
        .map_err(|_| StoreError::InvalidFilter(format!("version {} out of range", version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(version: i64) -> TvRow {
        TvRow {
            id: Uuid::nil(),
            owner_id: "u1".into(),
            manufacturer: "Samsung".into(),
            model: "50TUS7853".into(),
            is_smart: false,
            fabrication_date: Utc::now(),
            price: 499.0,
            version,
        }
    }

    #[test]
    fn test_row_into_tv() {
        let tv = row(3).into_tv().unwrap();
        assert_eq!(tv.id, TvId::from_uuid(Uuid::nil()));
        assert_eq!(tv.owner_id, OwnerId::new("u1"));
        assert_eq!(tv.version, 3);
    }

    #[test]
    fn test_negative_version_is_corrupt() {
        assert!(matches!(row(-1).into_tv(), Err(StoreError::CorruptRow(_))));
    }

    #[test]
    fn test_version_to_db_range() {
        assert_eq!(version_to_db(7).unwrap(), 7);
        assert!(version_to_db(u64::MAX).is_err());
    }
}
