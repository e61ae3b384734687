//! PostgreSQL collection backend.
//!
//! One row per record in the `tvs` table. Insertion order is the `seq` column.
//! Conditional updates and deletes are single statements: the row is picked by a
//! subselect and the full filter is re-checked in the outer `WHERE`, so a
//! concurrent writer that bumped `version` first makes this statement match nothing.

use async_trait::async_trait;
use catalog_core::Tv;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

use crate::collection::{Collection, Filter};
use crate::error::StoreResult;
use crate::models::{TV_COLUMNS, TvRow, version_to_db};
use crate::schema;
use crate::store::StoreConfig;

/// `tvs` table accessed through a connection pool.
#[derive(Debug, Clone)]
pub struct PgCollection {
    pool: PgPool,
}

impl PgCollection {
    /// Connect to the database with the given configuration.
    ///
    /// Runs migrations if `config.run_migrations` is true.
    pub async fn connect(config: &StoreConfig, database_url: &str) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }
}

/// Append ` AND <column> = <bind>` for every set field of `filter`.
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> StoreResult<()> {
    if let Some(id) = filter.id {
        qb.push(" AND id = ").push_bind(*id.as_uuid());
    }
    if let Some(owner_id) = &filter.owner_id {
        qb.push(" AND owner_id = ").push_bind(owner_id.as_str().to_string());
    }
    if let Some(version) = filter.version {
        qb.push(" AND version = ").push_bind(version_to_db(version)?);
    }
    Ok(())
}

/// Append `WHERE id = (first match by seq) AND <filter>`.
fn push_single_target(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> StoreResult<()> {
    qb.push(" WHERE id = (SELECT id FROM tvs WHERE TRUE");
    push_conditions(qb, filter)?;
    qb.push(" ORDER BY seq LIMIT 1)");
    push_conditions(qb, filter)
}

#[async_trait]
impl Collection<Tv> for PgCollection {
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Tv>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM tvs WHERE TRUE", TV_COLUMNS));
        push_conditions(&mut qb, filter)?;
        qb.push(" ORDER BY seq");

        let rows = qb.build_query_as::<TvRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(TvRow::into_tv).collect()
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Tv>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM tvs WHERE TRUE", TV_COLUMNS));
        push_conditions(&mut qb, filter)?;
        qb.push(" ORDER BY seq LIMIT 1");

        let row = qb.build_query_as::<TvRow>().fetch_optional(&self.pool).await?;
        row.map(TvRow::into_tv).transpose()
    }

    async fn insert(&self, doc: Tv) -> StoreResult<Tv> {
        let row = sqlx::query_as::<_, TvRow>(&format!(
            r#"
            INSERT INTO tvs (id, owner_id, manufacturer, model, is_smart, fabrication_date, price, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TV_COLUMNS
        ))
        .bind(*doc.id.as_uuid())
        .bind(doc.owner_id.as_str())
        .bind(&doc.manufacturer)
        .bind(&doc.model)
        .bind(doc.is_smart)
        .bind(doc.fabrication_date)
        .bind(doc.price)
        .bind(version_to_db(doc.version)?)
        .fetch_one(&self.pool)
        .await?;

        row.into_tv()
    }

    async fn update(&self, filter: &Filter, doc: Tv) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("UPDATE tvs SET manufacturer = ");
        qb.push_bind(doc.manufacturer)
            .push(", model = ")
            .push_bind(doc.model)
            .push(", is_smart = ")
            .push_bind(doc.is_smart)
            .push(", fabrication_date = ")
            .push_bind(doc.fabrication_date)
            .push(", price = ")
            .push_bind(doc.price)
            .push(", version = ")
            .push_bind(version_to_db(doc.version)?);
        push_single_target(&mut qb, filter)?;

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("DELETE FROM tvs");
        push_single_target(&mut qb, filter)?;

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
