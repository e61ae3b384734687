//! Schema definitions and migration utilities.
//!
//! This module provides the embedded SQL schema and applies it at connect time.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the tvs table (001_tvs.sql).
pub const TVS_MIGRATION: &str = include_str!("../../../migrations/001_tvs.sql");

/// Run all pending migrations against the database.
///
/// This function is idempotent - it can be run multiple times safely.
///
/// # Errors
///
/// Returns an error if the migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    tracing::debug!("Running tvs migration (001_tvs.sql)...");
    sqlx::raw_sql(TVS_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("tvs migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}
