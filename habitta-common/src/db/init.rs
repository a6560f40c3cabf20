//! Database initialization
//!
//! Creates the database on first run and applies the schema
//! idempotently, so services start with zero manual setup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Apply the full schema (idempotent, safe to call repeatedly)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_homes_table(pool).await?;
    create_systems_table(pool).await?;
    create_system_updates_table(pool).await?;
    create_decision_events_table(pool).await?;
    create_tasks_table(pool).await?;
    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_homes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS homes (
            guid TEXT PRIMARY KEY,
            owner_user_id TEXT NOT NULL,
            address TEXT,
            year_built INTEGER,
            climate_zone TEXT NOT NULL DEFAULT 'hot_humid',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// One canonical record per (home, system kind). All downstream
/// predictors read this row, never the raw evidence.
async fn create_systems_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS systems (
            guid TEXT PRIMARY KEY,
            home_id TEXT NOT NULL REFERENCES homes(guid),
            system_kind TEXT NOT NULL,
            generation INTEGER NOT NULL DEFAULT 0,
            install_year INTEGER,
            install_year_estimated INTEGER NOT NULL DEFAULT 0,
            install_year_basis TEXT,
            install_source TEXT NOT NULL DEFAULT 'inferred',
            confidence REAL NOT NULL DEFAULT 0.0,
            fields_json TEXT NOT NULL DEFAULT '{}',
            provenance_json TEXT NOT NULL DEFAULT '{}',
            data_sources_json TEXT NOT NULL DEFAULT '[]',
            photo_hashes_json TEXT NOT NULL DEFAULT '[]',
            images_json TEXT NOT NULL DEFAULT '[]',
            last_maintenance_at TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(home_id, system_kind)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Audit log of every resolution outcome, applied or not
async fn create_system_updates_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_updates (
            guid TEXT PRIMARY KEY,
            system_id TEXT NOT NULL REFERENCES systems(guid),
            source TEXT NOT NULL,
            outcome TEXT NOT NULL,
            fields_updated_json TEXT NOT NULL DEFAULT '[]',
            fields_held_json TEXT NOT NULL DEFAULT '[]',
            confidence_before REAL NOT NULL,
            confidence_after REAL NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Append-only homeowner decisions, tied to a record generation
async fn create_decision_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS decision_events (
            guid TEXT PRIMARY KEY,
            system_id TEXT NOT NULL REFERENCES systems(guid),
            generation INTEGER NOT NULL,
            decision_type TEXT NOT NULL,
            assumptions_json TEXT,
            user_notes TEXT,
            defer_until TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_tasks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            guid TEXT PRIMARY KEY,
            home_id TEXT NOT NULL REFERENCES homes(guid),
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            due_date TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();

        // Table exists and accepts writes
        sqlx::query("INSERT INTO settings (key, value) VALUES ('probe', '1')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unique_canonical_record_per_home_and_kind() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO homes (guid, owner_user_id) VALUES ('h1', 'u1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO systems (guid, home_id, system_kind) VALUES ('s1', 'h1', 'hvac')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let duplicate = sqlx::query(
            "INSERT INTO systems (guid, home_id, system_kind) VALUES ('s2', 'h1', 'hvac')",
        )
        .execute(&pool)
        .await;
        assert!(duplicate.is_err());
    }
}
