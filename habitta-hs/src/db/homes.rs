//! Home database operations

use super::parse_uuid;
use habitta_common::db::models::Home;
use habitta_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a new home
pub async fn insert_home(pool: &SqlitePool, home: &Home) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO homes (guid, owner_user_id, address, year_built, climate_zone)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(home.guid.to_string())
    .bind(&home.owner_user_id)
    .bind(&home.address)
    .bind(home.year_built)
    .bind(&home.climate_zone)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a home by id
pub async fn load_home(pool: &SqlitePool, home_id: Uuid) -> Result<Option<Home>> {
    let row = sqlx::query(
        "SELECT guid, owner_user_id, address, year_built, climate_zone FROM homes WHERE guid = ?",
    )
    .bind(home_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            Ok(Some(Home {
                guid: parse_uuid(&guid_str, "homes.guid")?,
                owner_user_id: row.get("owner_user_id"),
                address: row.get("address"),
                year_built: row.get("year_built"),
                climate_zone: row.get("climate_zone"),
            }))
        }
        None => Ok(None),
    }
}

/// Load a home, failing with NotFound when absent
pub async fn require_home(pool: &SqlitePool, home_id: Uuid) -> Result<Home> {
    load_home(pool, home_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("home {home_id}")))
}
