//! Canonical system record persistence
//!
//! One row per (home, system kind). Provenance, field values, data
//! sources, and photo hashes live in validated JSON columns; enum
//! columns are parsed through the closed engine enums on read.

use super::{parse_timestamp, parse_uuid};
use chrono::Utc;
use habitta_common::db::models::HomeSystem;
use habitta_common::{Error, Result};
use habitta_engine::sync::InstallYearBasis;
use habitta_engine::{ProvenanceMap, SystemField, SystemKind, UpdateSource};
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT guid, home_id, system_kind, generation, install_year,
           install_year_estimated, install_year_basis, install_source,
           confidence, fields_json, provenance_json, data_sources_json,
           photo_hashes_json, images_json, last_maintenance_at, updated_at
    FROM systems
"#;

/// Load the canonical record for one (home, kind)
pub async fn load_system(
    pool: &SqlitePool,
    home_id: Uuid,
    kind: SystemKind,
) -> Result<Option<HomeSystem>> {
    let query = format!("{SELECT_COLUMNS} WHERE home_id = ? AND system_kind = ?");
    let row = sqlx::query(&query)
        .bind(home_id.to_string())
        .bind(kind.as_db_str())
        .fetch_optional(pool)
        .await?;

    row.map(|row| row_to_system(&row)).transpose()
}

/// Load every canonical record for a home
pub async fn load_systems_for_home(pool: &SqlitePool, home_id: Uuid) -> Result<Vec<HomeSystem>> {
    let query = format!("{SELECT_COLUMNS} WHERE home_id = ? ORDER BY system_kind");
    let rows = sqlx::query(&query)
        .bind(home_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_system).collect()
}

/// Upsert the canonical record. The caller owns read-modify-write
/// discipline via the per-record update lock.
pub async fn save_system(pool: &SqlitePool, system: &HomeSystem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO systems (
            guid, home_id, system_kind, generation, install_year,
            install_year_estimated, install_year_basis, install_source,
            confidence, fields_json, provenance_json, data_sources_json,
            photo_hashes_json, images_json, last_maintenance_at, created_at,
            updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, ?)
        ON CONFLICT(home_id, system_kind) DO UPDATE SET
            generation = excluded.generation,
            install_year = excluded.install_year,
            install_year_estimated = excluded.install_year_estimated,
            install_year_basis = excluded.install_year_basis,
            install_source = excluded.install_source,
            confidence = excluded.confidence,
            fields_json = excluded.fields_json,
            provenance_json = excluded.provenance_json,
            data_sources_json = excluded.data_sources_json,
            photo_hashes_json = excluded.photo_hashes_json,
            images_json = excluded.images_json,
            last_maintenance_at = excluded.last_maintenance_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(system.guid.to_string())
    .bind(system.home_id.to_string())
    .bind(system.kind.as_db_str())
    .bind(system.generation)
    .bind(system.install_year)
    .bind(system.install_year_estimated)
    .bind(system.install_year_basis.map(install_year_basis_str))
    .bind(system.install_source.as_db_str())
    .bind(system.confidence)
    .bind(fields_to_json(&system.fields)?)
    .bind(system.provenance.to_json())
    .bind(string_set_to_json(&system.data_sources)?)
    .bind(string_set_to_json(&system.photo_hashes)?)
    .bind(string_list_to_json(&system.images)?)
    .bind(system.last_maintenance_at.map(|t| t.to_rfc3339()))
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_system(row: &sqlx::sqlite::SqliteRow) -> Result<HomeSystem> {
    let guid_str: String = row.get("guid");
    let home_id_str: String = row.get("home_id");
    let kind_str: String = row.get("system_kind");
    let source_str: String = row.get("install_source");
    let basis_str: Option<String> = row.get("install_year_basis");
    let fields_json: String = row.get("fields_json");
    let provenance_json: String = row.get("provenance_json");
    let data_sources_json: String = row.get("data_sources_json");
    let photo_hashes_json: String = row.get("photo_hashes_json");
    let images_json: String = row.get("images_json");
    let last_maintenance: Option<String> = row.get("last_maintenance_at");
    let updated_at: String = row.get("updated_at");

    Ok(HomeSystem {
        guid: parse_uuid(&guid_str, "systems.guid")?,
        home_id: parse_uuid(&home_id_str, "systems.home_id")?,
        kind: SystemKind::from_str(&kind_str)
            .ok_or_else(|| Error::CorruptRecord(format!("unknown system_kind '{kind_str}'")))?,
        generation: row.get("generation"),
        install_year: row.get("install_year"),
        install_year_estimated: row.get("install_year_estimated"),
        install_year_basis: basis_str.as_deref().map(parse_install_year_basis).transpose()?,
        install_source: UpdateSource::from_str(&source_str).ok_or_else(|| {
            Error::CorruptRecord(format!("unknown install_source '{source_str}'"))
        })?,
        confidence: row.get("confidence"),
        fields: fields_from_json(&fields_json)?,
        provenance: ProvenanceMap::from_json(&provenance_json)
            .map_err(|e| Error::CorruptRecord(e.to_string()))?,
        data_sources: string_set_from_json(&data_sources_json)?,
        photo_hashes: string_set_from_json(&photo_hashes_json)?,
        images: string_list_from_json(&images_json)?,
        last_maintenance_at: last_maintenance.as_deref().map(parse_timestamp).transpose()?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn install_year_basis_str(basis: InstallYearBasis) -> &'static str {
    match basis {
        InstallYearBasis::SerialDecode => "serial_decode",
        InstallYearBasis::ManufactureYear => "manufacture_year",
    }
}

fn parse_install_year_basis(s: &str) -> Result<InstallYearBasis> {
    match s {
        "serial_decode" => Ok(InstallYearBasis::SerialDecode),
        "manufacture_year" => Ok(InstallYearBasis::ManufactureYear),
        other => Err(Error::CorruptRecord(format!(
            "unknown install_year_basis '{other}'"
        ))),
    }
}

fn fields_to_json(fields: &BTreeMap<SystemField, String>) -> Result<String> {
    serde_json::to_string(fields).map_err(|e| Error::Internal(e.to_string()))
}

fn fields_from_json(json: &str) -> Result<BTreeMap<SystemField, String>> {
    serde_json::from_str(json)
        .map_err(|e| Error::CorruptRecord(format!("invalid fields_json: {e}")))
}

fn string_set_to_json(set: &BTreeSet<String>) -> Result<String> {
    serde_json::to_string(set).map_err(|e| Error::Internal(e.to_string()))
}

fn string_set_from_json(json: &str) -> Result<BTreeSet<String>> {
    serde_json::from_str(json)
        .map_err(|e| Error::CorruptRecord(format!("invalid string set column: {e}")))
}

fn string_list_to_json(list: &[String]) -> Result<String> {
    serde_json::to_string(list).map_err(|e| Error::Internal(e.to_string()))
}

fn string_list_from_json(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|e| Error::CorruptRecord(format!("invalid string list column: {e}")))
}
