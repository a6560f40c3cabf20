//! Update audit log persistence
//!
//! Every processed evidence payload leaves one row here: applied, held,
//! rejected, or duplicate. Held rows are the queue a confirmation UI
//! reads from.

use super::{parse_timestamp, parse_uuid};
use habitta_common::db::models::{SystemUpdateLog, UpdateOutcome};
use habitta_common::{Error, Result};
use habitta_engine::{SystemField, UpdateSource};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Append one audit row
pub async fn insert_update_log(pool: &SqlitePool, log: &SystemUpdateLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO system_updates (
            guid, system_id, source, outcome, fields_updated_json,
            fields_held_json, confidence_before, confidence_after, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(log.guid.to_string())
    .bind(log.system_id.to_string())
    .bind(log.source.as_db_str())
    .bind(log.outcome.as_db_str())
    .bind(fields_to_json(&log.fields_updated)?)
    .bind(fields_to_json(&log.fields_held)?)
    .bind(log.confidence_before)
    .bind(log.confidence_after)
    .bind(log.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the audit history for one system, newest first
pub async fn load_update_history(
    pool: &SqlitePool,
    system_id: Uuid,
) -> Result<Vec<SystemUpdateLog>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, system_id, source, outcome, fields_updated_json,
               fields_held_json, confidence_before, confidence_after, created_at
        FROM system_updates
        WHERE system_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(system_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let guid_str: String = row.get("guid");
            let system_id_str: String = row.get("system_id");
            let source_str: String = row.get("source");
            let outcome_str: String = row.get("outcome");
            let updated_json: String = row.get("fields_updated_json");
            let held_json: String = row.get("fields_held_json");
            let created_at: String = row.get("created_at");

            Ok(SystemUpdateLog {
                guid: parse_uuid(&guid_str, "system_updates.guid")?,
                system_id: parse_uuid(&system_id_str, "system_updates.system_id")?,
                source: UpdateSource::from_str(&source_str)
                    .ok_or_else(|| Error::CorruptRecord(format!("unknown source '{source_str}'")))?,
                outcome: UpdateOutcome::from_str(&outcome_str)
                    .ok_or_else(|| Error::CorruptRecord(format!("unknown outcome '{outcome_str}'")))?,
                fields_updated: fields_from_json(&updated_json)?,
                fields_held: fields_from_json(&held_json)?,
                confidence_before: row.get("confidence_before"),
                confidence_after: row.get("confidence_after"),
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}

fn fields_to_json(fields: &[SystemField]) -> Result<String> {
    serde_json::to_string(fields).map_err(|e| Error::Internal(e.to_string()))
}

fn fields_from_json(json: &str) -> Result<Vec<SystemField>> {
    serde_json::from_str(json)
        .map_err(|e| Error::CorruptRecord(format!("invalid field list column: {e}")))
}
