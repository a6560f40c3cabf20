//! Decision event persistence (append-only)

use super::{parse_timestamp, parse_uuid};
use habitta_common::db::models::DecisionEventRecord;
use habitta_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Append one decision event. Rows are never updated or deleted.
pub async fn insert_decision(pool: &SqlitePool, event: &DecisionEventRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO decision_events (
            guid, system_id, generation, decision_type, assumptions_json,
            user_notes, defer_until, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.guid.to_string())
    .bind(event.system_id.to_string())
    .bind(event.generation)
    .bind(&event.decision_type)
    .bind(
        event
            .assumptions
            .as_ref()
            .map(|v| v.to_string()),
    )
    .bind(&event.user_notes)
    .bind(event.defer_until.map(|d| d.to_string()))
    .bind(event.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load decision history for one system, newest first
pub async fn load_decisions(pool: &SqlitePool, system_id: Uuid) -> Result<Vec<DecisionEventRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, system_id, generation, decision_type, assumptions_json,
               user_notes, defer_until, created_at
        FROM decision_events
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
            let assumptions_json: Option<String> = row.get("assumptions_json");
            let defer_until: Option<String> = row.get("defer_until");
            let created_at: String = row.get("created_at");

            Ok(DecisionEventRecord {
                guid: parse_uuid(&guid_str, "decision_events.guid")?,
                system_id: parse_uuid(&system_id_str, "decision_events.system_id")?,
                generation: row.get("generation"),
                decision_type: row.get("decision_type"),
                assumptions: assumptions_json
                    .as_deref()
                    .map(serde_json::from_str)
                    .transpose()
                    .map_err(|e| Error::CorruptRecord(format!("invalid assumptions_json: {e}")))?,
                user_notes: row.get("user_notes"),
                defer_until: defer_until
                    .as_deref()
                    .map(|d| {
                        d.parse()
                            .map_err(|_| Error::CorruptRecord(format!("invalid defer_until '{d}'")))
                    })
                    .transpose()?,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}
