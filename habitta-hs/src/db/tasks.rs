//! Maintenance task persistence

use super::parse_uuid;
use chrono::Utc;
use habitta_common::db::models::TaskRecord;
use habitta_common::{Error, Result};
use habitta_engine::alerts::{TaskCategory, TaskPriority};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a new task (status starts as pending)
pub async fn insert_task(pool: &SqlitePool, task: &TaskRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tasks (guid, home_id, title, category, priority, status, due_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(task.guid.to_string())
    .bind(task.home_id.to_string())
    .bind(&task.title)
    .bind(task.category.as_db_str())
    .bind(task.priority.as_db_str())
    .bind(&task.status)
    .bind(task.due_date.map(|d| d.to_string()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all pending tasks for a home
pub async fn load_pending_tasks(pool: &SqlitePool, home_id: Uuid) -> Result<Vec<TaskRecord>> {
    load_tasks_with_status(pool, home_id, Some("pending")).await
}

/// Load tasks for a home, optionally filtered by status
pub async fn load_tasks_with_status(
    pool: &SqlitePool,
    home_id: Uuid,
    status: Option<&str>,
) -> Result<Vec<TaskRecord>> {
    let rows = match status {
        Some(status) => {
            sqlx::query(
                r#"
                SELECT guid, home_id, title, category, priority, status, due_date
                FROM tasks WHERE home_id = ? AND status = ? ORDER BY due_date
                "#,
            )
            .bind(home_id.to_string())
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT guid, home_id, title, category, priority, status, due_date
                FROM tasks WHERE home_id = ? ORDER BY due_date
                "#,
            )
            .bind(home_id.to_string())
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter()
        .map(|row| {
            let guid_str: String = row.get("guid");
            let home_id_str: String = row.get("home_id");
            let category_str: String = row.get("category");
            let priority_str: String = row.get("priority");
            let due_date: Option<String> = row.get("due_date");

            Ok(TaskRecord {
                guid: parse_uuid(&guid_str, "tasks.guid")?,
                home_id: parse_uuid(&home_id_str, "tasks.home_id")?,
                title: row.get("title"),
                category: TaskCategory::from_str(&category_str).ok_or_else(|| {
                    Error::CorruptRecord(format!("unknown task category '{category_str}'"))
                })?,
                priority: TaskPriority::from_str(&priority_str).ok_or_else(|| {
                    Error::CorruptRecord(format!("unknown task priority '{priority_str}'"))
                })?,
                status: row.get("status"),
                due_date: due_date
                    .as_deref()
                    .map(|d| {
                        d.parse()
                            .map_err(|_| Error::CorruptRecord(format!("invalid due_date '{d}'")))
                    })
                    .transpose()?,
            })
        })
        .collect()
}

/// Mark a task complete. Returns false when the task doesn't exist.
pub async fn complete_task(pool: &SqlitePool, task_id: Uuid) -> Result<bool> {
    let result = sqlx::query("UPDATE tasks SET status = 'completed', updated_at = ? WHERE guid = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(task_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
