//! Parameter initialization from the settings table

use super::{GlobalParams, ParamMetadata};

impl GlobalParams {
    /// Initialize all parameters from the settings table.
    ///
    /// Called once at service startup. Error policy:
    /// - Database connection error: return Err (fail startup)
    /// - Parameter missing: warn, keep default, continue
    /// - Invalid / out of range value: warn, keep default, continue
    ///
    /// Parameters are processed independently; one bad row never blocks
    /// the rest.
    pub async fn init_from_database(&self, pool: &sqlx::SqlitePool) -> crate::Result<()> {
        use tracing::{info, warn};

        info!("Loading GlobalParams from settings table...");

        let mut loaded = 0usize;
        for meta in Self::metadata() {
            match load_string_param(pool, meta.key).await? {
                Some(value) => match (meta.validator)(&value) {
                    Ok(()) => {
                        // Validated; apply_from_string re-validates via the
                        // setter, which cannot fail here
                        if self.apply_from_string(meta.key, &value).is_ok() {
                            loaded += 1;
                        }
                    }
                    Err(e) => {
                        warn!("{}, using default ({})", e, meta.default_value);
                    }
                },
                None => {
                    warn!(
                        "{} not found in settings, using default ({})",
                        meta.key, meta.default_value
                    );
                }
            }
        }

        info!(
            "GlobalParams loaded: {} from database, {} defaults",
            loaded,
            Self::metadata().len() - loaded
        );
        Ok(())
    }

    /// Write one parameter's current default into the settings table if
    /// absent (first-run seeding)
    pub async fn seed_missing(pool: &sqlx::SqlitePool) -> crate::Result<()> {
        for meta in Self::metadata() {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(meta.key)
                .bind(meta.default_value)
                .execute(pool)
                .await?;
        }
        Ok(())
    }

}

async fn load_string_param(pool: &sqlx::SqlitePool, key: &str) -> crate::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(value,)| value))
}
