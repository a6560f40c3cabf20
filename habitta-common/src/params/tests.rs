//! GlobalParams unit tests
//!
//! Tests share the process-wide PARAMS singleton state when they use
//! it, so every test here builds its own GlobalParams instance.

use super::GlobalParams;
use sqlx::sqlite::SqlitePoolOptions;

#[test]
fn test_defaults() {
    let params = GlobalParams::default();
    assert_eq!(*params.climate_zone.read().unwrap(), "hot_humid");
    assert_eq!(*params.climate_lifespan_multiplier.read().unwrap(), 0.85);
    assert_eq!(*params.meaningful_delta_threshold.read().unwrap(), 0.05);
    assert_eq!(*params.alert_score_floor.read().unwrap(), 20);
}

#[test]
fn test_setters_validate_range() {
    let params = GlobalParams::default();

    assert!(params.set_climate_lifespan_multiplier(0.9).is_ok());
    assert_eq!(*params.climate_lifespan_multiplier.read().unwrap(), 0.9);

    // Out of range: rejected, value unchanged
    assert!(params.set_climate_lifespan_multiplier(2.0).is_err());
    assert_eq!(*params.climate_lifespan_multiplier.read().unwrap(), 0.9);

    assert!(params.set_alert_score_floor(101).is_err());
    assert!(params.set_climate_zone("").is_err());
}

#[test]
fn test_metadata_covers_every_parameter() {
    // One registry entry per GlobalParams field
    assert_eq!(GlobalParams::metadata().len(), 10);
    for meta in GlobalParams::metadata() {
        assert!((meta.validator)(meta.default_value).is_ok(), "{} default fails its own validator", meta.key);
    }
}

#[test]
fn test_climate_profile_reflects_params() {
    let params = GlobalParams::default();
    params.set_climate_lifespan_multiplier(0.95).unwrap();
    params.set_maintenance_lifespan_bonus(1.2).unwrap();

    let profile = params.climate_profile();
    assert_eq!(profile.climate_multiplier, 0.95);
    assert_eq!(profile.maintenance_bonus, 1.2);
    assert_eq!(profile.zone, "hot_humid");
}

#[test]
fn test_alert_config_reflects_params() {
    let params = GlobalParams::default();
    params.set_alert_score_floor(30).unwrap();
    let config = params.alert_config();
    assert_eq!(config.score_floor, 30);
    assert_eq!(config.urgency_weight, 0.45);
}

#[tokio::test]
async fn test_init_from_database_overrides_and_defaults() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::init::create_schema(&pool).await.unwrap();

    sqlx::query("INSERT INTO settings (key, value) VALUES ('serial_decode_threshold', '0.8')")
        .execute(&pool)
        .await
        .unwrap();
    // Out-of-range row: ignored with a warning, default kept
    sqlx::query("INSERT INTO settings (key, value) VALUES ('alert_score_floor', '500')")
        .execute(&pool)
        .await
        .unwrap();

    let params = GlobalParams::default();
    params.init_from_database(&pool).await.unwrap();

    assert_eq!(*params.serial_decode_threshold.read().unwrap(), 0.8);
    assert_eq!(*params.alert_score_floor.read().unwrap(), 20);
}

#[tokio::test]
async fn test_seed_missing_is_idempotent() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::init::create_schema(&pool).await.unwrap();

    GlobalParams::seed_missing(&pool).await.unwrap();
    GlobalParams::seed_missing(&pool).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count as usize, GlobalParams::metadata().len());
}
