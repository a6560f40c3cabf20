//! Integration tests for habitta-hs API endpoints
//!
//! Covers evidence submission and authority resolution, duplicate-photo
//! idempotency, install-year inference, predictions, the home outlook,
//! alerts, tasks, and decision recording, all against an in-memory
//! database through the real router.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Datelike, Duration, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt; // for `oneshot` method
use habitta_hs::{build_router, AppState};

/// Test helper: fresh in-memory database with full schema
async fn setup_app() -> axum::Router {
    // Single connection: every handle must see the same in-memory db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    habitta_common::db::init::create_schema(&pool)
        .await
        .expect("Should create schema");

    build_router(AppState::new(pool))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Create a home and return its id
async fn create_home(app: &axum::Router, year_built: Option<i64>) -> String {
    let mut body = json!({ "owner_user_id": "user-1" });
    if let Some(year) = year_built {
        body["year_built"] = json!(year);
    }
    let response = app
        .clone()
        .oneshot(post_json("/api/homes", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["home_id"].as_str().unwrap().to_string()
}

async fn submit_update(app: &axum::Router, home_id: &str, kind: &str, body: Value) -> (StatusCode, Value) {
    let uri = format!("/api/homes/{home_id}/systems/{kind}/updates");
    let response = app.clone().oneshot(post_json(&uri, body)).await.unwrap();
    let status = response.status();
    let body = extract_json(response.into_body()).await;
    (status, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "habitta-hs");
    assert!(body["version"].is_string());
}

// =============================================================================
// Evidence submission & authority resolution
// =============================================================================

#[tokio::test]
async fn test_first_evidence_creates_canonical_record() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    let (status, body) = submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "photo_analysis",
            "extracted": {
                "brand": { "value": "Carrier", "confidence": 0.9 },
                "model": { "value": "24ACC636", "confidence": 0.8 }
            },
            "photo_evidence_id": "photo-001"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], "created");
    assert_eq!(body["update_applied"], true);
    assert_eq!(body["was_overwrite"], false);
    // brand .25*.9 + model .25*.8 = 0.425 -> 0.43
    assert_eq!(body["confidence_after"], 0.43);
    assert_eq!(body["meaningful_delta"], true);

    // Record is visible with provenance
    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems")))
        .await
        .unwrap();
    let systems = extract_json(response.into_body()).await;
    assert_eq!(systems["systems"].as_array().unwrap().len(), 1);
    assert_eq!(systems["systems"][0]["kind"], "hvac");
    assert_eq!(systems["systems"][0]["fields"]["brand"], "Carrier");
    assert_eq!(
        systems["systems"][0]["provenance"]["brand"]["source"],
        "photo_analysis"
    );
}

#[tokio::test]
async fn test_higher_authority_overwrites_lower() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "photo_analysis",
            "extracted": { "brand": { "value": "Carier", "confidence": 0.6 } }
        }),
    )
    .await;

    let (_, body) = submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "user_confirmed",
            "extracted": { "brand": { "value": "Carrier", "confidence": 1.0 } }
        }),
    )
    .await;

    assert_eq!(body["update_applied"], true);
    assert_eq!(body["was_overwrite"], true);
    assert_eq!(body["fields_updated"], json!(["brand"]));
}

#[tokio::test]
async fn test_lower_authority_never_overwrites() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "user_confirmed",
            "extracted": { "brand": { "value": "Trane", "confidence": 1.0 } }
        }),
    )
    .await;

    let (_, body) = submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "permit_record",
            "extracted": { "brand": { "value": "Goodman", "confidence": 0.9 } }
        }),
    )
    .await;

    assert_eq!(body["update_applied"], false);
    assert_eq!(body["reason"], "higher_authority_exists");

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems")))
        .await
        .unwrap();
    let systems = extract_json(response.into_body()).await;
    assert_eq!(systems["systems"][0]["fields"]["brand"], "Trane");
}

#[tokio::test]
async fn test_equal_authority_conflict_is_held() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    submit_update(
        &app,
        &home_id,
        "water_heater",
        json!({
            "source": "photo_analysis",
            "extracted": { "serial": { "value": "A123", "confidence": 0.8 } },
            "photo_evidence_id": "wh-photo-1"
        }),
    )
    .await;

    let (_, body) = submit_update(
        &app,
        &home_id,
        "water_heater",
        json!({
            "source": "photo_analysis",
            "extracted": { "serial": { "value": "A128", "confidence": 0.8 } },
            "photo_evidence_id": "wh-photo-2"
        }),
    )
    .await;

    assert_eq!(body["update_applied"], false);
    assert_eq!(body["requires_confirmation"], true);
    assert_eq!(body["fields_held"][0]["field"], "serial");
    assert_eq!(body["fields_held"][0]["current_value"], "A123");
    assert_eq!(body["fields_held"][0]["incoming_value"], "A128");

    // Stored value must be unchanged
    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems")))
        .await
        .unwrap();
    let systems = extract_json(response.into_body()).await;
    assert_eq!(systems["systems"][0]["fields"]["serial"], "A123");
}

#[tokio::test]
async fn test_duplicate_photo_is_idempotent() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    let payload = json!({
        "source": "photo_analysis",
        "extracted": { "brand": { "value": "Rheem", "confidence": 0.85 } },
        "photo_evidence_id": "photo-dup"
    });

    let (_, first) = submit_update(&app, &home_id, "hvac", payload.clone()).await;
    let (_, second) = submit_update(&app, &home_id, "hvac", payload).await;

    assert_eq!(first["reason"], "created");
    assert_eq!(second["reason"], "duplicate_photo");
    assert_eq!(second["update_applied"], false);
    // No confidence change on the second call
    assert_eq!(second["confidence_before"], second["confidence_after"]);
    assert_eq!(first["confidence_after"], second["confidence_after"]);
}

#[tokio::test]
async fn test_install_year_inference_guardrail() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    // Low-confidence manufacture year: inventory buffer + estimate flag
    let (_, low) = submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "photo_analysis",
            "extracted": { "manufacture_year": { "value": "2020", "confidence": 0.5 } }
        }),
    )
    .await;
    assert_eq!(low["install_year"]["year"], 2021);
    assert_eq!(low["install_year"]["is_estimated"], true);
    assert_eq!(low["install_year"]["basis"], "manufacture_year");

    // Serial-decoded: trusted exactly
    let (_, high) = submit_update(
        &app,
        &home_id,
        "water_heater",
        json!({
            "source": "photo_analysis",
            "extracted": { "manufacture_year": { "value": "2020", "confidence": 0.9 } }
        }),
    )
    .await;
    assert_eq!(high["install_year"]["year"], 2020);
    assert_eq!(high["install_year"]["is_estimated"], false);
    assert_eq!(high["install_year"]["basis"], "serial_decode");
}

#[tokio::test]
async fn test_unknown_source_and_kind_rejected() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    let (status, _) = submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "psychic",
            "extracted": { "brand": { "value": "X", "confidence": 0.5 } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = submit_update(
        &app,
        &home_id,
        "septic",
        json!({
            "source": "photo_analysis",
            "extracted": { "brand": { "value": "X", "confidence": 0.5 } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Prediction
// =============================================================================

#[tokio::test]
async fn test_prediction_for_aged_system() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;
    let year = Utc::now().year();

    // Serial-decoded manufacture year 14 years back -> age 14,
    // adjusted lifespan 11.9 -> remaining 0, status high
    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "photo_analysis",
            "extracted": {
                "manufacture_year": { "value": (year - 14).to_string(), "confidence": 0.9 }
            }
        }),
    )
    .await;

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems/hvac/prediction")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let prediction = extract_json(response.into_body()).await;

    assert_eq!(prediction["core"]["status"], "high");
    assert_eq!(prediction["core"]["remaining_years"], 0.0);
    assert!(prediction["planning"].is_string());
    assert!(prediction["headline"].as_str().unwrap().contains("HVAC"));
}

#[tokio::test]
async fn test_prediction_missing_system_is_404() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems/roof/prediction")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Home outlook
// =============================================================================

#[tokio::test]
async fn test_outlook_insufficient_data() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/outlook")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["status"], "insufficient_data");
    assert!(body["outlook"].is_null());
    assert!(body["message"].as_str().unwrap().contains("Could not assess"));
}

#[tokio::test]
async fn test_outlook_aggregates_datable_systems() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;
    let year = Utc::now().year();

    for (kind, installed_ago) in [("hvac", 6), ("roof", 10)] {
        submit_update(
            &app,
            &home_id,
            kind,
            json!({
                "source": "photo_analysis",
                "extracted": {
                    "manufacture_year": {
                        "value": (year - installed_ago).to_string(),
                        "confidence": 0.9
                    }
                }
            }),
        )
        .await;
    }

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/outlook")))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["status"], "ok");
    let outlook = &body["outlook"];
    assert_eq!(outlook["eligible_systems"], 2);
    assert_eq!(outlook["ineligible_systems"], 0);
    assert!(outlook["display_years"].as_i64().unwrap() > 0);
    assert!(outlook["summary"].as_str().is_some());
}

// =============================================================================
// Tasks & alerts
// =============================================================================

#[tokio::test]
async fn test_alert_generation_with_floor_and_order() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;
    let today = Utc::now().date_naive();

    let tasks = [
        // Overdue safety issue: top alert
        json!({
            "title": "Fix gas leak at water heater",
            "category": "plumbing",
            "priority": "high",
            "due_date": (today - Duration::days(2)).to_string()
        }),
        // Moderate: due in 10 days
        json!({
            "title": "Service AC condenser",
            "category": "hvac",
            "priority": "high",
            "due_date": (today + Duration::days(10)).to_string()
        }),
        // Under the noise floor: no due date, low priority
        json!({
            "title": "Touch up trim paint",
            "category": "general",
            "priority": "low"
        }),
    ];
    for task in &tasks {
        let response = app
            .clone()
            .oneshot(post_json(&format!("/api/homes/{home_id}/tasks"), task.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/alerts")))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let alerts = body["alerts"].as_array().unwrap();

    // Noise-floor task suppressed
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["title"], "Fix gas leak at water heater");
    assert!(alerts[0]["score"].as_u64().unwrap() >= alerts[1]["score"].as_u64().unwrap());
}

#[tokio::test]
async fn test_completed_tasks_stop_alerting() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;
    let today = Utc::now().date_naive();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/homes/{home_id}/tasks"),
            json!({
                "title": "Replace smoke detector batteries",
                "category": "electrical",
                "priority": "high",
                "due_date": today.to_string()
            }),
        ))
        .await
        .unwrap();
    let task_id = extract_json(response.into_body()).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/tasks/{task_id}/complete"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/alerts")))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Decisions & generation lifecycle
// =============================================================================

#[tokio::test]
async fn test_replace_now_starts_new_generation() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;
    let year = Utc::now().year();

    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "user_confirmed",
            "extracted": {
                "brand": { "value": "Trane", "confidence": 1.0 },
                "manufacture_year": { "value": (year - 15).to_string(), "confidence": 0.9 }
            }
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/homes/{home_id}/systems/hvac/decisions"),
            json!({
                "decision_type": "replace_now",
                "user_notes": "Compressor failed, replaced unit",
                "new_install_year": year
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["new_generation"], 1);

    // Record reset: new install year, unverified confidence, cleared fields
    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems")))
        .await
        .unwrap();
    let systems = extract_json(response.into_body()).await;
    let record = &systems["systems"][0];
    assert_eq!(record["generation"], 1);
    assert_eq!(record["install_year"], year);
    assert_eq!(record["confidence"], 0.3);
    assert_eq!(record["fields"], json!({}));
    assert_eq!(record["provenance"], json!({}));
}

#[tokio::test]
async fn test_update_and_decision_history() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "photo_analysis",
            "extracted": { "brand": { "value": "Carrier", "confidence": 0.9 } }
        }),
    )
    .await;
    submit_update(
        &app,
        &home_id,
        "hvac",
        json!({
            "source": "permit_record",
            "extracted": { "brand": { "value": "Goodman", "confidence": 0.9 } }
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/homes/{home_id}/systems/hvac/updates")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let updates = body["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    // Both outcomes audited, including the rejected permit update
    let outcomes: Vec<&str> = updates.iter().map(|u| u["outcome"].as_str().unwrap()).collect();
    assert!(outcomes.contains(&"applied"));
    assert!(outcomes.contains(&"rejected"));

    app.clone()
        .oneshot(post_json(
            &format!("/api/homes/{home_id}/systems/hvac/decisions"),
            json!({ "decision_type": "no_action" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems/hvac/decisions")))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decisions"].as_array().unwrap().len(), 1);
    assert_eq!(body["decisions"][0]["decision_type"], "no_action");
}

#[tokio::test]
async fn test_non_replacement_decision_keeps_generation() {
    let app = setup_app().await;
    let home_id = create_home(&app, None).await;

    submit_update(
        &app,
        &home_id,
        "roof",
        json!({
            "source": "permit_record",
            "extracted": { "manufacture_year": { "value": "2015", "confidence": 0.9 } }
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/homes/{home_id}/systems/roof/decisions"),
            json!({ "decision_type": "schedule_inspection" }),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["new_generation"].is_null());

    let response = app
        .oneshot(get(&format!("/api/homes/{home_id}/systems")))
        .await
        .unwrap();
    let systems = extract_json(response.into_body()).await;
    assert_eq!(systems["systems"][0]["generation"], 0);
}
