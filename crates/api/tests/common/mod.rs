//! Shared helpers for API integration tests.
//!
//! Each test binary compiles this module separately and uses a different
//! subset of it.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use studyflow_api::auth::jwt::{generate_access_token, JwtConfig};
use studyflow_api::config::ServerConfig;
use studyflow_api::router::build_app_router;
use studyflow_api::state::AppState;
use studyflow_db::models::content::{Content, CreateContent};
use studyflow_db::models::plan::{CreatePlan, Plan};
use studyflow_db::models::student::{CreateStudent, Student};
use studyflow_db::repositories::{ContentRepo, PlanRepo, StudentRepo};
use studyflow_events::EventBus;

/// Signing secret shared by [`test_config`] and [`student_token`].
pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Config every test app runs with: the dev CORS origin and a timeout
/// generous enough that no test ever races it.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The production router over a test pool, middleware included, built the
/// same way `main.rs` builds it.
///
/// The event bus has no subscribers here: publishes are dropped, which is
/// exactly the "consumers are down" degradation mode.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// Mint a student access token accepted by [`build_test_app`].
pub fn student_token(student_id: i64, tenant_id: Option<i64>) -> String {
    let config = test_config();
    generate_access_token(student_id, tenant_id, "student", &config.jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// GET a path with no auth header.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// GET a path with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body with no auth header.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body with a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("response body is not JSON: {e}"))
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub async fn seed_student(pool: &PgPool) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            tenant_id: Some(1),
            name: "Test Student".to_string(),
        },
    )
    .await
    .expect("student seed should succeed")
}

pub async fn seed_content(
    pool: &PgPool,
    subject: Option<&str>,
    total_units: Option<i32>,
) -> Content {
    ContentRepo::create(
        pool,
        &CreateContent {
            tenant_id: Some(1),
            content_type: "book".to_string(),
            title: "Algebra II Workbook".to_string(),
            subject: subject.map(str::to_string),
            total_units,
        },
    )
    .await
    .expect("content seed should succeed")
}

/// Seed a plan for today. `plan_number` groups siblings; `sequence` is the
/// advisor's priority order.
pub async fn seed_plan(
    pool: &PgPool,
    student_id: i64,
    content_id: Option<i64>,
    plan_number: Option<i32>,
    sequence: Option<i32>,
) -> Plan {
    PlanRepo::create(
        pool,
        &CreatePlan {
            student_id,
            tenant_id: Some(1),
            plan_date: today(),
            plan_number,
            content_id,
            sequence,
            planned_start_unit: Some(1),
            planned_end_unit: Some(51),
        },
    )
    .await
    .expect("plan seed should succeed")
}

// ---------------------------------------------------------------------------
// Clock rewinds
// ---------------------------------------------------------------------------
//
// Tests never sleep. To simulate elapsed time they shift the persisted
// timestamps backwards and let the server-side math read a larger gap.

/// Pretend the plan (and its sessions) started `secs` earlier.
pub async fn rewind_plan_start(pool: &PgPool, plan_id: i64, secs: f64) {
    sqlx::query(
        "UPDATE plans
         SET actual_start_time = actual_start_time - make_interval(secs => $2)
         WHERE id = $1",
    )
    .bind(plan_id)
    .bind(secs)
    .execute(pool)
    .await
    .expect("plan start rewind should succeed");
    sqlx::query(
        "UPDATE study_sessions
         SET started_at = started_at - make_interval(secs => $2)
         WHERE plan_id = $1",
    )
    .bind(plan_id)
    .bind(secs)
    .execute(pool)
    .await
    .expect("session start rewind should succeed");
}

/// Pretend the session was paused `secs` earlier than recorded.
pub async fn rewind_session_pause(pool: &PgPool, session_id: i64, secs: f64) {
    sqlx::query(
        "UPDATE study_sessions
         SET paused_at = paused_at - make_interval(secs => $2)
         WHERE id = $1",
    )
    .bind(session_id)
    .bind(secs)
    .execute(pool)
    .await
    .expect("pause rewind should succeed");
}

/// Age the session's liveness heartbeat by `secs`.
pub async fn rewind_session_heartbeat(pool: &PgPool, session_id: i64, secs: f64) {
    sqlx::query(
        "UPDATE study_sessions
         SET last_heartbeat = last_heartbeat - make_interval(secs => $2)
         WHERE id = $1",
    )
    .bind(session_id)
    .bind(secs)
    .execute(pool)
    .await
    .expect("heartbeat rewind should succeed");
}

/// Pretend the ad-hoc plan started `secs` earlier.
pub async fn rewind_ad_hoc_start(pool: &PgPool, ad_hoc_id: i64, secs: f64) {
    sqlx::query(
        "UPDATE ad_hoc_plans
         SET started_at = started_at - make_interval(secs => $2)
         WHERE id = $1",
    )
    .bind(ad_hoc_id)
    .bind(secs)
    .execute(pool)
    .await
    .expect("ad-hoc start rewind should succeed");
}
