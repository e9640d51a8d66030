//! Session repository tests: open/pause/resume accounting, heartbeats,
//! and device ownership rewrites. Timestamps are passed in explicitly, so
//! no test ever sleeps.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use studyflow_db::models::session::StartSession;
use studyflow_db::repositories::{CompletionRepo, PlanRepo, SessionRepo};

use common::{seed_content, seed_plan, seed_student};

fn start_input(plan_id: i64, student_id: i64) -> StartSession {
    StartSession {
        plan_id,
        student_id,
        device_session_id: Some("dev-a_tab_1".to_string()),
        device_info: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_opens_a_running_session(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    let session = SessionRepo::start(&pool, &start_input(plan.id, student.id), now)
        .await
        .unwrap();

    assert_eq!(session.plan_id, Some(plan.id));
    assert!(session.ended_at.is_none());
    assert!(!session.is_paused());
    // The opening instant doubles as the first heartbeat.
    assert_eq!(session.last_heartbeat, session.started_at);

    let found = SessionRepo::find_open_for_plan(&pool, plan.id, student.id)
        .await
        .unwrap()
        .expect("open session should be found");
    assert_eq!(found.id, session.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pause_and_resume_flush_the_interval_once(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;

    let now = Utc::now();
    let started = now - Duration::minutes(30);
    let paused = now - Duration::minutes(10);

    PlanRepo::mark_started(&pool, plan.id, started).await.unwrap();
    let session = SessionRepo::start(&pool, &start_input(plan.id, student.id), started)
        .await
        .unwrap();

    assert!(SessionRepo::pause(&pool, session.id, paused).await.unwrap());
    let paused_row = SessionRepo::find_open_by_id(&pool, session.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(paused_row.is_paused());

    let resumed = SessionRepo::resume_and_flush(&pool, session.id, plan.id, 600, now)
        .await
        .unwrap();
    assert!(resumed);

    let resumed_row = SessionRepo::find_open_by_id(&pool, session.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!resumed_row.is_paused());
    let resumed_at = resumed_row.resumed_at.expect("resumed_at should be set");
    // Stored timestamps are microsecond-truncated; compare loosely.
    assert!((resumed_at - now).num_milliseconds().abs() < 5);

    let plan = PlanRepo::find_for_student(&pool, plan.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.paused_duration_seconds, 600);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn two_pause_cycles_accumulate(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    PlanRepo::mark_started(&pool, plan.id, now - Duration::minutes(60))
        .await
        .unwrap();
    let session = SessionRepo::start(
        &pool,
        &start_input(plan.id, student.id),
        now - Duration::minutes(60),
    )
    .await
    .unwrap();

    SessionRepo::pause(&pool, session.id, now - Duration::minutes(50))
        .await
        .unwrap();
    SessionRepo::resume_and_flush(&pool, session.id, plan.id, 300, now - Duration::minutes(45))
        .await
        .unwrap();
    SessionRepo::pause(&pool, session.id, now - Duration::minutes(20))
        .await
        .unwrap();
    SessionRepo::resume_and_flush(&pool, session.id, plan.id, 120, now - Duration::minutes(18))
        .await
        .unwrap();

    let plan = PlanRepo::find_for_student(&pool, plan.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.paused_duration_seconds, 420);
    // resume_and_flush only touches the accumulator, never the counter.
    assert_eq!(plan.pause_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resume_of_a_closed_session_reports_false(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    let session = SessionRepo::start(&pool, &start_input(plan.id, student.id), now)
        .await
        .unwrap();
    CompletionRepo::settle_open_sessions(&pool, plan.id, student.id, now)
        .await
        .unwrap();

    let resumed = SessionRepo::resume_and_flush(&pool, session.id, plan.id, 600, now)
        .await
        .unwrap();
    assert!(!resumed);

    // The failed resume must not have flushed anything.
    let plan = PlanRepo::find_for_student(&pool, plan.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.paused_duration_seconds, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settle_flushes_an_in_flight_pause_and_closes(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    PlanRepo::mark_started(&pool, plan.id, now - Duration::minutes(20))
        .await
        .unwrap();
    let session = SessionRepo::start(
        &pool,
        &start_input(plan.id, student.id),
        now - Duration::minutes(20),
    )
    .await
    .unwrap();
    SessionRepo::pause(&pool, session.id, now - Duration::minutes(5))
        .await
        .unwrap();

    let settled = CompletionRepo::settle_open_sessions(&pool, plan.id, student.id, now)
        .await
        .unwrap();
    assert_eq!(settled.closed, 1);
    assert_eq!(settled.flushed_pause_seconds, 300);

    let plan = PlanRepo::find_for_student(&pool, plan.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.paused_duration_seconds, 300);

    assert!(SessionRepo::find_open_for_plan(&pool, plan.id, student.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settle_without_sessions_is_a_noop(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;

    let settled = CompletionRepo::settle_open_sessions(&pool, plan.id, student.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(settled.closed, 0);
    assert_eq!(settled.flushed_pause_seconds, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn heartbeat_refreshes_only_open_own_sessions(pool: PgPool) {
    let student = seed_student(&pool).await;
    let stranger = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    let session = SessionRepo::start(&pool, &start_input(plan.id, student.id), now)
        .await
        .unwrap();

    assert!(SessionRepo::refresh_heartbeat(&pool, session.id, student.id)
        .await
        .unwrap());
    assert!(!SessionRepo::refresh_heartbeat(&pool, session.id, stranger.id)
        .await
        .unwrap());

    CompletionRepo::settle_open_sessions(&pool, plan.id, student.id, now)
        .await
        .unwrap();
    assert!(!SessionRepo::refresh_heartbeat(&pool, session.id, student.id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn takeover_rewrites_device_ownership(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    let session = SessionRepo::start(&pool, &start_input(plan.id, student.id), now)
        .await
        .unwrap();

    let taken = SessionRepo::takeover(&pool, session.id, student.id, "dev-b_tab_1", Some("UA"))
        .await
        .unwrap()
        .expect("open session should be taken over");
    assert_eq!(taken.device_session_id.as_deref(), Some("dev-b_tab_1"));
    assert_eq!(taken.device_info.as_deref(), Some("UA"));
    // Pause state is untouched by ownership changes.
    assert!(!taken.is_paused());

    CompletionRepo::settle_open_sessions(&pool, plan.id, student.id, now)
        .await
        .unwrap();
    let gone = SessionRepo::takeover(&pool, session.id, student.id, "dev-c_tab_1", None)
        .await
        .unwrap();
    assert!(gone.is_none(), "closed sessions cannot be taken over");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_session_listing_excludes_the_acted_on_plan(pool: PgPool) {
    let student = seed_student(&pool).await;
    let content = seed_content(&pool, Some(100)).await;
    let plan_a = seed_plan(&pool, student.id, Some(content.id), None).await;
    let plan_b = seed_plan(&pool, student.id, Some(content.id), None).await;
    let now = Utc::now();

    let session_a = SessionRepo::start(&pool, &start_input(plan_a.id, student.id), now)
        .await
        .unwrap();
    SessionRepo::pause(&pool, session_a.id, now).await.unwrap();
    SessionRepo::start(&pool, &start_input(plan_b.id, student.id), now)
        .await
        .unwrap();

    let all = SessionRepo::list_open_for_student(&pool, student.id, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let excluding_b = SessionRepo::list_open_for_student(&pool, student.id, Some(plan_b.id))
        .await
        .unwrap();
    assert_eq!(excluding_b.len(), 1);
    assert_eq!(excluding_b[0].id, session_a.id);
}
