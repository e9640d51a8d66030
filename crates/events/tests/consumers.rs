//! Consumer integration tests: events published on the bus must land in
//! the audit table, and completion events must produce point awards.

use serde_json::json;
use sqlx::PgPool;

use studyflow_db::models::plan::CreatePlan;
use studyflow_db::models::student::{CreateStudent, Student};
use studyflow_db::repositories::{EventRepo, PlanRepo, PointsRepo, StudentRepo};
use studyflow_events::{EventBus, EventPersistence, PlatformEvent, RewardService};

async fn seed_student(pool: &PgPool) -> Student {
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

/// The points ledger references real plans, so completion events in these
/// tests point at an actual row.
async fn seed_plan_id(pool: &PgPool, student_id: i64) -> i64 {
    PlanRepo::create(
        pool,
        &CreatePlan {
            student_id,
            tenant_id: Some(1),
            plan_date: chrono::Utc::now().date_naive(),
            plan_number: None,
            content_id: None,
            sequence: None,
            planned_start_unit: None,
            planned_end_unit: None,
        },
    )
    .await
    .expect("plan seed should succeed")
    .id
}

async fn ledger_row(pool: &PgPool, student_id: i64) -> (i32, String, Option<i64>) {
    sqlx::query_as(
        "SELECT points, reason, source_plan_id FROM student_points WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await
    .expect("exactly one award expected")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn persistence_writes_each_published_event(pool: PgPool) {
    let bus = EventBus::default();
    let consumer = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new("plan.timer_started")
            .with_source("plan", 41)
            .with_actor(7)
            .with_payload(json!({"device_session_id": "dev-a_tab_1"})),
    );
    bus.publish(PlatformEvent::new("plan.timer_paused").with_source("plan", 41));

    // Dropping the bus closes the channel; the consumer drains what was
    // buffered and exits.
    drop(bus);
    consumer.await.expect("persistence loop should exit cleanly");

    let rows = EventRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(rows.len(), 2);

    // list_recent is newest-first.
    assert_eq!(rows[0].event_type, "plan.timer_paused");
    assert_eq!(rows[1].event_type, "plan.timer_started");
    assert_eq!(rows[1].source_entity_type.as_deref(), Some("plan"));
    assert_eq!(rows[1].source_entity_id, Some(41));
    assert_eq!(rows[1].actor_student_id, Some(7));
    assert_eq!(rows[1].payload["device_session_id"], "dev-a_tab_1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plan_completion_awards_time_scaled_points(pool: PgPool) {
    let student = seed_student(&pool).await;
    let plan_id = seed_plan_id(&pool, student.id).await;

    let bus = EventBus::default();
    let consumer = tokio::spawn(RewardService::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new("plan.completed")
            .with_source("plan", plan_id)
            .with_actor(student.id)
            .with_payload(json!({"net_seconds": 1800, "plan_ids": [plan_id]})),
    );
    drop(bus);
    consumer.await.expect("reward loop should exit cleanly");

    let (points, reason, source_plan_id) = ledger_row(&pool, student.id).await;
    // 10 base plus one per full ten minutes of the half hour.
    assert_eq!(points, 13);
    assert_eq!(reason, "plan_completed");
    assert_eq!(source_plan_id, Some(plan_id));

    let total = PointsRepo::total_for_student(&pool, student.id).await.unwrap();
    assert_eq!(total, 13);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ad_hoc_completion_awards_without_a_plan_reference(pool: PgPool) {
    let student = seed_student(&pool).await;

    let bus = EventBus::default();
    let consumer = tokio::spawn(RewardService::run(pool.clone(), bus.subscribe()));

    // Ad-hoc ids live in their own table; the award must not claim the id
    // as a plan reference.
    bus.publish(
        PlatformEvent::new("ad_hoc.completed")
            .with_source("ad_hoc_plan", 99)
            .with_actor(student.id)
            .with_payload(json!({"net_seconds": 600})),
    );
    drop(bus);
    consumer.await.expect("reward loop should exit cleanly");

    let (points, reason, source_plan_id) = ledger_row(&pool, student.id).await;
    assert_eq!(points, 11);
    assert_eq!(reason, "ad_hoc_completed");
    assert_eq!(source_plan_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_completion_events_award_nothing(pool: PgPool) {
    let student = seed_student(&pool).await;

    let bus = EventBus::default();
    let consumer = tokio::spawn(RewardService::run(pool.clone(), bus.subscribe()));

    for event_type in ["plan.timer_started", "plan.timer_paused", "session.taken_over"] {
        bus.publish(PlatformEvent::new(event_type).with_actor(student.id));
    }
    drop(bus);
    consumer.await.expect("reward loop should exit cleanly");

    let total = PointsRepo::total_for_student(&pool, student.id).await.unwrap();
    assert_eq!(total, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_completion_without_an_actor_is_skipped(pool: PgPool) {
    let bus = EventBus::default();
    let consumer = tokio::spawn(RewardService::run(pool.clone(), bus.subscribe()));

    bus.publish(PlatformEvent::new("plan.completed").with_payload(json!({"net_seconds": 1800})));
    drop(bus);
    consumer.await.expect("reward loop should exit cleanly");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM student_points")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn both_consumers_share_one_bus(pool: PgPool) {
    let student = seed_student(&pool).await;
    let plan_id = seed_plan_id(&pool, student.id).await;

    let bus = EventBus::default();
    let persistence = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));
    let rewards = tokio::spawn(RewardService::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new("plan.completed")
            .with_source("plan", plan_id)
            .with_actor(student.id)
            .with_payload(json!({"net_seconds": 1500})),
    );
    drop(bus);
    persistence.await.expect("persistence loop should exit cleanly");
    rewards.await.expect("reward loop should exit cleanly");

    let rows = EventRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_type, "plan.completed");

    // 25 minutes nets two ten-minute bonus points.
    let total = PointsRepo::total_for_student(&pool, student.id).await.unwrap();
    assert_eq!(total, 12);
}
