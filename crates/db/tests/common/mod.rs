//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::PgPool;

use studyflow_db::models::content::{Content, CreateContent};
use studyflow_db::models::plan::{CreatePlan, Plan};
use studyflow_db::models::student::{CreateStudent, Student};
use studyflow_db::repositories::{ContentRepo, PlanRepo, StudentRepo};

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

pub async fn seed_content(pool: &PgPool, total_units: Option<i32>) -> Content {
    ContentRepo::create(
        pool,
        &CreateContent {
            tenant_id: Some(1),
            content_type: "book".to_string(),
            title: "Algebra II Workbook".to_string(),
            subject: Some("math".to_string()),
            total_units,
        },
    )
    .await
    .expect("content seed should succeed")
}

pub async fn seed_plan(
    pool: &PgPool,
    student_id: i64,
    content_id: Option<i64>,
    plan_number: Option<i32>,
) -> Plan {
    PlanRepo::create(
        pool,
        &CreatePlan {
            student_id,
            tenant_id: Some(1),
            plan_date: today(),
            plan_number,
            content_id,
            sequence: None,
            planned_start_unit: Some(1),
            planned_end_unit: Some(26),
        },
    )
    .await
    .expect("plan seed should succeed")
}
