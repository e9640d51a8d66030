//! Study point awards (gamification ledger).

use sqlx::PgPool;
use studyflow_core::types::DbId;

use crate::models::points::PointsAward;

pub struct PointsRepo;

impl PointsRepo {
    const COLUMNS: &str = "id, student_id, points, reason, source_plan_id, awarded_at";

    /// Append an award. The ledger is insert-only; balances are sums.
    pub async fn award(
        pool: &PgPool,
        student_id: DbId,
        points: i32,
        reason: &str,
        source_plan_id: Option<DbId>,
    ) -> Result<PointsAward, sqlx::Error> {
        sqlx::query_as::<_, PointsAward>(&format!(
            "INSERT INTO student_points (student_id, points, reason, source_plan_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(student_id)
        .bind(points)
        .bind(reason)
        .bind(source_plan_id)
        .fetch_one(pool)
        .await
    }

    pub async fn total_for_student(pool: &PgPool, student_id: DbId) -> Result<i64, sqlx::Error> {
        let total: (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(points)::bigint FROM student_points WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(pool)
        .await?;
        Ok(total.0.unwrap_or(0))
    }
}
