//! Study point awards driven by completion events.
//!
//! Keeping awards out of the completion transaction means a gamification
//! outage can never block a student from finishing a plan; a missed award
//! is logged instead.

use studyflow_core::rewards::points_for_completion;
use studyflow_db::repositories::PointsRepo;
use studyflow_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background consumer turning completion events into ledger rows.
pub struct RewardService;

impl RewardService {
    /// Consume events until the bus closes.
    pub async fn run(pool: DbPool, mut events: broadcast::Receiver<PlatformEvent>) {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Reward service fell behind the bus, awards skipped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            if let Err(e) = Self::handle(&pool, &event).await {
                tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    "Failed to award points"
                );
            }
        }
        tracing::info!("Event bus closed, reward service stopped");
    }

    async fn handle(pool: &DbPool, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let (reason, source_plan_id) = match event.event_type.as_str() {
            "plan.completed" => ("plan_completed", event.source_entity_id),
            // Ad-hoc ids live in their own table, so the plan reference
            // stays empty for those awards.
            "ad_hoc.completed" => ("ad_hoc_completed", None),
            _ => return Ok(()),
        };
        let Some(student_id) = event.actor_student_id else {
            return Ok(());
        };

        let net_seconds = event.payload["net_seconds"].as_i64().unwrap_or(0);
        let points = points_for_completion(net_seconds);

        let award = PointsRepo::award(pool, student_id, points, reason, source_plan_id).await?;
        tracing::info!(
            student_id,
            points = award.points,
            reason,
            "Awarded study points"
        );
        Ok(())
    }
}
