//! Route definitions for ad-hoc plans and their simplified timers.

use axum::routing::post;
use axum::Router;

use crate::handlers::ad_hoc;
use crate::state::AppState;

/// Routes mounted at `/ad-hoc-plans`.
///
/// ```text
/// POST   /                     create_ad_hoc
/// GET    /?date=YYYY-MM-DD     list_ad_hoc
/// POST   /{id}/timer/start     start_ad_hoc
/// POST   /{id}/timer/complete  complete_ad_hoc
/// POST   /{id}/timer/cancel    cancel_ad_hoc
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(ad_hoc::create_ad_hoc).get(ad_hoc::list_ad_hoc))
        .route("/{id}/timer/start", post(ad_hoc::start_ad_hoc))
        .route("/{id}/timer/complete", post(ad_hoc::complete_ad_hoc))
        .route("/{id}/timer/cancel", post(ad_hoc::cancel_ad_hoc))
}
