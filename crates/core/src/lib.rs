//! Pure domain logic for the studyflow timer engine.
//!
//! Zero internal deps: everything here is usable from the API layer, the
//! repositories, background consumers, and tests without pulling in sqlx
//! or axum. All persistence and clock reads belong to the callers; these
//! modules only decide.

pub mod ad_hoc;
pub mod advisor;
pub mod concurrency;
pub mod device;
pub mod elapsed;
pub mod error;
pub mod progress;
pub mod rewards;
pub mod state_machine;
pub mod types;
