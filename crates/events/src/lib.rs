//! Event plumbing for the timer platform: the in-process [`EventBus`] and
//! [`PlatformEvent`] envelope, plus the two background consumers wired up
//! in the API binary ([`EventPersistence`] for the audit trail,
//! [`RewardService`] for study points).

pub mod bus;
pub mod persistence;
pub mod rewards;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
pub use rewards::RewardService;
