//! SQL access, one repository per aggregate.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement writes open a
//! transaction internally so callers never juggle partially applied
//! state.

pub mod ad_hoc_repo;
pub mod completion_repo;
pub mod content_repo;
pub mod event_repo;
pub mod plan_repo;
pub mod points_repo;
pub mod progress_repo;
pub mod session_repo;
pub mod student_repo;

pub use ad_hoc_repo::AdHocRepo;
pub use completion_repo::CompletionRepo;
pub use content_repo::ContentRepo;
pub use event_repo::EventRepo;
pub use plan_repo::PlanRepo;
pub use points_repo::PointsRepo;
pub use progress_repo::ProgressRepo;
pub use session_repo::SessionRepo;
pub use student_repo::StudentRepo;
