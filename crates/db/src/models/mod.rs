//! Row structs and write DTOs.
//!
//! Per table: a `FromRow` + `Serialize` entity mirroring the row, and a
//! `Deserialize` create struct where the API accepts inserts.

pub mod ad_hoc;
pub mod content;
pub mod event;
pub mod plan;
pub mod points;
pub mod progress;
pub mod session;
pub mod student;
pub mod timer;
