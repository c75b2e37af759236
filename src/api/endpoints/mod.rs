//! API endpoint handlers.
//!
//! Each module corresponds to one resource. Handlers check the caller's
//! role, then hand the work to the service modules on the blocking pool.

pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod health;
pub mod medical_records;
pub mod medical_summaries;
pub mod patients;
pub mod users;
