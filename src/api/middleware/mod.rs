//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token, injects `CallerContext`
//! 2. Audit logger: logs after auth, has the caller's user id

pub mod audit;
pub mod auth;
