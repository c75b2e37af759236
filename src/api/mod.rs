//! HTTP API.
//!
//! Exposes the service modules as JSON endpoints under `/api/`. Public
//! routes (health, register, login, refresh) skip authentication; every
//! other route goes through the bearer token middleware.

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
