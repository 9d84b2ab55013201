//! Roster API crate - axum HTTP server and route handlers.
//!
//! Provides the REST API the chat surface calls: the natural-language
//! query endpoint, the employee listing, database statistics, and the
//! health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
