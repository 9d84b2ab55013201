//! Application state shared across all route handlers.
//!
//! AppState holds references to the services handlers need. It is passed
//! to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use roster_agent::QueryAgent;
use roster_core::config::RosterConfig;
use roster_storage::{Database, QueryService};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<RosterConfig>,
    /// SQLite database for direct read endpoints.
    pub database: Arc<Database>,
    /// The natural-language query agent.
    pub agent: Arc<QueryAgent>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(config: RosterConfig, database: Arc<Database>, agent: Arc<QueryAgent>) -> Self {
        Self {
            config: Arc::new(config),
            database,
            agent,
            start_time: Instant::now(),
        }
    }

    /// A query service over the state's database, using configured caps.
    pub fn query_service(&self) -> QueryService {
        QueryService::new(Arc::clone(&self.database), self.config.agent.max_result_rows)
    }
}
