//! Error types for the query agent.

use roster_core::error::RosterError;

/// Errors from the query agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent is disabled")]
    Disabled,
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("query exceeds maximum length of {0} characters")]
    QueryTooLong(usize),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RosterError> for AgentError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Llm(msg) => AgentError::Llm(msg),
            other => AgentError::Storage(other.to_string()),
        }
    }
}
