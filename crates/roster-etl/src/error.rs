//! Error types for the ETL pipeline.

use roster_core::error::RosterError;

/// Errors from the data refresh pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("record count range is empty: min {min} > max {max}")]
    EmptyRange { min: u32, max: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] RosterError),
}
