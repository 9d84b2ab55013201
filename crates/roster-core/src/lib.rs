//! Roster core crate - configuration, error taxonomy, shared domain types.
//!
//! Everything that more than one subsystem needs lives here: the TOML
//! configuration tree, the top-level error enum, and the employee record
//! type shared by the ETL pipeline, storage layer, and API.

pub mod config;
pub mod error;
pub mod types;

pub use config::RosterConfig;
pub use error::{Result, RosterError};
pub use types::{DepartmentCount, Employee};
