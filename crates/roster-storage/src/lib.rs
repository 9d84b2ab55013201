//! Roster storage crate - SQLite persistence for the employee table.
//!
//! Provides a WAL-mode SQLite database with migrations, the employee
//! repository used by the ETL pipeline and API, and the guarded read-only
//! query service backing the agent's SQL tools.

pub mod db;
pub mod migrations;
pub mod queries;
pub mod repository;

pub use db::Database;
pub use queries::{DbStats, QueryOutput, QueryService};
pub use repository::EmployeeRepository;
