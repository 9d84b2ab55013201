//! Roster ETL crate - synthetic employee generation and scheduled refresh.
//!
//! Provides the pool-based record generator, the extract/transform/load
//! pipeline that swaps the employees table atomically, and the interval
//! scheduler that re-runs the pipeline on a fixed wall-clock cadence.

pub mod error;
pub mod generator;
pub mod pipeline;
pub mod scheduler;

pub use error::EtlError;
pub use generator::EmployeeGenerator;
pub use pipeline::{EtlPipeline, EtlReport};
pub use scheduler::EtlScheduler;
