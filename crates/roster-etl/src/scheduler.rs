//! Interval scheduler for the data refresh.
//!
//! Runs the pipeline immediately on startup, then on a fixed wall-clock
//! cadence. Each cycle draws a fresh record count from the configured
//! range. Pipeline failures are logged and the previous snapshot stays
//! served until the next cycle.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;
use tracing::{error, info};

use roster_core::config::EtlConfig;

use crate::error::EtlError;
use crate::pipeline::EtlPipeline;

/// Background scheduler that re-runs the ETL pipeline on an interval.
pub struct EtlScheduler {
    pipeline: Arc<EtlPipeline>,
    config: EtlConfig,
    shutdown: Arc<Notify>,
}

impl EtlScheduler {
    /// Create a new scheduler for the given pipeline.
    pub fn new(pipeline: Arc<EtlPipeline>, config: EtlConfig) -> Self {
        Self {
            pipeline,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run one refresh cycle with a randomly drawn record count.
    pub fn run_once(&self) -> Result<(), EtlError> {
        if self.config.min_records > self.config.max_records {
            return Err(EtlError::EmptyRange {
                min: self.config.min_records,
                max: self.config.max_records,
            });
        }

        let mut rng = rand::rng();
        let count = rng.random_range(self.config.min_records..=self.config.max_records);
        info!(count, "Starting refresh cycle");

        let report = self.pipeline.run(&mut rng, count)?;
        info!(
            loaded = report.records_loaded,
            previous = report.previous_count,
            departments = report.departments.len(),
            "Refresh cycle complete"
        );
        Ok(())
    }

    /// Start the scheduler loop.
    ///
    /// Runs one cycle immediately, then every `interval_secs`. Returns on
    /// shutdown signal. A failed cycle is logged, not fatal.
    pub async fn run(&self) {
        if !self.config.enabled {
            info!("Scheduled refresh disabled in config");
            return;
        }

        info!(
            interval_secs = self.config.interval_secs,
            "Refresh scheduler started"
        );

        loop {
            if let Err(e) = self.run_once() {
                error!(error = %e, "Refresh cycle failed; keeping previous snapshot");
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(self.config.interval_secs)) => {}
                _ = self.shutdown.notified() => {
                    info!("Refresh scheduler shutting down");
                    return;
                }
            }
        }
    }

    /// Signal the scheduler to shut down gracefully.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use roster_storage::{Database, EmployeeRepository};

    use crate::generator::EmployeeGenerator;

    fn make_scheduler(config: EtlConfig) -> (EtlScheduler, Arc<Database>) {
        let db = Arc::new(Database::in_memory().unwrap());
        let generator = EmployeeGenerator::new(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let repository = EmployeeRepository::new(Arc::clone(&db));
        let pipeline = Arc::new(EtlPipeline::new(generator, repository));
        (EtlScheduler::new(pipeline, config), db)
    }

    #[test]
    fn test_run_once_loads_within_range() {
        let config = EtlConfig {
            min_records: 5,
            max_records: 8,
            ..EtlConfig::default()
        };
        let (scheduler, db) = make_scheduler(config);

        scheduler.run_once().unwrap();

        let count = EmployeeRepository::new(db).count().unwrap();
        assert!((5..=8).contains(&count), "count out of range: {}", count);
    }

    #[test]
    fn test_run_once_rejects_empty_range() {
        let config = EtlConfig {
            min_records: 10,
            max_records: 5,
            ..EtlConfig::default()
        };
        let (scheduler, _db) = make_scheduler(config);

        assert!(matches!(
            scheduler.run_once(),
            Err(EtlError::EmptyRange { min: 10, max: 5 })
        ));
    }

    #[tokio::test]
    async fn test_scheduler_shutdown() {
        let (scheduler, _db) = make_scheduler(EtlConfig::default());

        // Shutdown immediately; the stored permit makes run() return after
        // its first cycle.
        scheduler.shutdown();

        tokio::time::timeout(Duration::from_secs(5), scheduler.run())
            .await
            .expect("Scheduler should shut down within timeout");
    }

    #[tokio::test]
    async fn test_scheduler_disabled_returns_immediately() {
        let config = EtlConfig {
            enabled: false,
            ..EtlConfig::default()
        };
        let (scheduler, db) = make_scheduler(config);

        tokio::time::timeout(Duration::from_secs(1), scheduler.run())
            .await
            .expect("Disabled scheduler should return immediately");

        assert_eq!(EmployeeRepository::new(db).count().unwrap(), 0);
    }
}
