//! Extract/transform/load pipeline for the employee table.
//!
//! Extract draws raw records from the generator, transform normalizes
//! them, and load swaps the table contents in one transaction. Each phase
//! logs its duration; the sample record logged after extraction carries a
//! masked SSN.

use std::collections::BTreeMap;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use roster_core::types::Employee;
use roster_storage::EmployeeRepository;

use crate::error::EtlError;
use crate::generator::EmployeeGenerator;

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct EtlReport {
    pub records_loaded: u64,
    pub previous_count: u64,
    pub departments: BTreeMap<String, u64>,
}

/// The extract/transform/load pipeline.
pub struct EtlPipeline {
    generator: EmployeeGenerator,
    repository: EmployeeRepository,
}

impl EtlPipeline {
    pub fn new(generator: EmployeeGenerator, repository: EmployeeRepository) -> Self {
        Self {
            generator,
            repository,
        }
    }

    /// Run all three phases for `count` records.
    pub fn run<R: Rng>(&self, rng: &mut R, count: u32) -> Result<EtlReport, EtlError> {
        let raw = self.extract(rng, count);
        let (records, departments) = self.transform(raw);
        let previous_count = self.load(&records)?;

        Ok(EtlReport {
            records_loaded: records.len() as u64,
            previous_count,
            departments,
        })
    }

    /// Extract phase: generate raw records.
    fn extract<R: Rng>(&self, rng: &mut R, count: u32) -> Vec<Employee> {
        let started = Instant::now();
        let raw = self.generator.generate(rng, count);

        info!(
            count = raw.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extract complete"
        );
        if let Some(sample) = raw.first() {
            debug!(
                name = %sample.name,
                department = %sample.department,
                ssn = %sample.masked_ssn(),
                "Sample record"
            );
        }
        raw
    }

    /// Transform phase: normalize records and tally departments.
    ///
    /// Title-cases names and departments and flattens multi-line addresses,
    /// so every loaded row has one consistent shape regardless of how the
    /// raw record was produced.
    fn transform(&self, raw: Vec<Employee>) -> (Vec<Employee>, BTreeMap<String, u64>) {
        let started = Instant::now();
        let mut departments: BTreeMap<String, u64> = BTreeMap::new();

        let records: Vec<Employee> = raw
            .into_iter()
            .map(|mut record| {
                record.address = record.address.replace('\n', ", ");
                record.department = title_case(&record.department);
                record.name = title_case(&record.name);
                *departments.entry(record.department.clone()).or_insert(0) += 1;
                record
            })
            .collect();

        info!(
            count = records.len(),
            departments = departments.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Transform complete"
        );
        (records, departments)
    }

    /// Load phase: swap the table contents in one transaction.
    ///
    /// Returns the row count before the refresh.
    fn load(&self, records: &[Employee]) -> Result<u64, EtlError> {
        let started = Instant::now();
        let previous_count = self.repository.replace_all(records)?;

        info!(
            loaded = records.len(),
            previous = previous_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Load complete"
        );
        Ok(previous_count)
    }
}

/// Uppercase the first letter of each whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use roster_storage::Database;

    fn make_pipeline() -> (EtlPipeline, Arc<Database>) {
        let db = Arc::new(Database::in_memory().unwrap());
        let generator = EmployeeGenerator::new(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let repository = EmployeeRepository::new(Arc::clone(&db));
        (EtlPipeline::new(generator, repository), db)
    }

    #[test]
    fn test_run_loads_requested_count() {
        let (pipeline, db) = make_pipeline();
        let mut rng = StdRng::seed_from_u64(1);

        let report = pipeline.run(&mut rng, 30).unwrap();
        assert_eq!(report.records_loaded, 30);
        assert_eq!(report.previous_count, 0);

        let repo = EmployeeRepository::new(db);
        assert_eq!(repo.count().unwrap(), 30);
    }

    #[test]
    fn test_second_run_replaces_first() {
        let (pipeline, db) = make_pipeline();
        let mut rng = StdRng::seed_from_u64(2);

        pipeline.run(&mut rng, 40).unwrap();
        let report = pipeline.run(&mut rng, 15).unwrap();

        assert_eq!(report.previous_count, 40);
        assert_eq!(report.records_loaded, 15);

        let repo = EmployeeRepository::new(db);
        assert_eq!(repo.count().unwrap(), 15);
    }

    #[test]
    fn test_loaded_addresses_are_flattened() {
        let (pipeline, db) = make_pipeline();
        let mut rng = StdRng::seed_from_u64(3);

        pipeline.run(&mut rng, 10).unwrap();

        let repo = EmployeeRepository::new(db);
        for employee in repo.list(10).unwrap() {
            assert!(!employee.address.contains('\n'));
            assert!(employee.address.contains(", "));
        }
    }

    #[test]
    fn test_department_tally_matches_rows() {
        let (pipeline, db) = make_pipeline();
        let mut rng = StdRng::seed_from_u64(4);

        let report = pipeline.run(&mut rng, 50).unwrap();
        let total: u64 = report.departments.values().sum();
        assert_eq!(total, 50);

        let repo = EmployeeRepository::new(db);
        for count in repo.department_counts().unwrap() {
            assert_eq!(report.departments.get(&count.department), Some(&count.count));
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jane smith"), "Jane Smith");
        assert_eq!(title_case("Engineering"), "Engineering");
        assert_eq!(title_case(""), "");
    }
}
