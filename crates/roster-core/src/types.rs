//! Shared domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single employee record as held in the store.
///
/// The ETL pipeline produces these, the repository persists them, and the
/// API serves them (with the SSN masked). Dates are calendar dates without
/// a time component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub position: String,
    pub salary: i64,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub hire_date: NaiveDate,
    pub date_of_birth: NaiveDate,
    pub ssn: String,
    pub username: String,
}

impl Employee {
    /// The SSN with all digits replaced, keeping the grouping.
    ///
    /// Log lines and the employee listing endpoint must use this instead
    /// of the raw value.
    pub fn masked_ssn(&self) -> String {
        self.ssn
            .chars()
            .map(|c| if c.is_ascii_digit() { 'X' } else { c })
            .collect()
    }
}

/// Number of employees in a single department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_employee() -> Employee {
        Employee {
            id: 1,
            name: "Jane Smith".to_string(),
            department: "Engineering".to_string(),
            position: "Engineering Manager".to_string(),
            salary: 98_000,
            email: "jane.smith@example.com".to_string(),
            phone: "(555) 010-4477".to_string(),
            address: "12 Maple Street, Springfield, IL 62704".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 7, 2).unwrap(),
            ssn: "123-45-6789".to_string(),
            username: "jsmith".to_string(),
        }
    }

    #[test]
    fn test_masked_ssn_keeps_grouping() {
        let emp = sample_employee();
        assert_eq!(emp.masked_ssn(), "XXX-XX-XXXX");
    }

    #[test]
    fn test_masked_ssn_never_contains_digits() {
        let mut emp = sample_employee();
        emp.ssn = "987654321".to_string();
        assert!(!emp.masked_ssn().chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_employee_serializes_dates_as_iso() {
        let emp = sample_employee();
        let json = serde_json::to_value(&emp).unwrap();
        assert_eq!(json["hire_date"], "2021-03-15");
        assert_eq!(json["date_of_birth"], "1988-07-02");
    }
}
