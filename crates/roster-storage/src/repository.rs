//! Repository for SQLite-backed employee persistence.
//!
//! The ETL pipeline writes through `replace_all`, which swaps the whole
//! table in one transaction so readers never observe a half-refreshed
//! snapshot. The API reads through `list` and the aggregate helpers.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Row;

use roster_core::error::RosterError;
use roster_core::types::{DepartmentCount, Employee};

use crate::db::Database;

const EMPLOYEE_COLUMNS: &str = "id, name, department, position, salary, email, phone, address,
                                hire_date, date_of_birth, ssn, username";

/// Repository for employee records.
pub struct EmployeeRepository {
    db: Arc<Database>,
}

impl EmployeeRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a single employee.
    pub fn insert(&self, employee: &Employee) -> Result<(), RosterError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO employees (id, name, department, position, salary, email, phone,
                                        address, hire_date, date_of_birth, ssn, username)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    employee.id,
                    employee.name,
                    employee.department,
                    employee.position,
                    employee.salary,
                    employee.email,
                    employee.phone,
                    employee.address,
                    employee.hire_date.to_string(),
                    employee.date_of_birth.to_string(),
                    employee.ssn,
                    employee.username,
                ],
            )
            .map_err(|e| RosterError::Storage(format!("Failed to insert employee: {}", e)))?;
            Ok(())
        })
    }

    /// Replace the entire employees table with a new snapshot.
    ///
    /// Runs DELETE plus all INSERTs in a single transaction. Readers see
    /// either the previous snapshot or the new one, never a mix.
    ///
    /// Returns the row count before the refresh.
    pub fn replace_all(&self, employees: &[Employee]) -> Result<u64, RosterError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| RosterError::Storage(format!("Failed to begin transaction: {}", e)))?;

            let previous: i64 = tx
                .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            tx.execute("DELETE FROM employees", [])
                .map_err(|e| RosterError::Storage(format!("Failed to clear employees: {}", e)))?;

            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO employees (id, name, department, position, salary, email,
                                                phone, address, hire_date, date_of_birth, ssn,
                                                username)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    )
                    .map_err(|e| RosterError::Storage(e.to_string()))?;

                for employee in employees {
                    stmt.execute(rusqlite::params![
                        employee.id,
                        employee.name,
                        employee.department,
                        employee.position,
                        employee.salary,
                        employee.email,
                        employee.phone,
                        employee.address,
                        employee.hire_date.to_string(),
                        employee.date_of_birth.to_string(),
                        employee.ssn,
                        employee.username,
                    ])
                    .map_err(|e| {
                        RosterError::Storage(format!("Failed to insert employee: {}", e))
                    })?;
                }
            }

            tx.commit()
                .map_err(|e| RosterError::Storage(format!("Failed to commit refresh: {}", e)))?;

            Ok(previous as u64)
        })
    }

    /// Find an employee by ID.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RosterError> {
        use rusqlite::OptionalExtension;

        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS),
                rusqlite::params![id],
                row_to_employee,
            )
            .optional()
            .map_err(|e| RosterError::Storage(e.to_string()))
        })
    }

    /// List employees ordered by ID, up to `limit` rows.
    pub fn list(&self, limit: u64) -> Result<Vec<Employee>, RosterError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM employees ORDER BY id LIMIT ?1",
                    EMPLOYEE_COLUMNS
                ))
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit as i64], row_to_employee)
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| RosterError::Storage(e.to_string()))
        })
    }

    /// Total number of employees.
    pub fn count(&self) -> Result<u64, RosterError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Employee counts per department, largest first.
    pub fn department_counts(&self) -> Result<Vec<DepartmentCount>, RosterError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT department, COUNT(*) FROM employees
                     GROUP BY department ORDER BY COUNT(*) DESC, department",
                )
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(DepartmentCount {
                        department: row.get(0)?,
                        count: row.get::<_, i64>(1)? as u64,
                    })
                })
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| RosterError::Storage(e.to_string()))
        })
    }
}

/// Map a SELECT row (column order as in `EMPLOYEE_COLUMNS`) to an Employee.
fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        department: row.get(2)?,
        position: row.get(3)?,
        salary: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        address: row.get(7)?,
        hire_date: date_column(row, 8)?,
        date_of_birth: date_column(row, 9)?,
        ssn: row.get(10)?,
        username: row.get(11)?,
    })
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
