//! Database schema migrations.
//!
//! Applies the initial schema: the employees table and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use roster_core::error::RosterError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), RosterError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| RosterError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| RosterError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: employees_schema");
    }

    Ok(())
}

/// Version 1: employees table.
fn apply_v1(conn: &Connection) -> Result<(), RosterError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS employees (
            id              INTEGER PRIMARY KEY,
            name            TEXT NOT NULL,
            department      TEXT NOT NULL,
            position        TEXT NOT NULL,
            salary          INTEGER NOT NULL,
            email           TEXT NOT NULL,
            phone           TEXT NOT NULL,
            address         TEXT NOT NULL,
            hire_date       TEXT NOT NULL,
            date_of_birth   TEXT NOT NULL,
            ssn             TEXT NOT NULL,
            username        TEXT NOT NULL,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_employees_department
            ON employees (department);

        CREATE INDEX IF NOT EXISTS idx_employees_hire_date
            ON employees (hire_date);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'employees_schema');
        ",
    )
    .map_err(|e| RosterError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_once() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        // Running again should be idempotent.
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_employees_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO employees (id, name, department, position, salary, email, phone,
                                    address, hire_date, date_of_birth, ssn, username)
             VALUES (1, 'Jane Smith', 'Engineering', 'Engineer', 90000, 'j@x.com', '555',
                     'addr', '2021-03-15', '1988-07-02', '123-45-6789', 'jsmith')",
            [],
        )
        .unwrap();

        let name: String = conn
            .query_row("SELECT name FROM employees WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, "Jane Smith");
    }

    #[test]
    fn test_employees_name_not_null() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO employees (id, department, position, salary, email, phone,
                                    address, hire_date, date_of_birth, ssn, username)
             VALUES (1, 'Engineering', 'Engineer', 90000, 'j@x.com', '555',
                     'addr', '2021-03-15', '1988-07-02', '123-45-6789', 'jsmith')",
            [],
        );
        assert!(result.is_err());
    }
}
