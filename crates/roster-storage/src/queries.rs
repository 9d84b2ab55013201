//! Read-only query access for the agent's SQL tools.
//!
//! The agent executes model-written SQL, so everything here is guarded:
//! a statement must be a single SELECT (checked both textually and via
//! sqlite's own readonly flag), and result sets are capped. Guard
//! violations come back as errors whose text is safe to show the model.

use std::sync::Arc;

use roster_core::error::RosterError;

use crate::db::Database;

/// Result of a guarded query: column names plus stringified rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// True when the row cap cut the result set short.
    pub truncated: bool,
}

impl QueryOutput {
    /// Render as a compact table for use as a tool observation.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_string();
        }
        let mut out = self.columns.join(" | ");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        if self.truncated {
            out.push_str("(result truncated)\n");
        }
        out
    }
}

/// Database statistics for the stats endpoint.
#[derive(Debug, Clone)]
pub struct DbStats {
    pub employee_count: u64,
    pub db_size_bytes: u64,
}

/// Guarded read-only query service.
pub struct QueryService {
    db: Arc<Database>,
    max_rows: usize,
}

impl QueryService {
    pub fn new(db: Arc<Database>, max_rows: usize) -> Self {
        Self { db, max_rows }
    }

    /// Names of all user tables.
    pub fn list_tables(&self) -> Result<Vec<String>, RosterError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     ORDER BY name",
                )
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| RosterError::Storage(e.to_string()))
        })
    }

    /// The CREATE statement for a table plus up to `sample_rows` rows.
    ///
    /// Sample rows help the model understand value formats, mirroring the
    /// schema-with-samples description the agent prompt relies on.
    pub fn table_schema(&self, table: &str, sample_rows: usize) -> Result<String, RosterError> {
        if !is_identifier(table) {
            return Err(RosterError::Storage(format!(
                "Invalid table name: '{}'",
                table
            )));
        }

        self.db.with_conn(|conn| {
            use rusqlite::OptionalExtension;

            let create_sql: Option<String> = conn
                .query_row(
                    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    rusqlite::params![table],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            let create_sql = create_sql
                .ok_or_else(|| RosterError::Storage(format!("Table not found: '{}'", table)))?;

            let mut out = create_sql;
            if sample_rows > 0 {
                // Identifier was validated above, so interpolation is safe.
                let sample = run_select(
                    conn,
                    &format!("SELECT * FROM \"{}\" LIMIT {}", table, sample_rows),
                    sample_rows,
                )?;
                out.push_str("\n\nSample rows:\n");
                out.push_str(&sample.render());
            }
            Ok(out)
        })
    }

    /// Execute a single read-only SELECT statement.
    ///
    /// Rejects anything that is not one SELECT (or WITH ... SELECT)
    /// statement. Result sets are capped at `max_rows`.
    pub fn execute_readonly(&self, sql: &str) -> Result<QueryOutput, RosterError> {
        let sql = normalize_statement(sql)?;
        self.db.with_conn(|conn| run_select(conn, &sql, self.max_rows))
    }

    /// Row count and on-disk size.
    pub fn stats(&self) -> Result<DbStats, RosterError> {
        self.db.with_conn(|conn| {
            let employee_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            let page_count: i64 = conn
                .query_row("PRAGMA page_count", [], |row| row.get(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;
            let page_size: i64 = conn
                .query_row("PRAGMA page_size", [], |row| row.get(0))
                .map_err(|e| RosterError::Storage(e.to_string()))?;

            Ok(DbStats {
                employee_count: employee_count as u64,
                db_size_bytes: (page_count * page_size) as u64,
            })
        })
    }
}

/// Prepare and run a SELECT, verifying sqlite agrees it is read-only.
fn run_select(
    conn: &rusqlite::Connection,
    sql: &str,
    max_rows: usize,
) -> Result<QueryOutput, RosterError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| RosterError::Storage(format!("SQL error: {}", e)))?;

    // Textual checks can be fooled; sqlite's own flag cannot.
    if !stmt.readonly() {
        return Err(RosterError::Storage(
            "Only read-only SELECT statements are allowed".to_string(),
        ));
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| RosterError::Storage(format!("SQL error: {}", e)))?;

    let mut out_rows = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows
        .next()
        .map_err(|e| RosterError::Storage(format!("SQL error: {}", e)))?
    {
        if out_rows.len() >= max_rows {
            truncated = true;
            break;
        }
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let value = row
                .get_ref(idx)
                .map_err(|e| RosterError::Storage(e.to_string()))?;
            values.push(value_to_string(value));
        }
        out_rows.push(values);
    }

    Ok(QueryOutput {
        columns,
        rows: out_rows,
        truncated,
    })
}

/// Strip a trailing semicolon and verify the statement is a lone SELECT.
fn normalize_statement(sql: &str) -> Result<String, RosterError> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    if trimmed.is_empty() {
        return Err(RosterError::Storage("Empty SQL statement".to_string()));
    }
    if trimmed.contains(';') {
        return Err(RosterError::Storage(
            "Multiple SQL statements are not allowed".to_string(),
        ));
    }
    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if first_word != "select" && first_word != "with" {
        return Err(RosterError::Storage(
            "Only SELECT statements are allowed".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn value_to_string(value: rusqlite::types::ValueRef<'_>) -> String {
    use rusqlite::types::ValueRef;

    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service() -> QueryService {
        let db = Arc::new(Database::in_memory().unwrap());
        db.with_conn(|conn| {
            conn.execute_batch(
                "INSERT INTO employees (id, name, department, position, salary, email, phone,
                                        address, hire_date, date_of_birth, ssn, username)
                 VALUES (1, 'Jane Smith', 'Engineering', 'Engineer', 95000, 'j@x.com', '555',
                         'addr', '2021-03-15', '1988-07-02', '123-45-6789', 'jsmith'),
                        (2, 'John Doe', 'Sales', 'Account Executive', 70000, 'd@x.com', '556',
                         'addr', '2019-08-01', '1991-11-20', '987-65-4321', 'jdoe');",
            )
            .map_err(|e| RosterError::Storage(e.to_string()))
        })
        .unwrap();
        QueryService::new(db, 50)
    }

    #[test]
    fn test_list_tables_excludes_internal() {
        let service = make_service();
        let tables = service.list_tables().unwrap();
        assert!(tables.contains(&"employees".to_string()));
        assert!(!tables.iter().any(|t| t.starts_with("sqlite_")));
    }

    #[test]
    fn test_table_schema_includes_samples() {
        let service = make_service();
        let schema = service.table_schema("employees", 2).unwrap();
        assert!(schema.contains("CREATE TABLE"));
        assert!(schema.contains("Sample rows:"));
        assert!(schema.contains("Jane Smith"));
    }

    #[test]
    fn test_table_schema_unknown_table() {
        let service = make_service();
        let err = service.table_schema("payroll", 2).unwrap_err();
        assert!(err.to_string().contains("Table not found"));
    }

    #[test]
    fn test_table_schema_rejects_bad_identifier() {
        let service = make_service();
        assert!(service.table_schema("employees; DROP", 2).is_err());
    }

    #[test]
    fn test_execute_select() {
        let service = make_service();
        let out = service
            .execute_readonly("SELECT name, salary FROM employees ORDER BY salary DESC")
            .unwrap();
        assert_eq!(out.columns, vec!["name", "salary"]);
        assert_eq!(out.rows[0], vec!["Jane Smith", "95000"]);
        assert!(!out.truncated);
    }

    #[test]
    fn test_execute_accepts_trailing_semicolon() {
        let service = make_service();
        let out = service
            .execute_readonly("SELECT COUNT(*) FROM employees;")
            .unwrap();
        assert_eq!(out.rows[0][0], "2");
    }

    #[test]
    fn test_execute_accepts_cte() {
        let service = make_service();
        let out = service
            .execute_readonly(
                "WITH eng AS (SELECT * FROM employees WHERE department = 'Engineering')
                 SELECT COUNT(*) FROM eng",
            )
            .unwrap();
        assert_eq!(out.rows[0][0], "1");
    }

    #[test]
    fn test_execute_rejects_mutation() {
        let service = make_service();
        assert!(service.execute_readonly("DELETE FROM employees").is_err());
        assert!(service
            .execute_readonly("UPDATE employees SET salary = 0")
            .is_err());
        assert!(service.execute_readonly("DROP TABLE employees").is_err());
    }

    #[test]
    fn test_execute_rejects_multiple_statements() {
        let service = make_service();
        let err = service
            .execute_readonly("SELECT 1; DELETE FROM employees")
            .unwrap_err();
        assert!(err.to_string().contains("Multiple SQL statements"));
        // The table must be untouched.
        let out = service
            .execute_readonly("SELECT COUNT(*) FROM employees")
            .unwrap();
        assert_eq!(out.rows[0][0], "2");
    }

    #[test]
    fn test_execute_rejects_empty() {
        let service = make_service();
        assert!(service.execute_readonly("   ").is_err());
    }

    #[test]
    fn test_row_cap_marks_truncation() {
        let db = Arc::new(Database::in_memory().unwrap());
        db.with_conn(|conn| {
            for id in 1..=5 {
                conn.execute(
                    "INSERT INTO employees (id, name, department, position, salary, email,
                                            phone, address, hire_date, date_of_birth, ssn,
                                            username)
                     VALUES (?1, 'N', 'D', 'P', 1, 'e', 'p', 'a', '2020-01-01', '1990-01-01',
                             's', 'u')",
                    rusqlite::params![id],
                )
                .map_err(|e| RosterError::Storage(e.to_string()))?;
            }
            Ok(())
        })
        .unwrap();

        let service = QueryService::new(db, 3);
        let out = service
            .execute_readonly("SELECT id FROM employees ORDER BY id")
            .unwrap();
        assert_eq!(out.rows.len(), 3);
        assert!(out.truncated);
        assert!(out.render().contains("(result truncated)"));
    }

    #[test]
    fn test_render_empty_result() {
        let service = make_service();
        let out = service
            .execute_readonly("SELECT name FROM employees WHERE id = 99")
            .unwrap();
        assert_eq!(out.render(), "(no rows)");
    }

    #[test]
    fn test_stats() {
        let service = make_service();
        let stats = service.stats().unwrap();
        assert_eq!(stats.employee_count, 2);
        assert!(stats.db_size_bytes > 0);
    }
}
