//! SQL tools available to the agent.
//!
//! Three tools, matching the shape of a SQL-database toolkit: list the
//! tables, describe one table's schema, run a read-only query. Tool
//! failures come back as observation strings rather than errors, so the
//! model can read what went wrong and correct its next step.

use roster_storage::QueryService;

pub const TOOL_LIST_TABLES: &str = "list_tables";
pub const TOOL_TABLE_SCHEMA: &str = "table_schema";
pub const TOOL_RUN_QUERY: &str = "run_query";

/// The toolkit the agent dispatches tool calls through.
pub struct SqlToolkit {
    queries: QueryService,
    sample_rows: usize,
}

impl SqlToolkit {
    pub fn new(queries: QueryService, sample_rows: usize) -> Self {
        Self {
            queries,
            sample_rows,
        }
    }

    /// Names of all tools, for the prompt's format contract.
    pub fn tool_names() -> Vec<&'static str> {
        vec![TOOL_LIST_TABLES, TOOL_TABLE_SCHEMA, TOOL_RUN_QUERY]
    }

    /// One-line description per tool, rendered into the prompt.
    pub fn describe() -> String {
        [
            format!(
                "{}: List the tables in the database. Input is ignored.",
                TOOL_LIST_TABLES
            ),
            format!(
                "{}: Show the schema and sample rows for a table. Input: the table name.",
                TOOL_TABLE_SCHEMA
            ),
            format!(
                "{}: Execute a read-only SQL SELECT and return the rows. Input: the SQL statement.",
                TOOL_RUN_QUERY
            ),
        ]
        .join("\n")
    }

    /// Dispatch a tool call, always producing an observation string.
    pub fn dispatch(&self, tool: &str, input: &str) -> String {
        match tool {
            TOOL_LIST_TABLES => match self.queries.list_tables() {
                Ok(tables) if tables.is_empty() => "(no tables)".to_string(),
                Ok(tables) => tables.join(", "),
                Err(e) => format!("Error: {}", e),
            },
            TOOL_TABLE_SCHEMA => {
                let table = input.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
                match self.queries.table_schema(table, self.sample_rows) {
                    Ok(schema) => schema,
                    Err(e) => format!("Error: {}", e),
                }
            }
            TOOL_RUN_QUERY => match self.queries.execute_readonly(input) {
                Ok(output) => output.render(),
                Err(e) => format!("Error: {}", e),
            },
            unknown => format!(
                "Error: unknown tool '{}'. Available tools: {}",
                unknown,
                Self::tool_names().join(", ")
            ),
        }
    }
}
