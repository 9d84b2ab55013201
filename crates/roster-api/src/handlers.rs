//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query parameters via axum extractors, interacts
//! with AppState services, and returns JSON responses.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roster_agent::AgentError;
use roster_core::types::Employee;
use roster_storage::EmployeeRepository;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub query: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeesParams {
    pub limit: Option<u64>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryStep {
    pub tool: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub conversation_id: String,
    pub query: String,
    pub response: String,
    pub steps: Vec<QueryStep>,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeEntry {
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
    /// Always masked on this surface.
    pub ssn: String,
    pub username: String,
}

impl From<Employee> for EmployeeEntry {
    fn from(employee: Employee) -> Self {
        let ssn = employee.masked_ssn();
        Self {
            id: employee.id,
            name: employee.name,
            department: employee.department,
            position: employee.position,
            salary: employee.salary,
            email: employee.email,
            phone: employee.phone,
            address: employee.address,
            hire_date: employee.hire_date,
            date_of_birth: employee.date_of_birth,
            ssn,
            username: employee.username,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeesResponse {
    pub employees: Vec<EmployeeEntry>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepartmentEntry {
    pub department: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub employee_count: u64,
    pub db_size_bytes: u64,
    pub departments: Vec<DepartmentEntry>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /query?query=...&conversation_id=...
///
/// Runs the agent. Validation failures are 4xx; failures inside the agent
/// (the model host going away mid-conversation, queries that never
/// converge) come back as a 200 body with `success: false`, so the chat
/// surface can render them as a normal assistant turn.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let question = params
        .query
        .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

    match state
        .agent
        .answer(&question, params.conversation_id.clone())
        .await
    {
        Ok(outcome) => Ok(Json(QueryResponse {
            conversation_id: outcome.conversation_id,
            query: question,
            response: outcome.answer,
            steps: outcome
                .steps
                .into_iter()
                .map(|s| QueryStep {
                    tool: s.tool,
                    input: s.input,
                    output: s.output,
                })
                .collect(),
            success: true,
        })),
        Err(err @ (AgentError::Disabled | AgentError::EmptyQuery | AgentError::QueryTooLong(_))) => {
            Err(err.into())
        }
        Err(err) => {
            tracing::error!(error = %err, "Agent failed to process query");
            Ok(Json(QueryResponse {
                conversation_id: params.conversation_id.unwrap_or_default(),
                query: question,
                response: format!("Error processing your query: {}", err),
                steps: vec![],
                success: false,
            }))
        }
    }
}

/// GET /employees?limit=...
pub async fn employees(
    State(state): State<AppState>,
    Query(params): Query<EmployeesParams>,
) -> Result<Json<EmployeesResponse>, ApiError> {
    let limit = params.limit.unwrap_or(50).min(500);
    let repo = EmployeeRepository::new(state.database.clone());

    let total = repo.count()?;
    let employees = repo
        .list(limit)?
        .into_iter()
        .map(EmployeeEntry::from)
        .collect();

    Ok(Json(EmployeesResponse { employees, total }))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let db_stats = state.query_service().stats()?;
    let repo = EmployeeRepository::new(state.database.clone());
    let departments = repo
        .department_counts()?
        .into_iter()
        .map(|d| DepartmentEntry {
            department: d.department,
            count: d.count,
        })
        .collect();

    Ok(Json(StatsResponse {
        employee_count: db_stats.employee_count,
        db_size_bytes: db_stats.db_size_bytes,
        departments,
    }))
}
