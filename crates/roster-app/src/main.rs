//! Roster application binary - composition root.
//!
//! Ties together all Roster crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize storage (SQLite, runs migrations)
//! 3. Probe the Ollama host, retrying a few times before proceeding
//! 4. Start the background data refresh scheduler
//! 5. Build the query agent and start the axum REST API server

use std::sync::Arc;

use clap::Parser;

use roster_agent::{CompletionClient, OllamaClient, QueryAgent, SqlToolkit};
use roster_api::AppState;
use roster_core::config::RosterConfig;
use roster_etl::{EmployeeGenerator, EtlPipeline, EtlScheduler};
use roster_storage::{Database, EmployeeRepository, QueryService};

mod cli;

/// Probe the model host until it responds or the retry budget runs out.
///
/// The server still starts when the host stays unreachable; queries will
/// surface the failure per request, and the host may come up later.
async fn wait_for_llm(client: &OllamaClient, retries: u32, delay_secs: u64) {
    for attempt in 1..=retries {
        match client.health_check().await {
            Ok(()) => {
                tracing::info!("Ollama service is running");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    retries,
                    error = %e,
                    "Ollama not reachable yet"
                );
                if attempt < retries {
                    tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
                }
            }
        }
    }
    tracing::warn!("Proceeding without confirmed Ollama connection");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Tracing. Priority: --log-level > RUST_LOG > info.
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Roster v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = RosterConfig::load_or_default(&config_file);
    config.server.port = args.resolve_port(config.server.port);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if args.no_etl {
        config.etl.enabled = false;
    }
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = cli::resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join("roster.db");
    let database = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Model host probe.
    let llm = Arc::new(OllamaClient::new(&config.llm));
    wait_for_llm(
        &llm,
        config.llm.startup_retries,
        config.llm.startup_retry_delay_secs,
    )
    .await;

    // Background data refresh.
    let generator = EmployeeGenerator::new(chrono::Local::now().date_naive());
    let repository = EmployeeRepository::new(Arc::clone(&database));
    let pipeline = Arc::new(EtlPipeline::new(generator, repository));
    let scheduler = Arc::new(EtlScheduler::new(pipeline, config.etl.clone()));

    let scheduler_task = Arc::clone(&scheduler);
    tokio::spawn(async move {
        scheduler_task.run().await;
    });

    // Query agent.
    let toolkit = SqlToolkit::new(
        QueryService::new(Arc::clone(&database), config.agent.max_result_rows),
        config.agent.sample_rows_in_schema,
    );
    let completion_client: Arc<dyn CompletionClient> = llm;
    let agent = Arc::new(QueryAgent::new(
        completion_client,
        toolkit,
        config.agent.clone(),
    ));

    // API server.
    let state = AppState::new(config, database, agent);

    tokio::select! {
        result = roster_api::start_server(state) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            scheduler.shutdown();
        }
    }

    Ok(())
}
