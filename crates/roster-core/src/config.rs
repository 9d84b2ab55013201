use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, RosterError};

/// Top-level configuration for the Roster application.
///
/// Loaded from `~/.roster/config.toml` by default. Each section corresponds
/// to a subsystem or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub etl: EtlConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl RosterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RosterConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RosterError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.roster/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the API server to.
    pub bind: String,
    /// API server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Ollama connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama HTTP API.
    pub base_url: String,
    /// Model name, e.g. "gemma3:12b".
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Startup readiness probe attempts before proceeding anyway.
    pub startup_retries: u32,
    /// Delay between readiness probe attempts, in seconds.
    pub startup_retry_delay_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3:12b".to_string(),
            temperature: 0.5,
            startup_retries: 3,
            startup_retry_delay_secs: 5,
        }
    }
}

/// Scheduled data refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Whether the background refresh runs at all.
    pub enabled: bool,
    /// Wall-clock interval between refreshes, in seconds.
    pub interval_secs: u64,
    /// Minimum number of records per refresh.
    pub min_records: u32,
    /// Maximum number of records per refresh.
    pub max_records: u32,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            min_records: 10,
            max_records: 100,
        }
    }
}

/// Query agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Whether the agent answers queries at all.
    pub enabled: bool,
    /// Maximum reasoning iterations per question.
    pub max_iterations: u32,
    /// Maximum question length in characters.
    pub max_query_length: usize,
    /// Number of recent turns kept per conversation.
    pub context_turns: usize,
    /// Conversation expiry in minutes.
    pub session_timeout_minutes: u32,
    /// Row cap applied to agent-issued queries.
    pub max_result_rows: usize,
    /// Sample rows included when describing a table's schema.
    pub sample_rows_in_schema: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 8,
            max_query_length: 2000,
            context_turns: 10,
            session_timeout_minutes: 30,
            max_result_rows: 50,
            sample_rows_in_schema: 2,
        }
    }
}
