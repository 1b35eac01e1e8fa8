//! Configuration module

use std::env;
use std::time::Duration;

use crate::features::whois::WhoisConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// Directory holding the exported model artifacts
    pub models_dir: String,

    /// Ollama completion endpoint base URL
    pub ollama_base_url: String,

    /// Ollama model name used for analysis
    pub ollama_model: String,

    /// Bound on a single completion call, in seconds
    pub llm_timeout_secs: u64,

    /// Whether hybrid predictions may perform WHOIS lookups
    pub whois_enabled: bool,

    /// WHOIS server queried on port 43
    pub whois_server: String,

    /// Bound on a single WHOIS lookup, in seconds
    pub whois_timeout_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://phishguard.db".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            models_dir: env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),

            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),

            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama2".to_string()),

            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),

            whois_enabled: env::var("WHOIS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),

            whois_server: env::var("WHOIS_SERVER")
                .unwrap_or_else(|_| "whois.iana.org".to_string()),

            whois_timeout_secs: env::var("WHOIS_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(5),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn whois(&self) -> WhoisConfig {
        WhoisConfig {
            enabled: self.whois_enabled,
            server: self.whois_server.clone(),
            timeout: Duration::from_secs(self.whois_timeout_secs),
        }
    }
}
