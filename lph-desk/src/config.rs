//! Configuration for LPH Desk
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lph_assistant::{AssistantService, LlmError, OpenAiBackend};

use crate::desk::{AdminSeed, DeskConfig};

/// LPH Desk - back office for the LPH UNISMA halal certification body
#[derive(Parser, Debug, Clone)]
#[command(name = "lph-desk")]
#[command(about = "Role-gated back office API for LPH UNISMA")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Record store backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Memory)]
    pub store: StoreBackend,

    /// MongoDB connection URI (used with STORE_BACKEND=mongo)
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "lph_unisma")]
    pub mongodb_db: String,

    /// Base URL of an OpenAI-compatible chat completions API.
    /// Defaults to Gemini's endpoint when only an API key is given.
    #[arg(long, env = "LLM_BASE_URL")]
    pub llm_base_url: Option<String>,

    /// Model name sent to the LLM backend
    #[arg(long, env = "LLM_MODEL", default_value = "gemini-2.0-flash")]
    pub llm_model: String,

    /// API key for the LLM backend
    #[arg(long, env = "LLM_API_KEY")]
    pub llm_api_key: Option<String>,

    /// Upper bound on one assistant call, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value = "30")]
    pub llm_timeout_secs: u64,

    /// Task refresh period per session, in seconds
    #[arg(long, env = "TASK_REFRESH_SECS", default_value = "60")]
    pub task_refresh_secs: u64,

    /// Idle time after which a session expires, in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "3600")]
    pub session_ttl_secs: u64,

    /// Username of the admin created when the user directory is empty
    #[arg(long, env = "BOOTSTRAP_ADMIN_USERNAME")]
    pub bootstrap_admin_username: Option<String>,

    #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    pub bootstrap_admin_password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    Memory,
    Mongo,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.task_refresh_secs == 0 {
            return Err("TASK_REFRESH_SECS must be greater than zero".to_string());
        }

        if self.session_ttl_secs == 0 {
            return Err("SESSION_TTL_SECS must be greater than zero".to_string());
        }

        if self.llm_timeout_secs == 0 {
            return Err("LLM_TIMEOUT_SECS must be greater than zero".to_string());
        }

        match (&self.bootstrap_admin_username, &self.bootstrap_admin_password) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(
                    "BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_string(),
                )
            }
            (Some(username), Some(password)) => {
                if username.trim().is_empty() || password.is_empty() {
                    return Err("Bootstrap admin credentials must not be empty".to_string());
                }
            }
            (None, None) => {}
        }

        if self.store == StoreBackend::Mongo && self.mongodb_uri.trim().is_empty() {
            return Err("MONGODB_URI is required with STORE_BACKEND=mongo".to_string());
        }

        Ok(())
    }

    pub fn task_refresh(&self) -> Duration {
        Duration::from_secs(self.task_refresh_secs)
    }

    /// Whether an LLM backend is configured at all
    pub fn llm_configured(&self) -> bool {
        self.llm_base_url.is_some() || self.llm_api_key.is_some()
    }

    pub fn desk_config(&self) -> DeskConfig {
        let bootstrap_admin = match (&self.bootstrap_admin_username, &self.bootstrap_admin_password)
        {
            (Some(username), Some(password)) => Some(AdminSeed {
                username: username.trim().to_string(),
                password: password.clone(),
            }),
            _ => None,
        };

        DeskConfig {
            task_refresh: self.task_refresh(),
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            bootstrap_admin,
        }
    }

    /// Build the assistant from LLM settings; unconfigured when neither a
    /// base URL nor an API key is given
    pub fn assistant(&self) -> Result<AssistantService, LlmError> {
        let backend = match (&self.llm_base_url, &self.llm_api_key) {
            (None, None) => return Ok(AssistantService::unconfigured()),
            (None, Some(key)) => OpenAiBackend::gemini(&self.llm_model, key.clone())?,
            (Some(url), key) => OpenAiBackend::new(url.clone(), self.llm_model.clone(), key.clone())?,
        };

        Ok(AssistantService::new(Arc::new(backend))
            .with_timeout(Duration::from_secs(self.llm_timeout_secs)))
    }
}
