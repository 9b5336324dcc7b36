//! Server configuration.
//!
//! Settings come from the environment (a `.env` file is honoured) with defaults for
//! everything. API keys are not read here; users enter them in the page.

use crate::error::{ConnoisseurError, Result};
use crate::llm::gateways::openai::DEFAULT_BASE_URL;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_RESEARCH_MODEL: &str = "gpt-4o";
pub const DEFAULT_REPORT_MODEL: &str = "o3-mini";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;
pub const DEFAULT_SESSION_IDLE_MINS: u64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub openai_base_url: String,
    pub serpapi_base_url: String,
    pub vision_model: String,
    pub research_model: String,
    pub report_model: String,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        };

        let bind_addr = get("ART_BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e| {
            ConnoisseurError::ConfigError(format!("ART_BIND_ADDR '{}': {}", bind_addr, e))
        })?;

        let timeout_secs = parse_number("ART_HTTP_TIMEOUT_SECS", &get("ART_HTTP_TIMEOUT_SECS", ""))?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        let max_upload_mb = parse_number("ART_MAX_UPLOAD_MB", &get("ART_MAX_UPLOAD_MB", ""))?
            .map(|mb| mb as usize)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        let idle_mins = parse_number("ART_SESSION_IDLE_MINS", &get("ART_SESSION_IDLE_MINS", ""))?
            .unwrap_or(DEFAULT_SESSION_IDLE_MINS);
        let max_sessions = parse_number("ART_MAX_SESSIONS", &get("ART_MAX_SESSIONS", ""))?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_SESSIONS);

        if timeout_secs == 0 {
            return Err(ConnoisseurError::ConfigError(
                "ART_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if idle_mins == 0 || max_sessions == 0 {
            return Err(ConnoisseurError::ConfigError(
                "ART_SESSION_IDLE_MINS and ART_MAX_SESSIONS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            openai_base_url: get("OPENAI_API_ENDPOINT", DEFAULT_BASE_URL),
            serpapi_base_url: get("SERPAPI_ENDPOINT", DEFAULT_SERPAPI_URL),
            vision_model: get("ART_VISION_MODEL", DEFAULT_VISION_MODEL),
            research_model: get("ART_RESEARCH_MODEL", DEFAULT_RESEARCH_MODEL),
            report_model: get("ART_REPORT_MODEL", DEFAULT_REPORT_MODEL),
            http_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            session_idle_timeout: Duration::from_secs(idle_mins * 60),
            max_sessions,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            serpapi_base_url: DEFAULT_SERPAPI_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            research_model: DEFAULT_RESEARCH_MODEL.to_string(),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_MINS * 60),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<Option<u64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| ConnoisseurError::ConfigError(format!("{} '{}': {}", key, raw, e)))
}
