// src/config/service.rs
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const ENV_FETCH_TIMEOUT_MS: &str = "FETCH_TIMEOUT_MS";
pub const ENV_FETCH_USER_AGENT: &str = "FETCH_USER_AGENT";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

/// Runtime knobs for outbound fetches and optional routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub fetch_timeout: Duration,
    pub user_agent: String,
    /// Exposes `/metrics` when true.
    pub debug_routes: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug_routes: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(ms) = lookup(ENV_FETCH_TIMEOUT_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            cfg.fetch_timeout = Duration::from_millis(ms);
        }

        if let Some(ua) = lookup(ENV_FETCH_USER_AGENT) {
            let ua = ua.trim();
            if !ua.is_empty() {
                cfg.user_agent = ua.to_string();
            }
        }

        cfg.debug_routes = lookup(ENV_DEBUG_ROUTES).is_some_and(|v| v.trim() == "1");
        cfg
    }
}
