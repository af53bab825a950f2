// src/lib.rs
// Public library surface for integration tests and the binaries.

pub mod api;
pub mod config;
pub mod deadlines;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::deadlines::types::{DeadlineRecord, FailureEnvelope, ResponseEnvelope, SourceDescriptor};
pub use crate::deadlines::{aggregate, AggregationError, DeadlineService};

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

use crate::config::service::ServiceConfig;
use crate::deadlines::fetcher::HttpFetcher;
use crate::deadlines::registry::SourceRegistry;

/// Build the full application router from environment + config files.
pub fn app() -> anyhow::Result<Router> {
    let cfg = ServiceConfig::from_env();
    let registry = config::sources::load_registry_default()?;
    app_with(&cfg, registry)
}

/// Build the router for an explicit configuration and registry.
pub fn app_with(cfg: &ServiceConfig, registry: SourceRegistry) -> anyhow::Result<Router> {
    let fetcher = HttpFetcher::from_config(cfg).context("building http fetcher")?;
    info!(
        sources = registry.len(),
        timeout_ms = cfg.fetch_timeout.as_millis() as u64,
        debug_routes = cfg.debug_routes,
        "deadline service configured"
    );

    let state = api::AppState {
        deadlines: DeadlineService::new(Arc::new(fetcher), registry),
    };
    let mut router = api::router(state);

    if cfg.debug_routes {
        let m = metrics::Metrics::install()?;
        router = router.merge(m.router());
    }
    Ok(router)
}
