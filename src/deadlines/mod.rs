// src/deadlines/mod.rs
pub mod extract;
pub mod fetcher;
pub mod registry;
pub mod resolver;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use metrics::{describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::deadlines::fetcher::PageFetcher;
use crate::deadlines::registry::SourceRegistry;
use crate::deadlines::types::{DeadlineRecord, ResponseEnvelope};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "deadline_fetch_failures_total",
            "Source pages that could not be fetched (network, status, timeout)."
        );
        describe_counter!(
            "deadline_extract_failures_total",
            "Fetched pages without an announcement date."
        );
        describe_counter!(
            "deadline_records_total",
            "Records emitted, labelled by provenance."
        );
        describe_histogram!(
            "deadline_aggregate_ms",
            "Wall time of one aggregation in milliseconds."
        );
        describe_gauge!("deadline_sources_configured", "Sources in the registry.");
    });
}

/// Failure of the aggregation itself, never of a single source.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("resolver task failed: {0}")]
    TaskFailed(String),
    #[error("no record produced for source #{0}")]
    MissingRecord(usize),
}

impl From<tokio::task::JoinError> for AggregationError {
    fn from(e: tokio::task::JoinError) -> Self {
        AggregationError::TaskFailed(e.to_string())
    }
}

/// Resolve every source concurrently and assemble the envelope in declaration order.
///
/// Each source runs on its own task; completion order does not matter because
/// results are slotted by their registry index. The call returns only after every
/// task has finished.
pub async fn aggregate(
    fetcher: Arc<dyn PageFetcher>,
    registry: &SourceRegistry,
) -> Result<ResponseEnvelope, AggregationError> {
    ensure_metrics_described();
    let t0 = Instant::now();
    gauge!("deadline_sources_configured").set(registry.len() as f64);

    let mut tasks = JoinSet::new();
    for idx in 0..registry.len() {
        let fetcher = Arc::clone(&fetcher);
        let registry = registry.clone();
        tasks.spawn(async move {
            let source = &registry.as_slice()[idx];
            (idx, resolver::resolve(fetcher.as_ref(), source).await)
        });
    }

    let mut slots: Vec<Option<DeadlineRecord>> = vec![None; registry.len()];
    while let Some(joined) = tasks.join_next().await {
        // Dropping `tasks` on early return aborts whatever is still running.
        let (idx, record) = joined?;
        slots[idx] = Some(record);
    }

    let data = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.ok_or(AggregationError::MissingRecord(i)))
        .collect::<Result<Vec<_>, _>>()?;

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("deadline_aggregate_ms").record(ms);

    let estimated = data.iter().filter(|r| r.is_estimated()).count();
    tracing::info!(
        count = data.len(),
        live = data.len() - estimated,
        estimated,
        elapsed_ms = ms as u64,
        "deadlines aggregated"
    );

    Ok(ResponseEnvelope::new(data))
}

/// Registry plus fetcher, shared by request handlers.
#[derive(Clone)]
pub struct DeadlineService {
    fetcher: Arc<dyn PageFetcher>,
    registry: SourceRegistry,
}

impl DeadlineService {
    pub fn new(fetcher: Arc<dyn PageFetcher>, registry: SourceRegistry) -> Self {
        Self { fetcher, registry }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn aggregate(&self) -> Result<ResponseEnvelope, AggregationError> {
        aggregate(Arc::clone(&self.fetcher), &self.registry).await
    }
}
