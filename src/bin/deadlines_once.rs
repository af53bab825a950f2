//! Runs one aggregation against the configured sources and prints the envelope as JSON.
//! Exits non-zero when the aggregation itself fails.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use exam_deadline_aggregator::config::{service::ServiceConfig, sources};
use exam_deadline_aggregator::deadlines::fetcher::HttpFetcher;
use exam_deadline_aggregator::{aggregate, AggregationError, FailureEnvelope, ResponseEnvelope};

/// Write the envelope for `outcome` to `out`; a failure envelope is written and then returned as an error.
fn report<W: Write>(
    outcome: Result<ResponseEnvelope, AggregationError>,
    out: &mut W,
) -> anyhow::Result<()> {
    match outcome {
        Ok(envelope) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&envelope)?)?;
            Ok(())
        }
        Err(e) => {
            // Same body the HTTP 500 carries.
            let failure = FailureEnvelope::new(e.to_string());
            writeln!(out, "{}", serde_json::to_string_pretty(&failure)?)?;
            Err(anyhow::Error::new(e).context("deadline aggregation failed"))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cfg = ServiceConfig::from_env();
    let registry = sources::load_registry_default()?;
    let fetcher = HttpFetcher::from_config(&cfg).context("building http fetcher")?;

    let outcome = aggregate(Arc::new(fetcher), &registry).await;
    report(outcome, &mut std::io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_prints_envelope_and_exits_cleanly() {
        let mut buf = Vec::new();
        report(Ok(ResponseEnvelope::new(vec![])), &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["success"], true);
    }

    #[test]
    fn failure_prints_envelope_and_returns_error() {
        let mut buf = Vec::new();
        let err = report(
            Err(AggregationError::TaskFailed("task 2 panicked".into())),
            &mut buf,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("task 2 panicked"));

        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Failed to fetch deadlines");
    }
}
