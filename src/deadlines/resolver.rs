// src/deadlines/resolver.rs
//! Per-source resolution: fetch → extract → normalize, with fallback substitution.

use metrics::counter;
use thiserror::Error;

use crate::deadlines::extract::{self, ExtractError};
use crate::deadlines::fetcher::{FetchError, PageFetcher};
use crate::deadlines::types::{DeadlineRecord, SourceDescriptor};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Live date for `source`, or the reason it could not be obtained.
pub async fn try_resolve(
    fetcher: &dyn PageFetcher,
    source: &SourceDescriptor,
) -> Result<String, ResolveError> {
    let body = fetcher.fetch(&source.endpoint_url).await?;
    let date = extract::extract_date(&body, &source.policy)?;
    Ok(date)
}

/// Always yields a record. Failures are logged and replaced by the source's fallback.
pub async fn resolve(fetcher: &dyn PageFetcher, source: &SourceDescriptor) -> DeadlineRecord {
    match try_resolve(fetcher, source).await {
        Ok(date) => {
            if !extract::validate_calendar(&date) {
                tracing::warn!(
                    source_id = source.id,
                    source_name = %source.name,
                    %date,
                    "extracted date is not a valid calendar date; passing through"
                );
            }
            tracing::debug!(source_id = source.id, source_name = %source.name, %date, "live deadline");
            counter!("deadline_records_total", "provenance" => "official").increment(1);
            source.live_record(date)
        }
        Err(e) => {
            match &e {
                ResolveError::Fetch(_) => {
                    counter!("deadline_fetch_failures_total").increment(1);
                }
                ResolveError::Extract(_) => {
                    counter!("deadline_extract_failures_total").increment(1);
                }
            }
            tracing::warn!(
                source_id = source.id,
                source_name = %source.name,
                url = %source.endpoint_url,
                error = %e,
                "using fallback deadline"
            );
            counter!("deadline_records_total", "provenance" => "estimated").increment(1);
            source.fallback.clone()
        }
    }
}
