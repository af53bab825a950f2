// src/deadlines/types.rs
use serde::{Deserialize, Serialize};

use crate::deadlines::extract::ExtractionPolicy;

/// Provenance tag carried by fallback records.
pub const ESTIMATED: &str = "Estimated";

/// One output row. Always fully formed: either live-extracted or the source's fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineRecord {
    pub id: u32,
    pub name: String,
    pub date: String,     // "YYYY-MM-DD"
    pub category: String, // e.g. "Engineering", "Medical", "Law"
    pub source: String,   // "<Authority> Official" | "Estimated"
}

impl DeadlineRecord {
    pub fn is_estimated(&self) -> bool {
        self.source == ESTIMATED
    }
}

/// Static description of one exam authority page.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub endpoint_url: String,
    /// Provenance written into live records.
    pub official_label: String,
    pub fallback: DeadlineRecord,
    pub policy: ExtractionPolicy,
}

impl SourceDescriptor {
    /// Descriptor with the default extraction policy and a fallback derived from its own identity.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        category: impl Into<String>,
        endpoint_url: impl Into<String>,
        official_label: impl Into<String>,
        fallback_date: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let category = category.into();
        let fallback = DeadlineRecord {
            id,
            name: name.clone(),
            date: fallback_date.into(),
            category: category.clone(),
            source: ESTIMATED.to_string(),
        };
        Self {
            id,
            name,
            category,
            endpoint_url: endpoint_url.into(),
            official_label: official_label.into(),
            fallback,
            policy: ExtractionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Record for a successfully extracted date.
    pub fn live_record(&self, date: String) -> DeadlineRecord {
        DeadlineRecord {
            id: self.id,
            name: self.name.clone(),
            date,
            category: self.category.clone(),
            source: self.official_label.clone(),
        }
    }
}

/// Body of a successful aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub success: bool,
    pub count: usize,
    pub data: Vec<DeadlineRecord>,
    pub last_updated: String, // ISO-8601, stamped at assembly
}

impl ResponseEnvelope {
    pub fn new(data: Vec<DeadlineRecord>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            last_updated: chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Body of a top-level failure (HTTP 500).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl FailureEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: "Failed to fetch deadlines".to_string(),
            message: message.into(),
        }
    }
}
