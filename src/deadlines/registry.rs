// src/deadlines/registry.rs
//! Ordered, immutable set of source descriptors, built once at startup.
//!
//! Declaration order is the output order of every aggregation. Cloning a
//! [`SourceRegistry`] shares the same descriptors.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::deadlines::types::{SourceDescriptor, ESTIMATED};

static YMD_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("source id must be positive")]
    ZeroId,
    #[error("duplicate source id {0}")]
    DuplicateId(u32),
    #[error("source {id}: invalid endpoint url '{url}'")]
    BadEndpoint { id: u32, url: String },
    #[error("source {id}: fallback record does not match descriptor identity")]
    FallbackIdentity { id: u32 },
    #[error("source {id}: fallback provenance must be \"Estimated\", got '{got}'")]
    FallbackProvenance { id: u32, got: String },
    #[error("source {id}: fallback date '{date}' is not YYYY-MM-DD")]
    FallbackDate { id: u32, date: String },
    #[error("source {id}: official label must be non-empty and distinct from \"Estimated\"")]
    OfficialLabel { id: u32 },
}

#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Arc<[SourceDescriptor]>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(sources.len());
        for s in &sources {
            validate(s)?;
            if !seen.insert(s.id) {
                return Err(RegistryError::DuplicateId(s.id));
            }
        }
        Ok(Self {
            sources: sources.into(),
        })
    }

    /// Built-in four-source configuration used when no registry file is present.
    pub fn reference() -> Self {
        let seed = vec![
            SourceDescriptor::new(
                1,
                "JEE Main",
                "Engineering",
                "https://jeemain.nta.nic.in/",
                "NTA Official",
                "2026-01-21",
            ),
            SourceDescriptor::new(
                2,
                "NEET UG",
                "Medical",
                "https://neet.nta.nic.in/",
                "NTA Official",
                "2026-05-03",
            ),
            SourceDescriptor::new(
                3,
                "CLAT",
                "Law",
                "https://consortiumofnlus.ac.in/",
                "Consortium of NLUs Official",
                "2025-12-07",
            ),
            SourceDescriptor::new(
                4,
                "CUET UG",
                "General",
                "https://cuet.nta.nic.in/",
                "NTA Official",
                "2026-05-13",
            ),
        ];
        Self {
            sources: seed.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }

    pub fn get(&self, id: u32) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn as_slice(&self) -> &[SourceDescriptor] {
        &self.sources
    }
}

fn validate(s: &SourceDescriptor) -> Result<(), RegistryError> {
    if s.id == 0 {
        return Err(RegistryError::ZeroId);
    }
    let url_ok = Url::parse(&s.endpoint_url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !url_ok {
        return Err(RegistryError::BadEndpoint {
            id: s.id,
            url: s.endpoint_url.clone(),
        });
    }
    let fb = &s.fallback;
    if fb.id != s.id || fb.name != s.name || fb.category != s.category {
        return Err(RegistryError::FallbackIdentity { id: s.id });
    }
    if fb.source != ESTIMATED {
        return Err(RegistryError::FallbackProvenance {
            id: s.id,
            got: fb.source.clone(),
        });
    }
    if !YMD_SHAPE.is_match(&fb.date) {
        return Err(RegistryError::FallbackDate {
            id: s.id,
            date: fb.date.clone(),
        });
    }
    let label = s.official_label.trim();
    if label.is_empty() || label == ESTIMATED {
        return Err(RegistryError::OfficialLabel { id: s.id });
    }
    Ok(())
}
