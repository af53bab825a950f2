// src/config/sources.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::deadlines::extract::{DateOrder, ExtractionPolicy, DEFAULT_PATTERN, DEFAULT_SELECTOR};
use crate::deadlines::registry::SourceRegistry;
use crate::deadlines::types::SourceDescriptor;

pub const ENV_SOURCES_PATH: &str = "DEADLINE_SOURCES_PATH";

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    id: u32,
    name: String,
    category: String,
    endpoint_url: String,
    official_label: String,
    fallback_date: String,
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    date_order: Option<DateOrder>,
}

impl SourceEntry {
    fn into_descriptor(self) -> Result<SourceDescriptor> {
        let id = self.id;
        let custom = self.selector.is_some() || self.pattern.is_some() || self.date_order.is_some();
        let mut d = SourceDescriptor::new(
            self.id,
            self.name,
            self.category,
            self.endpoint_url,
            self.official_label,
            self.fallback_date,
        );
        if custom {
            let policy = ExtractionPolicy::new(
                self.selector.as_deref().unwrap_or(DEFAULT_SELECTOR),
                self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN),
                self.date_order.unwrap_or_default(),
            )
            .with_context(|| format!("extraction policy for source {id}"))?;
            d = d.with_policy(policy);
        }
        Ok(d)
    }
}

/// Load a registry from an explicit path. Supports TOML or JSON formats.
pub fn load_registry_from(path: &Path) -> Result<SourceRegistry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_registry(&content, ext.as_str())
        .with_context(|| format!("parsing sources from {}", path.display()))
}

/// Load the registry using env var + fallbacks:
/// 1) $DEADLINE_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in reference registry
pub fn load_registry_default() -> Result<SourceRegistry> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_registry_from(&pb);
        }
        return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
    }
    load_registry_in(Path::new("."))
}

/// File fallbacks relative to `base`, then the reference registry.
pub fn load_registry_in(base: &Path) -> Result<SourceRegistry> {
    for rel in ["config/sources.toml", "config/sources.json"] {
        let p = base.join(rel);
        if p.exists() {
            return load_registry_from(&p);
        }
    }
    tracing::info!("no sources file found; using reference registry");
    Ok(SourceRegistry::reference())
}

fn parse_registry(s: &str, hint_ext: &str) -> Result<SourceRegistry> {
    let file: SourcesFile = match hint_ext {
        "json" => serde_json::from_str(s)?,
        "toml" => toml::from_str(s)?,
        // Unknown extension: JSON documents start with `{`.
        _ if s.trim_start().starts_with('{') => serde_json::from_str(s)?,
        _ => toml::from_str(s)?,
    };
    let descriptors = file
        .sources
        .into_iter()
        .map(SourceEntry::into_descriptor)
        .collect::<Result<Vec<_>>>()?;
    Ok(SourceRegistry::new(descriptors)?)
}
