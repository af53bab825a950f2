// src/deadlines/extract.rs
//! Date extraction from announcement pages.
//!
//! The announcement region is located with a CSS selector (a `<marquee>` by default),
//! its text content is scanned with a three-group date pattern and the first match
//! is reordered into `YYYY-MM-DD`. The transform is purely textual: `32/13/2025`
//! becomes `2025-13-32`. Use [`validate_calendar`] to flag such values.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SELECTOR: &str = "marquee";
// ASCII digits only: `\d` in `regex` also matches other scripts' numerals.
pub const DEFAULT_PATTERN: &str = r"([0-9]{2})/([0-9]{2})/([0-9]{4})";

static DEFAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_PATTERN).expect("default date pattern compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("announcement region `{selector}` not found")]
    MissingRegion { selector: String },
    #[error("no date pattern match in announcement text")]
    NoDateMatch,
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid date pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Which capture group holds the day and which the month. Group 3 is always the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    DayMonthYear,
    MonthDayYear,
}

/// Where to look and what to match, per source.
#[derive(Debug, Clone)]
pub struct ExtractionPolicy {
    selector: String,
    pattern: Regex,
    order: DateOrder,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            pattern: DEFAULT_RE.clone(),
            order: DateOrder::DayMonthYear,
        }
    }
}

impl ExtractionPolicy {
    /// Build a policy, validating the selector and that the pattern has three capture groups.
    pub fn new(selector: &str, pattern: &str, order: DateOrder) -> Result<Self, ExtractError> {
        parse_selector(selector)?;
        let re = Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        // captures_len() counts the implicit whole-match group too.
        if re.captures_len() != 4 {
            return Err(ExtractError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "expected exactly three capture groups (day, month, year)".to_string(),
            });
        }
        Ok(Self {
            selector: selector.to_string(),
            pattern: re,
            order,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn order(&self) -> DateOrder {
        self.order
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text content of the first element matching the policy selector.
pub fn announcement_text(html: &str, policy: &ExtractionPolicy) -> Result<String, ExtractError> {
    let selector = parse_selector(&policy.selector)?;
    let document = Html::parse_document(html);
    let region = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractError::MissingRegion {
            selector: policy.selector.clone(),
        })?;
    Ok(region.text().collect::<String>())
}

/// First date-pattern match in `text`, reordered to `YYYY-MM-DD`.
pub fn normalize_date(text: &str, policy: &ExtractionPolicy) -> Result<String, ExtractError> {
    let caps = policy
        .pattern
        .captures(text)
        .ok_or(ExtractError::NoDateMatch)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

    let (day, month) = match policy.order {
        DateOrder::DayMonthYear => (group(1), group(2)),
        DateOrder::MonthDayYear => (group(2), group(1)),
    };
    let year = group(3);
    if day.is_empty() || month.is_empty() || year.is_empty() {
        // Optional groups in a custom pattern can match without participating.
        return Err(ExtractError::NoDateMatch);
    }
    Ok(format!("{year}-{month}-{day}"))
}

/// Full pipeline: locate region, match, normalize.
pub fn extract_date(html: &str, policy: &ExtractionPolicy) -> Result<String, ExtractError> {
    let text = announcement_text(html, policy)?;
    normalize_date(&text, policy)
}

/// True when `ymd` is a real calendar date. Diagnostic only; extraction never rejects on it.
pub fn validate_calendar(ymd: &str) -> bool {
    chrono::NaiveDate::parse_from_str(ymd, "%Y-%m-%d").is_ok()
}
