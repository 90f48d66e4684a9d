//! Turning loosely shaped AI output into typed candidates.
//!
//! Entries without a usable `content` string are dropped. Unknown or
//! missing ratings become `medium`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{ItemKind, Rating};
use crate::error::{CanvasError, Result};

/// A suggested customer profile item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AiCandidate {
    Job { content: String, priority: Rating },
    Pain { content: String, severity: Rating },
    Gain { content: String, importance: Rating },
}

impl AiCandidate {
    pub fn new(kind: ItemKind, content: String, rating: Rating) -> Option<Self> {
        match kind {
            ItemKind::Job => Some(AiCandidate::Job {
                content,
                priority: rating,
            }),
            ItemKind::Pain => Some(AiCandidate::Pain {
                content,
                severity: rating,
            }),
            ItemKind::Gain => Some(AiCandidate::Gain {
                content,
                importance: rating,
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            AiCandidate::Job { .. } => ItemKind::Job,
            AiCandidate::Pain { .. } => ItemKind::Pain,
            AiCandidate::Gain { .. } => ItemKind::Gain,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            AiCandidate::Job { content, .. }
            | AiCandidate::Pain { content, .. }
            | AiCandidate::Gain { content, .. } => content,
        }
    }

    pub fn rating(&self) -> Rating {
        match self {
            AiCandidate::Job { priority, .. } => *priority,
            AiCandidate::Pain { severity, .. } => *severity,
            AiCandidate::Gain { importance, .. } => *importance,
        }
    }
}

/// Result of parsing one AI payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    pub candidates: Vec<AiCandidate>,
    /// Entries dropped for lacking usable content
    pub rejected: usize,
}

impl ParsedBatch {
    pub fn extend(&mut self, other: ParsedBatch) {
        self.candidates.extend(other.candidates);
        self.rejected += other.rejected;
    }
}

fn section_keys(kind: ItemKind) -> &'static [&'static str] {
    match kind {
        ItemKind::Job => &["customerJobs", "customer_jobs", "jobs"],
        ItemKind::Pain => &["customerPains", "customer_pains", "pains", "painPoints"],
        ItemKind::Gain => &["customerGains", "customer_gains", "gains"],
        _ => &[],
    }
}

fn find_section(map: &Map<String, Value>, kind: ItemKind) -> Option<&Value> {
    section_keys(kind).iter().find_map(|key| map.get(*key))
}

fn parse_entry(kind: ItemKind, entry: &Value) -> Option<AiCandidate> {
    let object = entry.as_object()?;
    let content = object.get("content")?.as_str()?.trim();
    if content.is_empty() {
        return None;
    }

    let rating = kind
        .rating_label()
        .and_then(|label| object.get(label))
        .or_else(|| object.get("rating"))
        .and_then(Value::as_str)
        .map(Rating::coerce)
        .unwrap_or_default();

    AiCandidate::new(kind, content.to_string(), rating)
}

/// Parse the suggestions for one profile category.
///
/// `value` is either the array itself or an object holding it under the
/// category's key (`customerJobs`, `jobs`, ...). A missing section parses as
/// an empty batch.
pub fn parse_candidates(kind: ItemKind, value: &Value) -> Result<ParsedBatch> {
    if !kind.is_profile() {
        return Err(CanvasError::InvalidItemKind(format!(
            "{} is not a customer profile category",
            kind
        )));
    }

    let section = match value {
        Value::Object(map) => find_section(map, kind),
        other => Some(other),
    };

    let entries = match section {
        None | Some(Value::Null) => return Ok(ParsedBatch::default()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(CanvasError::Validation(format!(
                "expected a list of {} suggestions, got {}",
                kind, other
            )))
        }
    };

    let mut batch = ParsedBatch::default();
    for entry in entries {
        match parse_entry(kind, entry) {
            Some(candidate) => batch.candidates.push(candidate),
            None => batch.rejected += 1,
        }
    }

    if batch.rejected > 0 {
        tracing::debug!(%kind, rejected = batch.rejected, "dropped invalid suggestions");
    }
    Ok(batch)
}

/// Parse jobs, pains and gains from one payload object.
pub fn parse_all(value: &Value) -> Result<ParsedBatch> {
    if !value.is_object() {
        return Err(CanvasError::Validation(
            "expected an object with customerJobs, customerPains or customerGains".to_string(),
        ));
    }

    let mut batch = ParsedBatch::default();
    for kind in [ItemKind::Job, ItemKind::Pain, ItemKind::Gain] {
        batch.extend(parse_candidates(kind, value)?);
    }
    Ok(batch)
}
