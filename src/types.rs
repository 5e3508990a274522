//! Common types used throughout feedpoll
//!
//! This module contains shared type definitions, type aliases,
//! and the record shape relayed by the paginator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// The records belonging to one page, in the order the remote returned them
pub type RecordSet = Vec<Record>;

// ============================================================================
// Records
// ============================================================================

/// Identifier of a record
///
/// Contract views return numeric ids, other read APIs may use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier
    Number(u64),
    /// String identifier
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// A single record as returned by the read API
///
/// Only `id` has meaning to the paginator. Everything else is payload for
/// whoever renders the page; unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier
    pub id: RecordId,
    /// Text body
    #[serde(default)]
    pub content: String,
    /// Creation time in nanoseconds since the Unix epoch
    #[serde(default, rename = "create_at")]
    pub created_at_ns: u64,
    /// Remaining payload fields (parent_id, user_id, rating, ...)
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Record {
    /// Create a record with an id and content
    pub fn new(id: impl Into<RecordId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at_ns: 0,
            extra: JsonObject::new(),
        }
    }

    /// Set the creation timestamp (nanoseconds)
    #[must_use]
    pub fn with_created_at_ns(mut self, nanos: u64) -> Self {
        self.created_at_ns = nanos;
        self
    }

    /// Creation time as a UTC timestamp
    ///
    /// Timestamps past what chrono can represent are pinned to its latest
    /// nanosecond instant (2262-04-11).
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(i64::try_from(self.created_at_ns).unwrap_or(i64::MAX))
    }

    /// Look up a payload field by name
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.extra.get(name)
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
