use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the exchange a header was observed on.
/// Request and response tables have independent ID spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Request, Direction::Response];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }

    /// Heading used by the human-readable listing.
    pub fn title(&self) -> &'static str {
        match self {
            Direction::Request => "Request",
            Direction::Response => "Response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names are case-insensitive; the stored form is lowercase.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Reserved capture value meaning the name was seen but the value withheld.
pub const ANONYMIZED_MARKER: &str = "(anonymized)";

/// Value carried by a capture record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObservedValue {
    Literal(String),
    /// The capture saw the name but withheld the value.
    Anonymized,
}

impl ObservedValue {
    /// Classifies a raw capture value. The reserved marker is always anonymized;
    /// a configured `marker` is recognized in addition to it.
    pub fn classify(raw: String, marker: &str) -> Self {
        if raw == ANONYMIZED_MARKER || raw == marker {
            ObservedValue::Anonymized
        } else {
            ObservedValue::Literal(raw)
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match self {
            ObservedValue::Literal(v) => Some(v),
            ObservedValue::Anonymized => None,
        }
    }

    /// Value eligible for a complete pair. Empty values are name-only.
    pub fn pair_value(&self) -> Option<&str> {
        self.literal().filter(|v| !v.is_empty())
    }
}

/// One ingested capture record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub direction: Direction,
    pub name: String,
    pub value: ObservedValue,
    pub count: u64,
}

impl Observation {
    pub fn new(direction: Direction, name: &str, value: ObservedValue, count: u64) -> Self {
        Self {
            direction,
            name: normalize_name(name),
            value,
            count,
        }
    }
}

/// Curation verdict on a candidate row. Only the exact text `keep` keeps a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Keep,
    Drop(String),
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        if raw == "keep" {
            Status::Keep
        } else {
            Status::Drop(raw)
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Keep => "keep".to_string(),
            Status::Drop(raw) => raw,
        }
    }
}

/// A ranked row of the curation document.
///
/// `value` is present for complete pairs and absent for name-only rows.
/// A missing `status` means the row was never gated and counts as kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "Header Name")]
    pub name: String,
    #[serde(rename = "Header Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "Count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Candidate {
    pub fn pair(name: impl Into<String>, value: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            count: Some(count),
            status: None,
        }
    }

    pub fn name_only(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            value: None,
            count: Some(count),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_kept(&self) -> bool {
        matches!(self.status, None | Some(Status::Keep))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Format 1: name and value fixed, one byte on the wire.
    CompletePair,
    /// Format 2: name fixed, value follows the ID.
    NameOnly,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::CompletePair => "Complete Pair",
            EntryKind::NameOnly => "Name Only",
        }
    }
}

/// A slot of the static table. An empty `value` marks a name-only entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub id: u8,
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn kind(&self) -> EntryKind {
        if self.value.is_empty() {
            EntryKind::NameOnly
        } else {
            EntryKind::CompletePair
        }
    }
}
