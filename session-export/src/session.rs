//! Session records and the store they are looked up from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A saved session. Only the fields used for naming are typed; everything
/// else is carried through to the export untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier
    pub id: String,
    /// User-visible session name
    pub name: String,
    /// Tags in user order
    #[serde(default)]
    pub tag: Vec<String>,
    /// When the session was saved (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Remaining fields (windows, tabs, counters, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionRecord {
    /// Create a session with no extra fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tag: Vec<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tag,
            date,
            extra: Map::new(),
        }
    }
}

/// Source of sessions to export
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up one session by id, or every session when `selector` is `None`.
    ///
    /// `None` or an empty list means there is nothing to export.
    async fn lookup_sessions(&self, selector: Option<&str>) -> Option<Vec<SessionRecord>>;
}

/// Session store backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Vec<SessionRecord>,
}

impl MemorySessionStore {
    pub fn new(sessions: Vec<SessionRecord>) -> Self {
        Self { sessions }
    }

    /// Parse a JSON array of sessions
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn lookup_sessions(&self, selector: Option<&str>) -> Option<Vec<SessionRecord>> {
        match selector {
            None if self.sessions.is_empty() => None,
            None => Some(self.sessions.clone()),
            Some(id) => self
                .sessions
                .iter()
                .find(|s| s.id == id)
                .map(|s| vec![s.clone()]),
        }
    }
}
