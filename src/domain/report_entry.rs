use chrono::{DateTime, Utc};

use super::ranger::Ranger;

/// A timestamped free-text note in an incident's narrative.
///
/// Entries are append-only within an incident; the narrative order is
/// insertion order, not timestamp order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub author: Ranger,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl ReportEntry {
    pub fn new(author: Ranger, text: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            author,
            text: text.into(),
            created,
        }
    }
}

impl std::fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}:\n{}",
            self.author.handle,
            self.created.format("%Y-%m-%dT%H:%M:%SZ"),
            self.text
        )
    }
}
