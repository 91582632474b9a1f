use std::collections::{BTreeMap, BTreeSet};

use super::location::Location;
use super::priority::IncidentPriority;
use super::ranger::Ranger;
use super::report_entry::ReportEntry;
use super::state::IncidentState;

/// The incident aggregate.
///
/// An incident with a `number` is persisted on the server; one without is a
/// draft that exists only client-side until a submission confirms it. The
/// data store owns the canonical copy of every persisted incident; callers
/// hold clones and route changes back through the store's update operation.
///
/// Assigned rangers are keyed by handle, which de-duplicates assignments and
/// gives deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub number: Option<u32>,
    pub types: BTreeSet<String>,
    pub rangers: BTreeMap<String, Ranger>,
    pub location: Option<Location>,
    pub summary: String,
    pub report_entries: Vec<ReportEntry>,
    pub state: IncidentState,
    pub priority: IncidentPriority,
}

impl Incident {
    /// A brand-new draft: no number, nothing assigned, state `New`,
    /// default priority.
    pub fn draft() -> Self {
        Self {
            number: None,
            types: BTreeSet::new(),
            rangers: BTreeMap::new(),
            location: None,
            summary: String::new(),
            report_entries: Vec::new(),
            state: IncidentState::New,
            priority: IncidentPriority::default(),
        }
    }

    /// True until the server has assigned a number.
    pub fn is_draft(&self) -> bool {
        self.number.is_none()
    }

    /// Assigns a ranger. Adding an already-assigned handle is a no-op; the
    /// first entry for a handle wins.
    pub fn add_ranger(&mut self, ranger: Ranger) {
        self.rangers.entry(ranger.handle.clone()).or_insert(ranger);
    }

    /// Unassigns by handle. Removing an absent handle is a no-op.
    pub fn remove_ranger(&mut self, handle: &str) {
        self.rangers.remove(handle);
    }

    /// Appends to the narrative; returns the entry's 0-based position.
    pub fn append_report_entry(&mut self, entry: ReportEntry) -> usize {
        self.report_entries.push(entry);
        self.report_entries.len() - 1
    }

    /// Comma-joined assigned handles, sorted.
    pub fn rangers_as_text(&self) -> String {
        self.rangers.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Comma-joined classification tags, sorted.
    pub fn types_as_text(&self) -> String {
        self.types.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// The full narrative, entries in append order separated by blank lines.
    pub fn narrative(&self) -> String {
        self.report_entries
            .iter()
            .map(ReportEntry::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The summary if set, otherwise the first non-empty line found in the
    /// report entries, otherwise empty.
    pub fn display_summary(&self) -> &str {
        if !self.summary.is_empty() {
            return &self.summary;
        }
        for entry in &self.report_entries {
            for line in entry.text.lines() {
                if !line.is_empty() {
                    return line;
                }
            }
        }
        ""
    }
}

impl std::fmt::Display for Incident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Incident")?;
        if let Some(number) = self.number {
            write!(f, " #{number}")?;
        }
        write!(f, " ({})", self.state)?;
        if !self.summary.is_empty() {
            write!(f, ": {}", self.summary)?;
        }
        Ok(())
    }
}
