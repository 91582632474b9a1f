pub mod data_store;

pub use data_store::DataStore;

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Incident, Location, Ranger};
use crate::transport::TransportError;
use crate::wire::RecordError;

/// Errors from the synchronization layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] RecordError),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Session-immutable reference data, loaded once per `load()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub incident_types: BTreeSet<String>,
    pub rangers_by_handle: BTreeMap<String, Ranger>,
    pub locations_by_name: BTreeMap<String, Location>,
}

/// Identifies an incident in notifications: either a persisted number or
/// the draft pending its first confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncidentMarker {
    Draft,
    Number(u32),
}

impl From<Option<u32>> for IncidentMarker {
    fn from(number: Option<u32>) -> Self {
        match number {
            Some(n) => Self::Number(n),
            None => Self::Draft,
        }
    }
}

impl std::fmt::Display for IncidentMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => f.write_str("(draft)"),
            Self::Number(n) => write!(f, "#{n}"),
        }
    }
}

/// Change notifications fanned out by the [`DataStore`].
///
/// Observers are invoked synchronously on the store's coordinating context,
/// in registration order. For a single incident, `will_update` always
/// precedes the matching `did_update`/`did_replace` or `operation_failed`.
/// All methods default to no-ops so observers implement only what they need.
pub trait StoreObserver: Send + Sync {
    /// The whole cache was replaced by a completed `load()`.
    fn incidents_reloaded(&self) {}

    /// A submission is about to go out for the identified incident.
    fn will_update(&self, _marker: IncidentMarker) {}

    /// The server confirmed an update; the cached copy was replaced.
    fn did_update(&self, _incident: &Incident) {}

    /// A draft was confirmed under a server-assigned number; observers
    /// keyed on the draft re-key their view.
    fn did_replace(&self, _old: IncidentMarker, _new_number: u32) {}

    /// An operation failed; the cache was left untouched.
    fn operation_failed(&self, _error: &StoreError) {}
}
