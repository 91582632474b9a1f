//! JSON wire shapes and conversion to and from the domain model.
//!
//! Incoming payloads are parsed tolerantly: unknown fields are ignored for
//! forward compatibility, but a required field that is absent or of the
//! wrong shape rejects the whole record. Timestamps are RFC 3339, Zulu.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{Incident, IncidentPriority, IncidentState, Location, Ranger, ReportEntry};
use crate::store::References;

/// A single record failed to parse or resolve against reference data.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record does not match the expected shape: {0}")]
    InvalidShape(String),
    #[error("unknown incident state: {0:?}")]
    UnknownState(String),
    #[error("unknown priority value: {0}")]
    UnknownPriority(i64),
    #[error("unknown location name: {0:?}")]
    UnknownLocation(String),
}

#[derive(Debug, Deserialize)]
struct WireIncident {
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    ranger_handles: Vec<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    report_entries: Vec<WireReportEntry>,
    state: String,
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct WireReportEntry {
    author: String,
    text: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct WireReferences {
    types: Vec<String>,
    rangers: Vec<WireRanger>,
    locations: Vec<WireLocation>,
}

#[derive(Debug, Deserialize)]
struct WireRanger {
    handle: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    name: String,
    #[serde(default)]
    addresses: Vec<String>,
}

/// Resolves a handle against reference data, constructing a placeholder for
/// handles the server knows but local reference data does not yet.
fn resolve_ranger(handle: &str, references: &References) -> Ranger {
    references
        .rangers_by_handle
        .get(handle)
        .cloned()
        .unwrap_or_else(|| Ranger::placeholder(handle))
}

/// Parses one incident object, resolving handles and the location name
/// against the given reference data.
pub fn incident_from_json(value: Value, references: &References) -> Result<Incident, RecordError> {
    let wire: WireIncident =
        serde_json::from_value(value).map_err(|e| RecordError::InvalidShape(e.to_string()))?;

    let state = IncidentState::from_wire(&wire.state)
        .ok_or_else(|| RecordError::UnknownState(wire.state.clone()))?;
    let priority = IncidentPriority::from_wire(wire.priority)
        .ok_or(RecordError::UnknownPriority(wire.priority))?;

    let location = match wire.location {
        None => None,
        Some(name) => Some(
            references
                .locations_by_name
                .get(&name)
                .cloned()
                .ok_or(RecordError::UnknownLocation(name))?,
        ),
    };

    let rangers = wire
        .ranger_handles
        .iter()
        .map(|handle| (handle.clone(), resolve_ranger(handle, references)))
        .collect();

    let report_entries = wire
        .report_entries
        .into_iter()
        .map(|entry| {
            ReportEntry::new(
                resolve_ranger(&entry.author, references),
                entry.text,
                entry.timestamp,
            )
        })
        .collect();

    Ok(Incident {
        number: wire.number,
        types: wire.types.into_iter().collect(),
        rangers,
        location,
        summary: wire.summary,
        report_entries,
        state,
        priority,
    })
}

/// Serializes an incident, mirroring the shape `incident_from_json` accepts.
/// A draft omits `number`; the server response echoes the assigned one.
pub fn incident_to_json(incident: &Incident) -> Value {
    let report_entries: Vec<Value> = incident
        .report_entries
        .iter()
        .map(|entry| {
            json!({
                "author": entry.author.handle,
                "text": entry.text,
                "timestamp": entry.created.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            })
        })
        .collect();

    let mut object = json!({
        "types": incident.types.iter().collect::<Vec<_>>(),
        "ranger_handles": incident.rangers.keys().collect::<Vec<_>>(),
        "summary": incident.summary,
        "report_entries": report_entries,
        "state": incident.state.as_wire(),
        "priority": incident.priority.as_wire(),
    });
    if let Some(number) = incident.number {
        object["number"] = json!(number);
    }
    if let Some(location) = &incident.location {
        object["location"] = json!(location.name);
    }
    object
}

/// Parses the session reference data: type tags, rangers, and locations.
pub fn references_from_json(value: Value) -> Result<References, RecordError> {
    let wire: WireReferences =
        serde_json::from_value(value).map_err(|e| RecordError::InvalidShape(e.to_string()))?;

    Ok(References {
        incident_types: wire.types.into_iter().collect(),
        rangers_by_handle: wire
            .rangers
            .into_iter()
            .map(|r| {
                let ranger = match r.name {
                    Some(name) => Ranger::new(r.handle.clone(), name),
                    None => Ranger::placeholder(r.handle.clone()),
                };
                (r.handle, ranger)
            })
            .collect(),
        locations_by_name: wire
            .locations
            .into_iter()
            .map(|l| (l.name.clone(), Location::new(l.name, l.addresses)))
            .collect(),
    })
}
