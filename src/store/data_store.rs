use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::{Incident, Ranger};
use crate::transport::Transport;
use crate::wire;

use super::{IncidentMarker, References, StoreError, StoreObserver};

/// Mutable state behind the store's lock: the incident cache plus the
/// reference-data snapshots it was loaded against.
#[derive(Debug, Default)]
struct StoreState {
    incidents: BTreeMap<u32, Incident>,
    references: References,
}

/// The authoritative local cache of incidents and reference data.
///
/// All reads and writes between callers and the server go through here:
/// the store issues transport exchanges, mutates its cache only in its own
/// completion paths, and fans out change notifications to registered
/// observers. Cache mutation is all-or-nothing per operation; a failed
/// exchange never leaves a partial update behind.
///
/// The store does not deduplicate concurrent submissions of the same draft;
/// callers gate resubmission on [`Transport::is_in_flight`].
pub struct DataStore<T: Transport> {
    transport: T,
    state: RwLock<StoreState>,
    observers: RwLock<Vec<Arc<dyn StoreObserver>>>,
}

impl<T: Transport> DataStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: RwLock::new(StoreState::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// The underlying transport, exposed so callers can check for an
    /// in-flight exchange before resubmitting.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn register_observer(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.write().await.push(observer);
    }

    async fn notify<F: Fn(&dyn StoreObserver)>(&self, event: F) {
        for observer in self.observers.read().await.iter() {
            event(observer.as_ref());
        }
    }

    /// Fetches reference data and the full incident list, then replaces the
    /// entire cache. One malformed record aborts the whole batch; on any
    /// failure the previous cache is left untouched.
    pub async fn load(&self) -> Result<(), StoreError> {
        match self.fetch_all().await {
            Ok((references, incidents)) => {
                let count = incidents.len();
                {
                    let mut state = self.state.write().await;
                    state.references = references;
                    state.incidents = incidents;
                }
                tracing::info!(count, "incident cache reloaded");
                self.notify(|o| o.incidents_reloaded()).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "load failed; keeping previous cache");
                self.notify(|o| o.operation_failed(&err)).await;
                Err(err)
            }
        }
    }

    async fn fetch_all(&self) -> Result<(References, BTreeMap<u32, Incident>), StoreError> {
        let references = wire::references_from_json(self.transport.query("references").await?)?;

        let Value::Array(items) = self.transport.query("incidents").await? else {
            return Err(StoreError::MalformedResponse(
                "incident list is not a JSON array".into(),
            ));
        };

        let mut incidents = BTreeMap::new();
        for item in items {
            let incident = wire::incident_from_json(item, &references)?;
            let Some(number) = incident.number else {
                return Err(StoreError::MalformedResponse(
                    "server sent an incident without a number".into(),
                ));
            };
            incidents.insert(number, incident);
        }
        Ok((references, incidents))
    }

    /// A stable snapshot of the cache, in number order. Later cache
    /// mutations are never visible through a returned snapshot.
    pub async fn incidents(&self) -> Vec<Incident> {
        self.state.read().await.incidents.values().cloned().collect()
    }

    pub async fn incident_with_number(&self, number: u32) -> Option<Incident> {
        self.state.read().await.incidents.get(&number).cloned()
    }

    /// A fresh draft. It is registered nowhere; it enters the cache only
    /// once a submission via [`DataStore::update_incident`] confirms it.
    pub fn create_new_incident(&self) -> Incident {
        Incident::draft()
    }

    /// Submits the incident, creating it when it is a draft and updating it
    /// otherwise. The server-confirmed copy is returned and cached; the
    /// server is the source of truth for the final field values.
    pub async fn update_incident(&self, incident: &Incident) -> Result<Incident, StoreError> {
        let marker = IncidentMarker::from(incident.number);
        self.notify(|o| o.will_update(marker)).await;

        match self.submit_incident(incident, marker).await {
            Ok(confirmed) => Ok(confirmed),
            Err(err) => {
                tracing::warn!(%marker, error = %err, "incident submission failed");
                self.notify(|o| o.operation_failed(&err)).await;
                Err(err)
            }
        }
    }

    async fn submit_incident(
        &self,
        incident: &Incident,
        marker: IncidentMarker,
    ) -> Result<Incident, StoreError> {
        let body = wire::incident_to_json(incident);
        let path = match marker {
            IncidentMarker::Draft => "incidents".to_owned(),
            IncidentMarker::Number(n) => format!("incidents/{n}"),
        };
        let response = self.transport.submit(&path, body).await?;

        let mut state = self.state.write().await;
        let confirmed = wire::incident_from_json(response, &state.references)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        let Some(number) = confirmed.number else {
            return Err(StoreError::MalformedResponse(
                "server response did not assign an incident number".into(),
            ));
        };

        match marker {
            IncidentMarker::Draft => {
                if state
                    .incidents
                    .get(&number)
                    .is_some_and(|existing| existing != &confirmed)
                {
                    return Err(StoreError::MalformedResponse(format!(
                        "assigned number {number} collides with a cached incident"
                    )));
                }
                state.incidents.insert(number, confirmed.clone());
                drop(state);
                tracing::info!(number, "draft incident confirmed");
                self.notify(|o| o.did_replace(IncidentMarker::Draft, number))
                    .await;
            }
            IncidentMarker::Number(n) => {
                if number != n {
                    return Err(StoreError::MalformedResponse(format!(
                        "server echoed number {number} for an update to {n}"
                    )));
                }
                state.incidents.insert(number, confirmed.clone());
                drop(state);
                tracing::debug!(number, "incident update confirmed");
                self.notify(|o| o.did_update(&confirmed)).await;
            }
        }

        Ok(confirmed)
    }

    /// Fetches a single incident and replaces just that cache entry.
    pub async fn load_incident_number(&self, number: u32) -> Result<Incident, StoreError> {
        match self.fetch_incident(number).await {
            Ok(incident) => {
                self.notify(|o| o.did_update(&incident)).await;
                Ok(incident)
            }
            Err(err) => {
                tracing::warn!(number, error = %err, "incident reload failed");
                self.notify(|o| o.operation_failed(&err)).await;
                Err(err)
            }
        }
    }

    async fn fetch_incident(&self, number: u32) -> Result<Incident, StoreError> {
        let response = self.transport.query(&format!("incidents/{number}")).await?;

        let mut state = self.state.write().await;
        let incident = wire::incident_from_json(response, &state.references)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        if incident.number != Some(number) {
            return Err(StoreError::MalformedResponse(format!(
                "requested incident {number} but server sent {}",
                IncidentMarker::from(incident.number)
            )));
        }
        state.incidents.insert(number, incident.clone());
        Ok(incident)
    }

    /// Known addresses for a location name; empty when unknown.
    pub async fn addresses_for_location_name(&self, name: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .references
            .locations_by_name
            .get(name)
            .map(|location| location.addresses.clone())
            .unwrap_or_default()
    }

    pub async fn all_incident_types(&self) -> BTreeSet<String> {
        self.state.read().await.references.incident_types.clone()
    }

    pub async fn all_rangers_by_handle(&self) -> BTreeMap<String, Ranger> {
        self.state.read().await.references.rangers_by_handle.clone()
    }

    pub async fn all_location_names(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .references
            .locations_by_name
            .keys()
            .cloned()
            .collect()
    }
}
