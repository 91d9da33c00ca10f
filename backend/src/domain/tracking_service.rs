//! Tracking service domain logic.
//!
//! One service handles all four metrics; the metric selects the collection
//! and field schema. Operations are stateless apart from the guard that keeps
//! `createdAt` strictly increasing, so the service is shared freely between
//! request handlers and controllers.

use chrono::{DateTime, Duration, Utc};
use shared::Metric;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use super::clock::Clock;
use super::commands::tracking::RecordForm;
use super::errors::TrackingError;
use super::models::observation::{collection_name, Observation};
use super::ordering::load_ordered;
use super::session::Identity;
use crate::storage::{CollectionPath, DocumentStore, SortDirection};

/// Unordered contents of every tracking collection for one identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingSnapshot {
    pub feeding: Vec<Observation>,
    pub weight: Vec<Observation>,
    pub blood_pressure: Vec<Observation>,
    pub pulse_ox: Vec<Observation>,
}

impl TrackingSnapshot {
    pub fn records(&self, metric: Metric) -> &[Observation] {
        match metric {
            Metric::Feeding => &self.feeding,
            Metric::Weight => &self.weight,
            Metric::BloodPressure => &self.blood_pressure,
            Metric::PulseOx => &self.pulse_ox,
        }
    }

    pub fn total(&self) -> usize {
        Metric::ALL.iter().map(|m| self.records(*m).len()).sum()
    }
}

#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    last_created_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl TrackingService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            last_created_at: Arc::new(Mutex::new(None)),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn collection(identity: &Identity, metric: Metric) -> CollectionPath {
        CollectionPath::user_collection(identity.as_str(), collection_name(metric))
    }

    /// Records newest first. No identity means no records.
    pub async fn load_records(
        &self,
        identity: Option<&Identity>,
        metric: Metric,
    ) -> Result<Vec<Observation>, TrackingError> {
        self.load_records_ordered(identity, metric, SortDirection::Descending)
            .await
    }

    pub async fn load_records_ordered(
        &self,
        identity: Option<&Identity>,
        metric: Metric,
        direction: SortDirection,
    ) -> Result<Vec<Observation>, TrackingError> {
        let Some(identity) = identity else {
            debug!(metric = %metric, "no identity, returning no records");
            return Ok(Vec::new());
        };

        let collection = Self::collection(identity, metric);
        let documents = load_ordered(self.store.as_ref(), &collection, direction)
            .await
            .map_err(|source| {
                error!(collection = %collection, error = %source, "failed to load records");
                TrackingError::QueryFailed {
                    collection: collection.to_string(),
                    source,
                }
            })?;

        Ok(documents
            .into_iter()
            .map(|document| Observation::from_stored(metric, document))
            .collect())
    }

    /// Sanitize the form and append a new record. Returns the stored record.
    pub async fn save_record(
        &self,
        identity: Option<&Identity>,
        metric: Metric,
        form: &RecordForm,
    ) -> Result<Observation, TrackingError> {
        let identity = identity.ok_or(TrackingError::Unauthenticated)?;
        let collection = Self::collection(identity, metric);

        let mut observation = Observation::from_form(metric, form, self.next_created_at());
        let id = self
            .store
            .add_document(&collection, observation.to_document())
            .await
            .map_err(|source| {
                error!(collection = %collection, error = %source, "failed to save record");
                TrackingError::SaveFailed {
                    collection: collection.to_string(),
                    source,
                }
            })?;

        info!(collection = %collection, id = %id, "record saved");
        observation.id = Some(id);
        Ok(observation)
    }

    /// Remove one record. Unknown ids and a missing identity are no-ops.
    pub async fn delete_record(
        &self,
        identity: Option<&Identity>,
        metric: Metric,
        id: &str,
    ) -> Result<(), TrackingError> {
        let Some(identity) = identity else {
            debug!(metric = %metric, "no identity, ignoring delete");
            return Ok(());
        };

        let collection = Self::collection(identity, metric);
        self.store
            .delete_document(&collection, id)
            .await
            .map_err(|source| {
                error!(collection = %collection, id, error = %source, "failed to delete record");
                TrackingError::DeleteFailed {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    source,
                }
            })?;

        info!(collection = %collection, id, "record deleted");
        Ok(())
    }

    /// Fetch all four collections concurrently; any failure fails the whole fetch
    pub async fn fetch_all(&self, identity: &Identity) -> Result<TrackingSnapshot, TrackingError> {
        let (feeding, weight, blood_pressure, pulse_ox) = tokio::try_join!(
            self.fetch_unordered(identity, Metric::Feeding),
            self.fetch_unordered(identity, Metric::Weight),
            self.fetch_unordered(identity, Metric::BloodPressure),
            self.fetch_unordered(identity, Metric::PulseOx),
        )?;

        Ok(TrackingSnapshot {
            feeding,
            weight,
            blood_pressure,
            pulse_ox,
        })
    }

    async fn fetch_unordered(
        &self,
        identity: &Identity,
        metric: Metric,
    ) -> Result<Vec<Observation>, TrackingError> {
        let collection = Self::collection(identity, metric);
        let documents = self
            .store
            .query_documents(&collection, None)
            .await
            .map_err(|source| TrackingError::QueryFailed {
                collection: collection.to_string(),
                source,
            })?;
        Ok(documents
            .into_iter()
            .map(|document| Observation::from_stored(metric, document))
            .collect())
    }

    /// Current time, bumped by 1 ms when it would not be after the last stamp
    fn next_created_at(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        let mut last = match self.last_created_at.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stamp = match *last {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::storage::{
        CollectionPath, Document, DocumentStore, MemoryDocumentStore, OrderBy, StoreError,
        StoredDocument,
    };

    /// Memory store with switchable failures and a call counter
    #[derive(Default)]
    pub struct ScriptedStore {
        pub inner: MemoryDocumentStore,
        pub calls: AtomicUsize,
        pub fail_ordered: AtomicBool,
        pub fail_unordered: AtomicBool,
        pub fail_add: AtomicBool,
        pub fail_delete: AtomicBool,
    }

    impl ScriptedStore {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn unavailable(what: &str) -> StoreError {
            StoreError::Unavailable(format!("{what} rejected by test store"))
        }
    }

    #[async_trait]
    impl DocumentStore for ScriptedStore {
        async fn add_document(
            &self,
            collection: &CollectionPath,
            document: Document,
        ) -> Result<String, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_add.load(Ordering::SeqCst) {
                return Err(Self::unavailable("add"));
            }
            self.inner.add_document(collection, document).await
        }

        async fn query_documents(
            &self,
            collection: &CollectionPath,
            order: Option<&OrderBy>,
        ) -> Result<Vec<StoredDocument>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let failing = match order {
                Some(_) => &self.fail_ordered,
                None => &self.fail_unordered,
            };
            if failing.load(Ordering::SeqCst) {
                return Err(Self::unavailable("query"));
            }
            self.inner.query_documents(collection, order).await
        }

        async fn delete_document(
            &self,
            collection: &CollectionPath,
            id: &str,
        ) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Self::unavailable("delete"));
            }
            self.inner.delete_document(collection, id).await
        }
    }
}
