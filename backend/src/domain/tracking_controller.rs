//! Per-metric tracking controller.
//!
//! A controller owns the screen-level state for one metric: the loaded record
//! list, the open form, whether the list is shown and the save banner. All
//! mutation goes through `&mut self`, so a controller has a single writer.
//! Failures are reported as [`TrackingNotice`]s on a channel the UI drains;
//! they never panic into rendering.

use chrono::{DateTime, Duration, Utc};
use shared::Metric;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::commands::tracking::RecordForm;
use super::errors::TrackingError;
use super::models::observation::{sticky_fields, Observation};
use super::session::Identity;
use super::tracking_service::TrackingService;

/// How long the save-success banner stays up
pub const SAVE_BANNER_DURATION_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    Saving,
    Deleting,
}

/// User-facing outcome of a controller operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingNotice {
    AuthenticationRequired,
    LoadFailed(String),
    SaveSucceeded,
    SaveFailed(String),
    Deleted,
    DeleteFailed(String),
}

pub fn notice_channel() -> (
    mpsc::UnboundedSender<TrackingNotice>,
    mpsc::UnboundedReceiver<TrackingNotice>,
) {
    mpsc::unbounded_channel()
}

pub struct TrackingController {
    metric: Metric,
    service: TrackingService,
    phase: ControllerPhase,
    records: Vec<Observation>,
    form: RecordForm,
    list_visible: bool,
    save_banner_until: Option<DateTime<Utc>>,
    notices: mpsc::UnboundedSender<TrackingNotice>,
}

impl TrackingController {
    pub fn new(
        metric: Metric,
        service: TrackingService,
        notices: mpsc::UnboundedSender<TrackingNotice>,
    ) -> Self {
        let form = RecordForm::new(service.clock().now());
        Self {
            metric,
            service,
            phase: ControllerPhase::Idle,
            records: Vec::new(),
            form,
            list_visible: false,
            save_banner_until: None,
            notices,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn records(&self) -> &[Observation] {
        &self.records
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RecordForm {
        &mut self.form
    }

    pub fn is_list_visible(&self) -> bool {
        self.list_visible
    }

    pub fn hide_list(&mut self) {
        self.list_visible = false;
    }

    /// True while the save-success banner should be shown
    pub fn save_succeeded(&self) -> bool {
        self.save_banner_until
            .map(|until| self.service.clock().now() < until)
            .unwrap_or(false)
    }

    /// Replace the record list with a fresh newest-first load
    pub async fn load_records(&mut self, identity: Option<&Identity>) {
        if identity.is_none() {
            self.records.clear();
            self.phase = ControllerPhase::Loaded;
            return;
        }

        self.phase = ControllerPhase::Loading;
        match self.service.load_records(identity, self.metric).await {
            Ok(records) => {
                self.records = records;
                self.phase = ControllerPhase::Loaded;
            }
            Err(err) => {
                warn!(metric = %self.metric, error = %err, "record list could not be loaded");
                self.records.clear();
                self.phase = ControllerPhase::LoadFailed;
                self.notify(TrackingNotice::LoadFailed(err.to_string()));
            }
        }
    }

    /// Save the open form. On success the form values are cleared, the list
    /// is shown and reloaded. On failure the form and list are left as they were.
    pub async fn save_record(&mut self, identity: Option<&Identity>) -> Result<(), TrackingError> {
        if identity.is_none() {
            self.notify(TrackingNotice::AuthenticationRequired);
            return Err(TrackingError::Unauthenticated);
        }

        self.phase = ControllerPhase::Saving;
        match self.service.save_record(identity, self.metric, &self.form).await {
            Ok(saved) => {
                info!(metric = %self.metric, id = ?saved.id, "record saved from form");
                self.form.clear_values_except(&sticky_fields(self.metric));
                self.list_visible = true;
                self.save_banner_until =
                    Some(self.service.clock().now() + Duration::seconds(SAVE_BANNER_DURATION_SECS));
                self.notify(TrackingNotice::SaveSucceeded);
                self.load_records(identity).await;
                Ok(())
            }
            Err(err) => {
                self.phase = ControllerPhase::Loaded;
                self.notify(TrackingNotice::SaveFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Delete one record, then reload whatever the outcome.
    /// Without an identity nothing happens.
    pub async fn delete_record(
        &mut self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), TrackingError> {
        if identity.is_none() {
            return Ok(());
        }

        self.phase = ControllerPhase::Deleting;
        let outcome = self.service.delete_record(identity, self.metric, id).await;
        match &outcome {
            Ok(()) => self.notify(TrackingNotice::Deleted),
            Err(err) => self.notify(TrackingNotice::DeleteFailed(err.to_string())),
        }
        self.load_records(identity).await;
        outcome
    }

    pub async fn show_list(&mut self, identity: Option<&Identity>) {
        self.list_visible = true;
        self.load_records(identity).await;
    }

    fn notify(&self, notice: TrackingNotice) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::models::observation::Reading;
    use crate::domain::tracking_service::test_support::ScriptedStore;
    use chrono::TimeZone;
    use shared::FeedingType;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct Harness {
        controller: TrackingController,
        notices: mpsc::UnboundedReceiver<TrackingNotice>,
        store: Arc<ScriptedStore>,
        clock: Arc<ManualClock>,
    }

    fn harness(metric: Metric) -> Harness {
        let store = Arc::new(ScriptedStore::default());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).unwrap()));
        let service = TrackingService::new(store.clone(), clock.clone());
        let (tx, rx) = notice_channel();
        Harness {
            controller: TrackingController::new(metric, service, tx),
            notices: rx,
            store,
            clock,
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TrackingNotice>) -> Vec<TrackingNotice> {
        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    fn uid() -> Identity {
        Identity::new("parent-a").unwrap()
    }

    #[tokio::test]
    async fn test_save_without_identity_notifies_and_keeps_state() {
        let mut h = harness(Metric::Weight);
        h.controller.form_mut().set_value("weight", "4.2");

        let result = h.controller.save_record(None).await;

        assert!(matches!(result, Err(TrackingError::Unauthenticated)));
        assert_eq!(h.store.calls(), 0);
        assert_eq!(h.controller.phase(), ControllerPhase::Idle);
        assert_eq!(h.controller.form().value("weight"), Some("4.2"));
        assert_eq!(drain(&mut h.notices), vec![TrackingNotice::AuthenticationRequired]);
    }

    #[tokio::test]
    async fn test_successful_save_clears_form_and_shows_banner() {
        let mut h = harness(Metric::Weight);
        let identity = uid();
        let date = h.controller.form().date;
        h.controller.form_mut().set_value("weight", "4.2");

        h.controller.save_record(Some(&identity)).await.unwrap();

        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);
        assert!(h.controller.is_list_visible());
        assert_eq!(h.controller.form().value("weight"), None);
        assert_eq!(h.controller.form().date, date);
        assert_eq!(h.controller.records().len(), 1);
        assert!(h.controller.save_succeeded());
        assert_eq!(drain(&mut h.notices), vec![TrackingNotice::SaveSucceeded]);

        h.clock.advance(Duration::seconds(SAVE_BANNER_DURATION_SECS));
        assert!(!h.controller.save_succeeded());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_form_and_previous_list() {
        let mut h = harness(Metric::PulseOx);
        let identity = uid();
        h.controller.form_mut().set_value("pulseOx", "97");
        h.controller.save_record(Some(&identity)).await.unwrap();
        drain(&mut h.notices);

        h.store.fail_add.store(true, Ordering::SeqCst);
        h.controller.form_mut().set_value("pulseOx", "95");
        let result = h.controller.save_record(Some(&identity)).await;

        assert!(matches!(result, Err(TrackingError::SaveFailed { .. })));
        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);
        assert_eq!(h.controller.records().len(), 1);
        assert_eq!(h.controller.form().value("pulseOx"), Some("95"));
        assert!(matches!(drain(&mut h.notices).as_slice(), [TrackingNotice::SaveFailed(_)]));
    }

    #[tokio::test]
    async fn test_load_failure_clears_list() {
        let mut h = harness(Metric::Feeding);
        let identity = uid();
        h.controller.save_record(Some(&identity)).await.unwrap();
        assert_eq!(h.controller.records().len(), 1);
        drain(&mut h.notices);

        h.store.fail_ordered.store(true, Ordering::SeqCst);
        h.store.fail_unordered.store(true, Ordering::SeqCst);
        h.controller.load_records(Some(&identity)).await;

        assert_eq!(h.controller.phase(), ControllerPhase::LoadFailed);
        assert!(h.controller.records().is_empty());
        assert!(matches!(drain(&mut h.notices).as_slice(), [TrackingNotice::LoadFailed(_)]));
    }

    #[tokio::test]
    async fn test_load_survives_ordered_query_failure() {
        let mut h = harness(Metric::Feeding);
        let identity = uid();
        h.controller.save_record(Some(&identity)).await.unwrap();
        h.store.fail_ordered.store(true, Ordering::SeqCst);

        h.controller.load_records(Some(&identity)).await;

        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);
        assert_eq!(h.controller.records().len(), 1);
    }

    #[tokio::test]
    async fn test_load_without_identity_clears_list_without_store_call() {
        let mut h = harness(Metric::Weight);
        h.controller.load_records(None).await;
        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);
        assert!(h.controller.records().is_empty());
        assert_eq!(h.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_delete_still_reloads_but_is_reported() {
        let mut h = harness(Metric::BloodPressure);
        let identity = uid();
        h.controller.form_mut().set_value("systolic", "100");
        h.controller.save_record(Some(&identity)).await.unwrap();
        drain(&mut h.notices);
        let id = h.controller.records()[0].id.clone().unwrap();

        h.store.fail_delete.store(true, Ordering::SeqCst);
        let calls_before = h.store.calls();
        let result = h.controller.delete_record(Some(&identity), &id).await;

        assert!(matches!(result, Err(TrackingError::DeleteFailed { .. })));
        assert!(h.store.calls() > calls_before + 1, "reload should follow the failed delete");
        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);
        assert_eq!(h.controller.records().len(), 1);
        assert!(matches!(drain(&mut h.notices).as_slice(), [TrackingNotice::DeleteFailed(_)]));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let mut h = harness(Metric::Weight);
        let identity = uid();
        h.controller.form_mut().set_value("weight", "5.0");
        h.controller.save_record(Some(&identity)).await.unwrap();
        let id = h.controller.records()[0].id.clone().unwrap();
        drain(&mut h.notices);

        h.controller.delete_record(Some(&identity), &id).await.unwrap();

        assert!(h.controller.records().is_empty());
        assert_eq!(drain(&mut h.notices), vec![TrackingNotice::Deleted]);
    }

    #[tokio::test]
    async fn test_feeding_type_survives_consecutive_saves() {
        let mut h = harness(Metric::Feeding);
        let identity = uid();
        h.controller.form_mut().set_value("type", "bottle");
        h.controller.form_mut().set_value("amount", "60");
        h.controller.form_mut().set_value("time", "06:30");
        h.controller.save_record(Some(&identity)).await.unwrap();

        assert_eq!(h.controller.form().value("type"), Some("bottle"));
        assert_eq!(h.controller.form().value("amount"), None);
        assert_eq!(h.controller.form().value("time"), None);

        h.controller.form_mut().set_value("amount", "70");
        h.controller.save_record(Some(&identity)).await.unwrap();

        let types: Vec<Option<FeedingType>> = h
            .controller
            .records()
            .iter()
            .map(|r| match r.reading {
                Reading::Feeding { feeding_type, .. } => feeding_type,
                _ => None,
            })
            .collect();
        assert_eq!(types, vec![Some(FeedingType::Bottle), Some(FeedingType::Bottle)]);
    }

    #[tokio::test]
    async fn test_delete_without_identity_does_nothing() {
        let mut h = harness(Metric::Weight);

        let result = h.controller.delete_record(None, "anything").await;

        assert!(result.is_ok());
        assert_eq!(h.store.calls(), 0);
        assert_eq!(h.controller.phase(), ControllerPhase::Idle);
        assert!(drain(&mut h.notices).is_empty());
    }

    #[tokio::test]
    async fn test_show_list_loads_records() {
        let mut h = harness(Metric::Weight);
        assert!(!h.controller.is_list_visible());
        h.controller.show_list(Some(&uid())).await;
        assert!(h.controller.is_list_visible());
        assert_eq!(h.controller.phase(), ControllerPhase::Loaded);

        h.controller.hide_list();
        assert!(!h.controller.is_list_visible());
    }
}
