//! View synchronization.
//!
//! Turns standing store watches into render-ready snapshots. Deliveries are
//! always complete replacements: the consumer throws the previous snapshot
//! away. The collection watch is fanned out to two differently paced
//! consumers from a single upstream subscription.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::warn;

use vigil_shared::constants::HEATMAP_DEBOUNCE_MS;
use vigil_shared::lifecycle::{self, StatusDisplay, TrackerStep};
use vigil_shared::types::ComplaintId;
use vigil_store::{CancelHandle, Complaint, DocEvent, Subscription};

use crate::state::AppState;

/// Render-ready view of one complaint.
#[derive(Debug, Clone)]
pub struct ComplaintView {
    pub complaint: Complaint,
    /// Raw status string as persisted. Unknown values keep their text but
    /// render with default styling.
    pub status_raw: String,
    pub display: StatusDisplay,
    pub tracker: [TrackerStep; 4],
}

impl ComplaintView {
    fn from_document(document: Value) -> Option<Self> {
        let status_raw = document
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let complaint = match Complaint::from_document(document) {
            Ok(complaint) => complaint,
            Err(e) => {
                warn!(error = %e, "skipping undecodable complaint document");
                return None;
            }
        };
        let display = StatusDisplay::for_raw(&status_raw);
        let tracker = lifecycle::tracker_steps(complaint.status);
        Some(Self {
            complaint,
            status_raw,
            display,
            tracker,
        })
    }
}

/// One delivery from a single-complaint watch.
#[derive(Debug, Clone)]
pub enum ComplaintSnapshot {
    Found(ComplaintView),
    /// The searched id has no record, distinct from an empty result so the
    /// consumer can show a not-found state.
    NotFound,
}

/// Standing watch on one complaint, yielding render-ready snapshots.
pub struct ComplaintWatch {
    inner: Subscription<DocEvent>,
}

impl ComplaintWatch {
    /// Next snapshot; `None` after cancellation.
    pub async fn next(&mut self) -> Option<ComplaintSnapshot> {
        loop {
            match self.inner.recv().await? {
                DocEvent::Missing => return Some(ComplaintSnapshot::NotFound),
                DocEvent::Exists(document) => match ComplaintView::from_document(document) {
                    Some(view) => return Some(ComplaintSnapshot::Found(view)),
                    None => continue,
                },
            }
        }
    }

    /// Idempotent; stops deliveries immediately.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.inner.cancel_handle()
    }
}

/// Subscribe to one complaint by id. Every remote change (including
/// changes caused by this same client) delivers a complete replacement
/// snapshot; the first delivery is the current state or not-found.
pub fn watch_complaint(state: &AppState, id: &ComplaintId) -> ComplaintWatch {
    ComplaintWatch {
        inner: state.store.complaints().watch(id),
    }
}

/// Collection snapshot delivered to dashboard consumers, newest first.
pub type CollectionSnapshot = Vec<ComplaintView>;

/// One collection subscription fanned out to two consumers.
///
/// The list channel gets every snapshot immediately. The heatmap channel
/// coalesces bursts: deliveries arriving within the debounce window are
/// collapsed and only the latest snapshot is forwarded, since re-rendering
/// the geospatial layer is comparatively expensive.
pub struct DashboardFeed {
    pub list: mpsc::UnboundedReceiver<CollectionSnapshot>,
    pub heatmap: mpsc::UnboundedReceiver<CollectionSnapshot>,
    cancel: CancelHandle,
}

impl DashboardFeed {
    pub fn open(state: &AppState) -> Self {
        let mut upstream = state.store.complaints().watch_all();
        let cancel = upstream.cancel_handle();
        let upstream_cancel = cancel.clone();
        let (list_tx, list_rx) = mpsc::unbounded_channel();
        let (heat_tx, heat_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let debounce = Duration::from_millis(HEATMAP_DEBOUNCE_MS);
            let mut pending: Option<CollectionSnapshot> = None;
            let mut deadline = Instant::now();

            loop {
                let next = if pending.is_some() {
                    tokio::select! {
                        delivered = upstream.recv() => Some(delivered),
                        () = sleep_until(deadline) => None,
                    }
                } else {
                    Some(upstream.recv().await)
                };

                match next {
                    Some(Some(documents)) => {
                        let snapshot: CollectionSnapshot = documents
                            .into_iter()
                            .filter_map(ComplaintView::from_document)
                            .collect();
                        let list_gone = list_tx.send(snapshot.clone()).is_err();
                        if list_gone && heat_tx.is_closed() {
                            return;
                        }
                        // Trailing edge: every delivery pushes the flush out.
                        pending = Some(snapshot);
                        deadline = Instant::now() + debounce;
                    }
                    Some(None) => {
                        // Store gone: flush what is pending. An explicit
                        // close stops deliveries immediately instead.
                        if !upstream_cancel.is_cancelled() {
                            if let Some(snapshot) = pending.take() {
                                let _ = heat_tx.send(snapshot);
                            }
                        }
                        return;
                    }
                    None => {
                        if let Some(snapshot) = pending.take() {
                            let heat_gone = heat_tx.send(snapshot).is_err();
                            if heat_gone && list_tx.is_closed() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Self {
            list: list_rx,
            heatmap: heat_rx,
            cancel,
        }
    }

    /// Cancel the underlying collection watch. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for DashboardFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaints::{self, NewComplaint};
    use crate::config::AppConfig;
    use chrono::Utc;
    use vigil_shared::lifecycle::Severity;
    use vigil_shared::types::{Coordinates, Status, VehicleType};
    use vigil_store::DocumentStore;

    fn test_state() -> AppState {
        AppState::new(DocumentStore::new(), AppConfig::default())
    }

    fn sample_input(vehicle_no: &str) -> NewComplaint {
        NewComplaint {
            owner_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            vehicle_type: VehicleType::Car,
            vehicle_no: vehicle_no.to_string(),
            location: "18.520430, 73.856743".to_string(),
            coordinates: Some(Coordinates {
                lat: 18.520_430,
                lng: 73.856_743,
            }),
            vehicle_image: None,
            rc_document: None,
            date: Utc::now() - chrono::Duration::days(1),
            description: "Parked overnight".to_string(),
        }
    }

    #[tokio::test]
    async fn submit_then_track_sees_status_progression() {
        let state = test_state();
        let submission = complaints::create(&state, sample_input("MH12AB1234"))
            .await
            .unwrap();
        let id = submission.complaint.id.clone();

        let mut watch = watch_complaint(&state, &id);
        match watch.next().await.unwrap() {
            ComplaintSnapshot::Found(view) => {
                assert_eq!(view.complaint.vehicle_no, "MH12AB1234");
                assert_eq!(view.display.ordinal, 0);
                assert_eq!(view.status_raw, "Pending");
            }
            ComplaintSnapshot::NotFound => panic!("expected the created complaint"),
        }

        complaints::update_status(&state, &id, Status::Found)
            .await
            .unwrap();
        match watch.next().await.unwrap() {
            ComplaintSnapshot::Found(view) => {
                assert_eq!(view.display.ordinal, 2);
                assert_eq!(view.display.severity, Severity::Success);
                assert!(view.tracker[2].active);
            }
            ComplaintSnapshot::NotFound => panic!("record vanished"),
        }
    }

    #[tokio::test]
    async fn unknown_id_yields_not_found_then_data_once_created() {
        let state = test_state();
        let id: ComplaintId = "CR-MISSIN".parse().unwrap();

        let mut watch = watch_complaint(&state, &id);
        assert!(matches!(
            watch.next().await.unwrap(),
            ComplaintSnapshot::NotFound
        ));

        // Write the record under exactly that id.
        let mut complaint = complaints::create(&state, sample_input("KA01XY0001"))
            .await
            .unwrap()
            .complaint;
        complaint.id = id.clone();
        state.store.complaints().create(&complaint).await.unwrap();

        match watch.next().await.unwrap() {
            ComplaintSnapshot::Found(view) => assert_eq!(view.complaint.id, id),
            ComplaintSnapshot::NotFound => panic!("record was created"),
        }
    }

    #[tokio::test]
    async fn corrupted_status_renders_with_default_styling() {
        let state = test_state();
        let submission = complaints::create(&state, sample_input("MH12AB1234"))
            .await
            .unwrap();
        let id = submission.complaint.id.clone();

        let mut watch = watch_complaint(&state, &id);
        watch.next().await.unwrap();

        // Simulate an externally written record with a bogus status.
        let mut fields = serde_json::Map::new();
        fields.insert("status".to_string(), serde_json::json!("Archived"));
        state
            .store
            .collection("complaints")
            .update(id.as_str(), fields)
            .await
            .unwrap();

        match watch.next().await.unwrap() {
            ComplaintSnapshot::Found(view) => {
                assert_eq!(view.status_raw, "Archived");
                assert_eq!(view.display.severity, Severity::Danger);
                assert_eq!(view.display.ordinal, 0);
            }
            ComplaintSnapshot::NotFound => panic!("record exists"),
        }
    }

    #[tokio::test]
    async fn switching_watches_cancels_the_previous_one() {
        let state = test_state();
        let first = complaints::create(&state, sample_input("MH12AB1234"))
            .await
            .unwrap()
            .complaint;
        let second = complaints::create(&state, sample_input("KA01XY0001"))
            .await
            .unwrap()
            .complaint;

        let mut watch = watch_complaint(&state, &first.id);
        watch.next().await.unwrap();
        watch.cancel();
        assert!(watch.next().await.is_none());

        let mut watch = watch_complaint(&state, &second.id);
        match watch.next().await.unwrap() {
            ComplaintSnapshot::Found(view) => {
                assert_eq!(view.complaint.id, second.id);
            }
            ComplaintSnapshot::NotFound => panic!("second record exists"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_writes_coalesces_to_one_heatmap_render() {
        let state = test_state();
        let mut feed = DashboardFeed::open(&state);

        // Initial (empty) collection snapshot reaches both consumers.
        assert!(feed.list.recv().await.unwrap().is_empty());
        assert!(feed.heatmap.recv().await.unwrap().is_empty());

        // Five mutations in one burst, well inside the debounce window.
        for i in 0..5 {
            complaints::create(&state, sample_input(&format!("MH12AB100{i}")))
                .await
                .unwrap();
        }

        // The list consumer sees every delivery. Deliveries are snapshot
        // replacements read at delivery time, so each carries the full
        // current collection.
        for _ in 0..5 {
            assert_eq!(feed.list.recv().await.unwrap().len(), 5);
        }

        // ...the heatmap consumer sees exactly one, carrying the final
        // state.
        let coalesced = feed.heatmap.recv().await.unwrap();
        assert_eq!(coalesced.len(), 5);
        assert!(feed.heatmap.try_recv().is_err());

        feed.close();
        feed.close();
    }
}
