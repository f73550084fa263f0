//! Lifecycle binding and service notification behavior.
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use sfa_core::notification::{DEFAULT_TITLE, STARTED_CONTENT};
use sfa_core::{
    Binding, Connectable, Liveness, NotificationSurface, ServiceNotification, SessionConfig,
    StatusMessage,
};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

use common::{StubEndpoint, settle};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Toggle {
    connects: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl Toggle {
    fn counts(&self) -> (usize, usize) {
        (
            self.connects.load(Ordering::SeqCst),
            self.disconnects.load(Ordering::SeqCst),
        )
    }
}

impl Connectable for Toggle {
    fn connect(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<String>>,
}

impl RecordingSurface {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl NotificationSurface for RecordingSurface {
    fn show(&self, title: &str, content: &str) {
        self.calls.lock().unwrap().push(format!("show {title}: {content}"));
    }

    fn update(&self, content: &str) {
        self.calls.lock().unwrap().push(format!("update {content}"));
    }

    fn remove(&self) {
        self.calls.lock().unwrap().push("remove".into());
    }
}

fn signals() -> (
    mpsc::UnboundedSender<Liveness>,
    UnboundedReceiverStream<Liveness>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, UnboundedReceiverStream::new(rx))
}

// ── Binding ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn signals_map_to_connect_and_disconnect() {
    let toggle = Toggle::default();
    let (tx, stream) = signals();
    let binding = Binding::register(toggle.clone(), stream);

    tx.send(Liveness::Active).unwrap();
    tx.send(Liveness::Inactive).unwrap();
    tx.send(Liveness::Active).unwrap();
    settle().await;

    assert!(binding.is_registered());
    assert_eq!(toggle.counts(), (2, 1));
}

#[tokio::test(start_paused = true)]
async fn unregister_is_idempotent_and_final() {
    let toggle = Toggle::default();
    let (tx, stream) = signals();
    let mut binding = Binding::register(toggle.clone(), stream);

    binding.unregister();
    binding.unregister();
    assert!(!binding.is_registered());

    let _ = tx.send(Liveness::Active);
    settle().await;
    assert_eq!(toggle.counts(), (0, 0));
}

#[tokio::test(start_paused = true)]
async fn dropping_a_binding_unregisters_it() {
    let toggle = Toggle::default();
    let (tx, stream) = signals();
    drop(Binding::register(toggle.clone(), stream));

    let _ = tx.send(Liveness::Inactive);
    settle().await;
    assert_eq!(toggle.counts(), (0, 0));
}

#[tokio::test(start_paused = true)]
async fn watch_binding_forwards_changes_only() {
    let toggle = Toggle::default();
    let (tx, rx) = watch::channel(Liveness::Active);
    let _binding = Binding::from_watch(toggle.clone(), rx);
    settle().await;
    assert_eq!(toggle.counts(), (0, 0), "initial value is not replayed");

    tx.send(Liveness::Inactive).unwrap();
    settle().await;
    tx.send(Liveness::Active).unwrap();
    settle().await;
    assert_eq!(toggle.counts(), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn binding_drives_a_real_session() {
    let endpoint = StubEndpoint::healthy();
    let client = sfa_core::CommandClient::new(
        Arc::clone(&endpoint),
        sfa_core::Command::Status,
        Arc::new(sfa_core::EventForwarder::channel().0),
    );
    let (tx, stream) = signals();
    let _binding = Binding::register(client.clone(), stream);

    tx.send(Liveness::Active).unwrap();
    settle().await;
    client.wait_connected().await.unwrap();
    assert_eq!(endpoint.live_refs(), 1);

    tx.send(Liveness::Inactive).unwrap();
    settle().await;
    assert!(!client.is_connected());
    assert_eq!(endpoint.live_refs(), 0);
}

// ── ServiceNotification ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn dynamic_notification_tracks_traffic_and_screen() {
    let endpoint = StubEndpoint::healthy();
    let surface = Arc::new(RecordingSurface::default());
    let mut notification = ServiceNotification::new(
        Arc::clone(&endpoint),
        Arc::clone(&surface),
        SessionConfig::default(),
        true,
    );
    let (tx, stream) = signals();

    notification.show("  ", stream);
    notification.client().wait_connected().await.unwrap();
    endpoint.emit(|engine| engine.write_status(Some(StatusMessage::traffic(1024, 2048))));

    // Screen off, then back on: the session follows.
    tx.send(Liveness::Inactive).unwrap();
    settle().await;
    assert_eq!(endpoint.live_refs(), 0);
    tx.send(Liveness::Active).unwrap();
    settle().await;
    notification.client().wait_connected().await.unwrap();
    assert_eq!(endpoint.attempt_count(), 2);

    notification.close();
    assert_eq!(endpoint.live_refs(), 0);

    // Closed: further signals are ignored.
    let _ = tx.send(Liveness::Active);
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    assert_eq!(endpoint.attempt_count(), 2);

    assert_eq!(
        surface.calls(),
        vec![
            format!("show {DEFAULT_TITLE}: {STARTED_CONTENT}"),
            "update 1.0 KiB/s ↑\t2.0 KiB/s ↓".to_owned(),
            "remove".to_owned(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn static_notification_never_subscribes() {
    let endpoint = StubEndpoint::healthy();
    let surface = Arc::new(RecordingSurface::default());
    let mut notification = ServiceNotification::new(
        Arc::clone(&endpoint),
        Arc::clone(&surface),
        SessionConfig::default(),
        false,
    );
    let (tx, stream) = signals();

    notification.show("Home", stream);
    let _ = tx.send(Liveness::Active);
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    notification.close();

    assert_eq!(endpoint.attempt_count(), 0);
    assert_eq!(
        surface.calls(),
        vec![format!("show Home: {STARTED_CONTENT}"), "remove".to_owned()]
    );
}
