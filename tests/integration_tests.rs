// Integration tests for GigFlow Match
//
// The catalog tests run the gateway against a mock HTTP server; the
// transport tests run the full client against a real WebSocket server
// spawned inside the test.

use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use gigflow_match::models::{
    Gig, GigFilters, MatchResult, NotificationSettings, OutboundFrame, Platform,
    SubscriptionRequest, UserPreferences, UserProfile,
};
use gigflow_match::services::{
    AlertTransport, ConnectionState, EventBus, EventKind, GigCatalogGateway, ResultCache,
    SubscriptionSync, TransportEvent,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn create_profile() -> UserProfile {
    UserProfile {
        user_id: "user123".to_string(),
        skills: vec!["React".to_string(), "TypeScript".to_string(), "Node".to_string()],
        preferences: UserPreferences {
            min_budget: Some(500),
            max_budget: Some(2000),
            remote_ok: Some(true),
            part_time_ok: Some(true),
            preferred_platforms: vec![],
        },
        notification_settings: NotificationSettings {
            gig_alerts: true,
            email: false,
            push: false,
        },
    }
}

fn remote_gig(id: &str, title: &str) -> Gig {
    Gig {
        id: id.to_string(),
        external_id: None,
        title: title.to_string(),
        description: "A remote-sourced gig".to_string(),
        platform: Platform::Upwork,
        skills_required: vec!["React".to_string()],
        url: None,
        posted_date: None,
        location: Some("Remote".to_string()),
        budget: Some("$1,000 - $2,000".to_string()),
        duration: None,
    }
}

// ============================================================================
// Catalog gateway
// ============================================================================

#[tokio::test]
async fn test_get_gigs_from_remote_then_cache() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let gigs = vec![remote_gig("r-1", "Remote gig one"), remote_gig("r-2", "Remote gig two")];

    let mock = server
        .mock("GET", "/gigs")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&gigs).unwrap())
        .expect(1)
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));
    let filters = GigFilters::default();

    let first = gateway.get_gigs(&filters).await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "r-1");

    // Second read is served from cache; the mock's expect(1) enforces
    // that no second request went out
    let second = gateway.get_gigs(&filters).await;
    assert_eq!(second.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_error_falls_back_to_offline_dataset() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gigs")
        .with_status(500)
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));
    let gigs = gateway.get_gigs(&GigFilters::default()).await;

    // The caller still gets a result set, served from the offline dataset
    assert!(!gigs.is_empty());
    assert!(gigs.iter().any(|g| g.id == "gig-1"));
}

#[tokio::test]
async fn test_matching_falls_back_to_local_scoring() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gigs/matching/user123")
        .with_status(503)
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));
    let results = gateway
        .get_matching_gigs(&create_profile(), &GigFilters::default())
        .await;

    assert!(!results.is_empty());
    // Locally scored and ranked best-first
    for pair in results.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
    // The React dashboard gig fits this profile best
    assert_eq!(results[0].gig.id, "gig-1");
}

#[tokio::test]
async fn test_search_falls_back_to_local_search() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gigs/search")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));

    let hits = gateway.search_gigs("react", &GigFilters::default()).await;
    assert!(hits.iter().any(|g| g.id == "gig-1"));

    let misses = gateway.search_gigs("blockchain", &GigFilters::default()).await;
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_get_gig_by_id_fallback_and_not_found() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", mockito::Matcher::Regex(r"^/gigs/.*$".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));

    let found = gateway.get_gig_by_id("gig-2").await;
    assert_eq!(found.map(|g| g.title), Some("Node.js API Integration".to_string()));

    assert!(gateway.get_gig_by_id("no-such-gig").await.is_none());
}

#[tokio::test]
async fn test_cache_is_busted_by_clear() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gigs")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&vec![remote_gig("r-1", "Remote gig")]).unwrap())
        .expect(2)
        .create_async()
        .await;

    let cache = Arc::new(ResultCache::new());
    let gateway = GigCatalogGateway::new(server.url(), cache.clone());
    let filters = GigFilters::default();

    gateway.get_gigs(&filters).await;
    // Profile edits invalidate previously scored results
    cache.clear();
    gateway.get_gigs(&filters).await;

    mock.assert_async().await;
}

// ============================================================================
// Alert transport
// ============================================================================

/// Minimal alert server: accepts a single client, forwards frames pushed
/// through the returned sender, and reports every text frame the client
/// sends back.
async fn spawn_alert_server() -> (
    String,
    mpsc::UnboundedSender<String>,
    mpsc::UnboundedReceiver<String>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("server addr");
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => return,
        };
        let mut ws = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(_) => return,
        };

        loop {
            tokio::select! {
                frame = out_rx.recv() => match frame {
                    Some(text) => {
                        if ws.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                message = ws.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        let _ = in_tx.send(text.to_string());
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    });

    (format!("ws://{}", addr), out_tx, in_rx)
}

async fn wait_for_state(transport: &AlertTransport, state: ConnectionState) {
    timeout(Duration::from_secs(5), async {
        while transport.state() != state {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {:?}, still {:?}", state, transport.state()));
}

async fn recv_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
    let text = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for client frame")
        .expect("server channel closed");
    serde_json::from_str(&text).expect("client sent invalid JSON")
}

#[tokio::test]
async fn test_transport_connects_and_dispatches_alerts() {
    init_tracing();
    let (url, server_tx, _server_rx) = spawn_alert_server().await;

    let bus = Arc::new(EventBus::new());
    let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let received = received.clone();
        bus.on(EventKind::GigAlert, move |event| {
            if let TransportEvent::Alert(gigflow_match::AlertEvent::GigAlert(gig)) = event {
                received.lock().unwrap().push(gig.id.clone());
            }
        });
    }

    let transport = AlertTransport::new(url, "user123".to_string(), bus);
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;

    server_tx
        .send(
            r#"{"type": "gig_alert", "payload": {"id": "gig-9", "title": "Rust CLI tool", "platform": "freelancer"}}"#
                .to_string(),
        )
        .unwrap();

    timeout(Duration::from_secs(5), async {
        while received.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("gig alert never reached the bus");

    assert_eq!(*received.lock().unwrap(), vec!["gig-9".to_string()]);
    transport.disconnect();
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() {
    init_tracing();
    let (url, server_tx, mut server_rx) = spawn_alert_server().await;

    let transport = AlertTransport::new(url, "user123".to_string(), Arc::new(EventBus::new()));
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;

    server_tx.send(r#"{"type": "ping"}"#.to_string()).unwrap();

    let reply = recv_frame(&mut server_rx).await;
    assert_eq!(reply["type"], "pong");
    transport.disconnect();
}

#[tokio::test]
async fn test_malformed_frames_are_dropped_silently() {
    init_tracing();
    let (url, server_tx, _server_rx) = spawn_alert_server().await;

    let bus = Arc::new(EventBus::new());
    let alert_count = Arc::new(Mutex::new(0usize));
    for kind in [
        EventKind::GigAlert,
        EventKind::ApplicationUpdate,
        EventKind::SystemNotification,
    ] {
        let alert_count = alert_count.clone();
        bus.on(kind, move |_| {
            *alert_count.lock().unwrap() += 1;
        });
    }

    let transport = AlertTransport::new(url, "user123".to_string(), bus);
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;

    server_tx.send(r#"{"type": "unknown_type", "payload": {}}"#.to_string()).unwrap();
    server_tx.send("not json at all".to_string()).unwrap();
    // gig_alert whose payload is application_update shaped
    server_tx
        .send(r#"{"type": "gig_alert", "payload": {"applicationId": "app-1"}}"#.to_string())
        .unwrap();
    // Barrier: a valid frame sent last proves the earlier ones were
    // processed (in order) without killing the connection
    server_tx
        .send(r#"{"type": "system_notification", "payload": {"message": "still alive"}}"#.to_string())
        .unwrap();

    timeout(Duration::from_secs(5), async {
        while *alert_count.lock().unwrap() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("barrier notification never arrived");

    assert_eq!(*alert_count.lock().unwrap(), 1);
    assert_eq!(transport.state(), ConnectionState::Connected);
    transport.disconnect();
}

#[tokio::test]
async fn test_subscription_lifecycle_frames() {
    init_tracing();
    let (url, _server_tx, mut server_rx) = spawn_alert_server().await;

    let transport = Arc::new(AlertTransport::new(
        url,
        "user123".to_string(),
        Arc::new(EventBus::new()),
    ));
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;

    let sync = SubscriptionSync::new(transport.clone());
    let mut profile = create_profile();

    // First connect: subscribe with derived preferences
    sync.handle_connected(&profile);
    let frame = recv_frame(&mut server_rx).await;
    assert_eq!(frame["type"], "subscribe_gig_alerts");
    assert_eq!(frame["payload"]["userId"], "user123");
    assert_eq!(frame["payload"]["preferences"]["minBudget"], 500);

    // Unchanged preferences: no frame goes out
    sync.sync(&profile);

    // Changed preferences: one update frame
    profile.preferences.max_budget = Some(3000);
    sync.sync(&profile);
    let frame = recv_frame(&mut server_rx).await;
    assert_eq!(frame["type"], "update_gig_preferences");
    assert_eq!(frame["payload"]["preferences"]["maxBudget"], 3000);

    // Explicit opt-out
    sync.opt_out("user123");
    let frame = recv_frame(&mut server_rx).await;
    assert_eq!(frame["type"], "unsubscribe_gig_alerts");
    assert_eq!(frame["payload"]["userId"], "user123");

    transport.disconnect();
}

#[tokio::test]
async fn test_disconnect_then_send_is_warned_noop() {
    init_tracing();
    let (url, _server_tx, _server_rx) = spawn_alert_server().await;

    let transport = AlertTransport::new(url, "user123".to_string(), Arc::new(EventBus::new()));
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;

    transport.disconnect();
    assert_eq!(transport.state(), ConnectionState::Disconnected);

    // Dropped with a warning, never an error
    transport.send(OutboundFrame::SubscribeGigAlerts(SubscriptionRequest {
        user_id: "user123".to_string(),
        preferences: gigflow_match::SubscriptionPreferences::from_profile(&create_profile()),
    }));
}

#[tokio::test]
async fn test_connected_and_disconnected_events_are_published() {
    init_tracing();
    let (url, _server_tx, _server_rx) = spawn_alert_server().await;

    let bus = Arc::new(EventBus::new());
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let log = log.clone();
        bus.on(EventKind::Connected, move |_| log.lock().unwrap().push("connected"));
    }
    {
        let log = log.clone();
        bus.on(EventKind::Disconnected, move |_| log.lock().unwrap().push("disconnected"));
    }

    let transport = AlertTransport::new(url, "user123".to_string(), bus);
    transport.connect();
    wait_for_state(&transport, ConnectionState::Connected).await;
    assert_eq!(*log.lock().unwrap(), vec!["connected"]);

    transport.disconnect();
    assert_eq!(*log.lock().unwrap(), vec!["connected", "disconnected"]);
}

// ============================================================================
// Scored results across the wire
// ============================================================================

#[tokio::test]
async fn test_remote_match_results_pass_through_unscored() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    let results = vec![MatchResult {
        gig: remote_gig("r-1", "Remote gig"),
        match_score: 87,
    }];

    let _mock = server
        .mock("GET", "/gigs/matching/user123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&results).unwrap())
        .create_async()
        .await;

    let gateway = GigCatalogGateway::new(server.url(), Arc::new(ResultCache::new()));
    let fetched = gateway
        .get_matching_gigs(&create_profile(), &GigFilters::default())
        .await;

    // Server-computed scores are returned unchanged
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].match_score, 87);
}
