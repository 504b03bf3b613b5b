//! Integration tests against a mock mixing engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use faderdeck::{
    ApiClient, ApiError, ChannelKey, Console, ConsoleSettings, ElementRole, LinkStatus, UserAction,
};
use faderdeck_types::{ChannelDescriptor, ChannelState, Group, StateSnapshot};

#[derive(Default)]
struct MockEngine {
    /// Every command received, e.g. "gain I/1 -10"
    requests: Vec<String>,
    /// Answer everything with 500
    reject: bool,
    /// Status sent with otherwise successful replies (200 when unset)
    status: Option<StatusCode>,
    /// Body returned by the gain endpoint instead of the requested value
    gain_echo: Option<String>,
    /// Raw body returned by the poll endpoint instead of `snapshot`
    snapshot_body: Option<String>,
    snapshot: StateSnapshot,
}

type SharedEngine = Arc<Mutex<MockEngine>>;

async fn poll_state(State(engine): State<SharedEngine>, Path(_device): Path<u8>) -> Response {
    let engine = engine.lock().unwrap();
    if engine.reject {
        return (StatusCode::INTERNAL_SERVER_ERROR, "busy").into_response();
    }
    let status = engine.status.unwrap_or(StatusCode::OK);
    match &engine.snapshot_body {
        Some(body) => (status, body.clone()).into_response(),
        None => (status, Json(engine.snapshot.clone())).into_response(),
    }
}

async fn set_gain(
    State(engine): State<SharedEngine>,
    Path((_device, group, index)): Path<(u8, String, u32)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut engine = engine.lock().unwrap();
    let value = query.get("value").cloned().unwrap_or_default();
    engine
        .requests
        .push(format!("gain {}/{} {}", group, index, value));
    if engine.reject {
        return (StatusCode::INTERNAL_SERVER_ERROR, "busy").into_response();
    }
    let status = engine.status.unwrap_or(StatusCode::OK);
    (status, engine.gain_echo.clone().unwrap_or(value)).into_response()
}

async fn set_mute(
    State(engine): State<SharedEngine>,
    Path((_device, group, index)): Path<(u8, String, u32)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut engine = engine.lock().unwrap();
    let value = query.get("value").cloned().unwrap_or_default();
    engine
        .requests
        .push(format!("mute {}/{} {}", group, index, value));
    if engine.reject {
        return (StatusCode::INTERNAL_SERVER_ERROR, "busy").into_response();
    }
    let status = engine.status.unwrap_or(StatusCode::OK);
    (status, if value == "1" { "true" } else { "false" }).into_response()
}

/// Start the mock engine on an ephemeral port and return its base URL.
async fn spawn_engine(engine: SharedEngine) -> String {
    let app = Router::new()
        .route("/{device}", get(poll_state))
        .route("/{device}/{group}/{index}/gain", get(set_gain))
        .route("/{device}/{group}/{index}/mute", get(set_mute))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn input(index: u32) -> ChannelKey {
    ChannelKey::new(Group::Input, index).unwrap()
}

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        heartbeat_interval: Duration::from_millis(50),
        ..Default::default()
    }
}

/// Console with one rendered input channel at -10 dB, unmuted.
async fn console_with_engine(engine: &SharedEngine) -> Console {
    let url = spawn_engine(engine.clone()).await;
    let mut console = Console::new(ApiClient::new(url, 0), settings());
    console.render(vec![(
        input(1),
        ChannelDescriptor {
            label: "Lectern".to_string(),
            gain: -10.0,
            muted: false,
        },
    )]);
    console
}

/// Apply replies until `expected` have been handled.
async fn settle(console: &mut Console, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut handled = 0;
    while handled < expected {
        assert!(Instant::now() < deadline, "timed out waiting for replies");
        handled += console.process_messages();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn requests(engine: &SharedEngine) -> Vec<String> {
    engine.lock().unwrap().requests.clone()
}

#[tokio::test]
async fn test_set_gain_returns_engine_echo() {
    let engine = SharedEngine::default();
    let url = spawn_engine(engine.clone()).await;
    let api = ApiClient::new(url, 0);

    let confirmed = api.set_gain(&input(1), -10).await.unwrap();

    assert_eq!(confirmed, -10.0);
    assert_eq!(requests(&engine), vec!["gain I/1 -10"]);
}

#[tokio::test]
async fn test_gain_echo_outside_range_is_displayed() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().gain_echo = Some("42\n".to_string());
    let mut console = console_with_engine(&engine).await;

    console.dispatcher_mut().set_gain(&input(1), 30);
    settle(&mut console, 1).await;

    let panel = console.surface().panel(&input(1)).unwrap();
    assert_eq!(panel.gain(), 42.0);
    assert_eq!(panel.fader_label(), "42db");
}

#[tokio::test]
async fn test_slider_commit_sends_committed_value() {
    let engine = SharedEngine::default();
    let mut console = console_with_engine(&engine).await;

    console.perform(UserAction::SliderCommitted(input(1), -12.0));
    settle(&mut console, 1).await;

    assert_eq!(requests(&engine), vec!["gain I/1 -12"]);
    assert_eq!(console.surface().panel(&input(1)).unwrap().gain(), -12.0);
}

#[tokio::test]
async fn test_reset_always_requests_unity() {
    let engine = SharedEngine::default();
    let mut console = console_with_engine(&engine).await;

    console.perform(UserAction::SliderCommitted(input(1), 12.0));
    settle(&mut console, 1).await;
    assert_eq!(console.surface().panel(&input(1)).unwrap().gain(), 12.0);

    console.perform(UserAction::ResetGain(input(1)));
    settle(&mut console, 1).await;

    assert_eq!(requests(&engine), vec!["gain I/1 12", "gain I/1 0"]);
    let slider = input(1).element(ElementRole::Slider);
    assert_eq!(console.surface().text(&slider).as_deref(), Some("0"));
}

#[tokio::test]
async fn test_rejected_gain_leaves_display() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().reject = true;
    let mut console = console_with_engine(&engine).await;
    let before = console.surface().clone();

    console.dispatcher_mut().set_gain(&input(1), 5);
    settle(&mut console, 1).await;

    assert_eq!(console.surface(), &before);
    assert_eq!(requests(&engine), vec!["gain I/1 5"]);
}

#[tokio::test]
async fn test_non_ok_success_codes_are_rejections() {
    let engine = SharedEngine::default();
    let mut console = console_with_engine(&engine).await;
    let before = console.surface().clone();

    {
        let mut engine = engine.lock().unwrap();
        engine.status = Some(StatusCode::ACCEPTED);
        engine.gain_echo = Some("7".to_string());
    }
    console.perform(UserAction::OffPressed(input(1)));
    console.perform(UserAction::SliderCommitted(input(1), 3.0));
    settle(&mut console, 2).await;
    assert_eq!(console.surface(), &before);

    engine.lock().unwrap().status = Some(StatusCode::CREATED);
    console.perform(UserAction::SliderCommitted(input(1), 3.0));
    settle(&mut console, 1).await;
    assert_eq!(console.surface(), &before);

    let panel = console.surface().panel(&input(1)).unwrap();
    assert!(panel.lamp().on_lit());
    assert_eq!(panel.gain(), -10.0);
}

#[tokio::test]
async fn test_no_content_poll_is_rejected() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().status = Some(StatusCode::NO_CONTENT);
    let url = spawn_engine(engine.clone()).await;

    let result = ApiClient::new(url, 0).fetch_state().await;
    assert!(matches!(result, Err(ApiError::Http(204, _))));
}

#[tokio::test]
async fn test_non_numeric_gain_reply_leaves_display() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().gain_echo = Some("OK".to_string());
    let url = spawn_engine(engine.clone()).await;

    let result = ApiClient::new(url, 0).set_gain(&input(1), 5).await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing listens on port 1
    let api = ApiClient::new("http://127.0.0.1:1", 0);

    let result = api.set_gain(&input(1), 0).await;
    assert!(matches!(result, Err(ApiError::Network(_))));

    let result = api.fetch_state().await;
    assert!(matches!(result, Err(ApiError::Network(_))));
}

#[tokio::test]
async fn test_mute_commands_toggle_lamps() {
    let engine = SharedEngine::default();
    let mut console = console_with_engine(&engine).await;
    let on = input(1).element(ElementRole::On);
    let off = input(1).element(ElementRole::Off);

    console.perform(UserAction::OffPressed(input(1)));
    settle(&mut console, 1).await;
    assert_eq!(console.surface().class_name(&on).as_deref(), Some("on"));
    assert_eq!(console.surface().class_name(&off).as_deref(), Some("off lit"));

    console.perform(UserAction::OnPressed(input(1)));
    settle(&mut console, 1).await;
    assert_eq!(console.surface().class_name(&on).as_deref(), Some("on lit"));
    assert_eq!(console.surface().class_name(&off).as_deref(), Some("off"));

    assert_eq!(requests(&engine), vec!["mute I/1 1", "mute I/1 0"]);
}

#[tokio::test]
async fn test_rejected_mute_leaves_lamps() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().reject = true;
    let mut console = console_with_engine(&engine).await;

    console.perform(UserAction::OffPressed(input(1)));
    settle(&mut console, 1).await;

    assert!(console.surface().panel(&input(1)).unwrap().lamp().on_lit());
}

#[tokio::test]
async fn test_malformed_snapshot() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().snapshot_body = Some("not json".to_string());
    let url = spawn_engine(engine.clone()).await;

    let result = ApiClient::new(url, 0).fetch_state().await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_rejected_poll() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().reject = true;
    let url = spawn_engine(engine.clone()).await;

    let result = ApiClient::new(url, 0).fetch_state().await;
    assert_eq!(result, Err(ApiError::Http(500, "busy".to_string())));
}

#[tokio::test]
async fn test_heartbeat_bootstraps_and_reconciles() {
    let engine = SharedEngine::default();
    {
        let mut engine = engine.lock().unwrap();
        engine.snapshot.channels.insert(
            Group::Input,
            vec![
                ChannelState {
                    level: 21.3,
                    muted: false,
                    label: Some("Pulpit".to_string()),
                    gain: Some(-6.0),
                },
                ChannelState {
                    level: -4.0,
                    muted: true,
                    label: Some(String::new()),
                    gain: Some(0.0),
                },
            ],
        );
    }
    let url = spawn_engine(engine.clone()).await;
    let mut console = Console::new(ApiClient::new(url, 0), settings());

    console.start();
    settle(&mut console, 1).await;
    console.stop();

    let surface = console.surface();
    assert_eq!(surface.len(), 2);

    let first = surface.panel(&input(1)).unwrap();
    assert_eq!(first.label(), "Pulpit");
    assert_eq!(first.fader_label(), "-6db");
    assert_eq!(first.meter_text(), "21db");
    assert_eq!(
        surface
            .class_name(&input(1).element(ElementRole::Level))
            .as_deref(),
        Some("level red")
    );

    let second = surface.panel(&input(2)).unwrap();
    assert_eq!(second.label(), "Input 2");
    assert_eq!(second.meter_text(), "");
    assert!(second.lamp().off_lit());

    assert_eq!(console.link_status(), LinkStatus::Connected);
}

#[tokio::test]
async fn test_heartbeat_failures_mark_link_stale() {
    let engine = SharedEngine::default();
    engine.lock().unwrap().reject = true;
    let url = spawn_engine(engine.clone()).await;
    let mut console = Console::new(
        ApiClient::new(url, 0),
        ConsoleSettings {
            stale_after: 2,
            ..settings()
        },
    );

    console.start();
    settle(&mut console, 2).await;
    console.stop();

    assert!(matches!(console.link_status(), LinkStatus::Stale { .. }));
    assert!(!console.surface().is_rendered());
}
