// HTTP gateway and feed transport against an in-process fake service

mod common;

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine as _;
use common::{Event, RecordingSurface};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use signbridge::{
    CommandOutcome, FeedTransport, GatewayError, HttpFeedTransport, HttpGateway, SessionConfig,
    SessionController, SessionService, SessionState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral port and return its base URL
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
}

#[derive(Default)]
struct FakeService {
    converted: Mutex<Vec<String>>,
    busters: Mutex<Vec<String>>,
    recording: Mutex<bool>,
}

#[derive(Deserialize)]
struct ConvertBody {
    text: String,
}

#[derive(Deserialize)]
struct FeedQuery {
    t: String,
}

async fn start_recording(State(fake): State<Arc<FakeService>>) -> impl IntoResponse {
    *fake.recording.lock() = true;
    Json(json!({"status": "success", "message": "Recording started"}))
}

async fn stop_recording(State(fake): State<Arc<FakeService>>) -> impl IntoResponse {
    *fake.recording.lock() = false;
    Json(json!({
        "status": "success",
        "raw_text": "H E L O",
        "meaningful_sentence": "HELLO",
    }))
}

async fn current_prediction() -> impl IntoResponse {
    Json(json!({"prediction": "L"}))
}

async fn convert_text(
    State(fake): State<Arc<FakeService>>,
    Json(body): Json<ConvertBody>,
) -> impl IntoResponse {
    fake.converted.lock().push(body.text.clone());
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG");
    let images: Vec<_> = body
        .text
        .chars()
        .map(|c| {
            if c == ' ' {
                json!({"character": "space", "image": null})
            } else {
                json!({"character": c.to_ascii_uppercase().to_string(), "image": encoded})
            }
        })
        .collect();
    Json(json!({"status": "success", "images": images}))
}

async fn video_feed(
    State(fake): State<Arc<FakeService>>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    fake.busters.lock().push(query.t);
    let frame: &'static [u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n\xff\xd8\xff\xd9\r\n";
    (
        [(CONTENT_TYPE, "multipart/x-mixed-replace; boundary=frame")],
        frame,
    )
}

fn fake_router(fake: Arc<FakeService>) -> Router {
    Router::new()
        .route("/start_recording", post(start_recording))
        .route("/stop_recording", post(stop_recording))
        .route("/get_current_prediction", get(current_prediction))
        .route("/convert_text", post(convert_text))
        .route("/video_feed", get(video_feed))
        .route(
            "/health",
            get(|| async {
                Json(json!({"status": "healthy", "model_loaded": true, "rate_limiting": true}))
            }),
        )
        .route(
            "/speak_text",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "status": "error",
                        "message": "No text available to speak. Please record some signs first."
                    })),
                )
            }),
        )
        .with_state(fake)
}

#[tokio::test]
async fn test_session_round_trip() {
    let fake = Arc::new(FakeService::default());
    let url = serve(fake_router(fake.clone())).await;
    let gateway = gateway(&url);

    gateway.start_session().await.unwrap();
    assert!(*fake.recording.lock());

    assert_eq!(gateway.current_prediction().await.unwrap(), "L");

    let summary = gateway.stop_session().await.unwrap();
    assert_eq!(summary.meaningful_sentence.as_deref(), Some("HELLO"));
    assert_eq!(summary.raw_text.as_deref(), Some("H E L O"));
    assert!(!*fake.recording.lock());
}

#[tokio::test]
async fn test_convert_text_decodes_artifacts() {
    let fake = Arc::new(FakeService::default());
    let url = serve(fake_router(fake.clone())).await;
    let gateway = gateway(&url);

    let sequence = gateway.convert_text("hi you").await.unwrap();
    assert_eq!(fake.converted.lock().as_slice(), ["hi you"]);
    assert_eq!(sequence.len(), 6);
    assert_eq!(sequence.spelled(), "HI YOU");

    assert_eq!(sequence[0].label, "H");
    assert_eq!(sequence[0].payload.as_deref(), Some(&b"\x89PNG"[..]));
    assert!(sequence[2].is_separator());
    assert!(sequence[2].payload.is_none());
}

#[tokio::test]
async fn test_health_probe() {
    let url = serve(fake_router(Arc::default())).await;
    let health = gateway(&url).health().await.unwrap();

    assert!(health.healthy);
    assert!(health.model_loaded);
    assert!(health.rate_limiting);
}

#[tokio::test]
async fn test_error_status_with_message_is_rejection() {
    let url = serve(fake_router(Arc::default())).await;

    let err = gateway(&url).speak().await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Rejected("No text available to speak. Please record some signs first.".to_string())
    );
}

#[tokio::test]
async fn test_success_status_with_error_envelope_is_rejection() {
    let router = Router::new().route(
        "/start_recording",
        post(|| async { Json(json!({"status": "error", "message": "Model not loaded"})) }),
    );
    let url = serve(router).await;

    let err = gateway(&url).start_session().await.unwrap_err();
    assert_eq!(err, GatewayError::Rejected("Model not loaded".to_string()));
}

#[tokio::test]
async fn test_bare_server_error_is_transport_failure() {
    let router = Router::new().route(
        "/stop_recording",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = serve(router).await;

    let err = gateway(&url).stop_session().await.unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let router = Router::new().route(
        "/get_current_prediction",
        get(|| async { "<html>not json</html>" }),
    );
    let url = serve(router).await;

    let err = gateway(&url).current_prediction().await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_bad_base64_is_malformed() {
    let router = Router::new().route(
        "/convert_text",
        post(|| async {
            Json(json!({
                "status": "success",
                "images": [{"character": "A", "image": "***not base64***"}]
            }))
        }),
    );
    let url = serve(router).await;

    let err = gateway(&url).convert_text("a").await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    // Reserve a port, then close it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{}", addr))
        .start_session()
        .await
        .unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);
}

#[tokio::test]
async fn test_feed_transport_loads_first_frame() {
    let fake = Arc::new(FakeService::default());
    let url = serve(fake_router(fake.clone())).await;
    let transport = HttpFeedTransport::new(&url, "/video_feed", Duration::from_secs(2)).unwrap();

    transport.load("1700000000000-1").await.unwrap();
    transport.load("1700000000500-2").await.unwrap();

    assert_eq!(
        fake.busters.lock().as_slice(),
        ["1700000000000-1", "1700000000500-2"]
    );
    assert_eq!(transport.feed_url(), format!("{}/video_feed", url));
}

#[tokio::test]
async fn test_feed_transport_fails_on_error_status() {
    let router = Router::new().route(
        "/video_feed",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "camera offline") }),
    );
    let url = serve(router).await;
    let transport = HttpFeedTransport::new(&url, "/video_feed", Duration::from_secs(2)).unwrap();

    let err = transport.load("1-1").await.unwrap_err();
    assert!(err.to_string().contains("503"), "got {:#}", err);
}

#[tokio::test]
async fn test_controller_over_http() {
    let fake = Arc::new(FakeService::default());
    let url = serve(fake_router(fake.clone())).await;
    let surface = RecordingSurface::new();
    let controller = SessionController::new(
        Arc::new(gateway(&url)),
        surface.clone(),
        surface.clone(),
        SessionConfig {
            poll_interval_ms: 50,
        },
    );

    assert_eq!(controller.start().await, CommandOutcome::Applied);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(controller.stop().await, CommandOutcome::Applied);

    assert_eq!(controller.state(), SessionState::Idle);
    assert!(!surface.predictions().is_empty());
    assert!(surface.predictions().iter().all(|p| p == "L"));
    assert_eq!(
        surface.events().last(),
        Some(&Event::SessionStopped("HELLO".to_string()))
    );
}
