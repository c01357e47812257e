use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use guia_export::brand::BrandMark;
use guia_export::document::DocumentAssembler;
use guia_export::error::ExportError;
use guia_export::pdf::{BoxFuture, PdfEngine, RenderJob};
use guia_export::pipeline::Pipeline;
use guia_export::styles::{PrintLayout, Theme};
use guia_server::config::ServerConfig;
use guia_server::middleware::rate_limit::RateLimiter;
use guia_server::state::AppState;

/// Returns a canned PDF whose body encodes the requested orientation, or a
/// fixed failure.
#[derive(Default)]
struct FakeEngine {
    calls: AtomicUsize,
    fail: bool,
}

impl PdfEngine for FakeEngine {
    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<Vec<u8>, ExportError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExportError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()));
            }
            Ok(format!("%PDF-1.4 {}x{}", job.dimensions.width, job.dimensions.height).into_bytes())
        })
    }
}

fn app_with(engine: Arc<FakeEngine>, limit: u32) -> Router {
    let config = ServerConfig::default();
    let assembler = DocumentAssembler::new(Theme::default(), PrintLayout::default()).unwrap();
    let pipeline =
        Pipeline::new(assembler, engine, &BrandMark::Wordmark, Duration::from_secs(5)).unwrap();
    let limiter = RateLimiter::new(limit, Duration::from_secs(60));
    guia_server::router(AppState::new(pipeline, limiter), &config).unwrap()
}

fn export_request(body: &str, client: [u8; 4]) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((client, 40000))));
    req
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let app = app_with(Arc::new(FakeEngine::default()), 5);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "PDF export service is running");
}

#[tokio::test]
async fn export_returns_pdf_attachment() {
    let engine = Arc::new(FakeEngine::default());
    let app = app_with(engine.clone(), 5);

    let response = app
        .oneshot(export_request(
            r#"{"html_content": "<h1>Test</h1><p>This is a test.</p>", "orientation": "portrait"}"#,
            [10, 0, 0, 1],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"guia-comunidadfeliz.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 794x1123");
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn landscape_request_renders_landscape_viewport() {
    let app = app_with(Arc::new(FakeEngine::default()), 5);

    let response = app
        .oneshot(export_request(
            r#"{"html_content": "<p>x</p>", "orientation": "landscape"}"#,
            [10, 0, 0, 1],
        ))
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 1123x794");
}

#[tokio::test]
async fn unknown_orientation_falls_back_to_portrait() {
    let app = app_with(Arc::new(FakeEngine::default()), 5);

    let response = app
        .oneshot(export_request(
            r#"{"html_content": "<p>x</p>", "orientation": "diagonal"}"#,
            [10, 0, 0, 1],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 794x1123");
}

#[tokio::test]
async fn render_failure_returns_detail() {
    let engine = Arc::new(FakeEngine {
        fail: true,
        ..Default::default()
    });
    let app = app_with(engine, 5);

    let response = app
        .oneshot(export_request(r#"{"html_content": "<p>x</p>"}"#, [10, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(
        json["detail"],
        "page navigation failed: net::ERR_NAME_NOT_RESOLVED"
    );
}

#[tokio::test]
async fn missing_html_content_is_a_validation_error() {
    let engine = Arc::new(FakeEngine::default());
    let app = app_with(engine.clone(), 5);

    let response = app
        .oneshot(export_request(r#"{"orientation": "portrait"}"#, [10, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("html_content"));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sixth_request_in_a_minute_is_rate_limited() {
    let engine = Arc::new(FakeEngine::default());
    let app = app_with(engine.clone(), 5);
    let body = r#"{"html_content": "<p>x</p>"}"#;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(export_request(body, [10, 0, 0, 7]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(export_request(body, [10, 0, 0, 7]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Rate limit exceeded: 5 per 1 minute");

    // Rejected before any rendering attempt.
    assert_eq!(engine.calls.load(Ordering::SeqCst), 5);

    // Another client still gets through.
    let response = app
        .oneshot(export_request(body, [10, 0, 0, 8]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_check_is_not_rate_limited() {
    let app = app_with(Arc::new(FakeEngine::default()), 1);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = app_with(Arc::new(FakeEngine::default()), 5);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/export")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
