mod support;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ferrum_lab_server::{AppState, Config};
use ferrum_labs::{ReferenceRow, ReferenceSource};
use serde_json::json;
use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use support::*;

#[tokio::test]
async fn upload_classifies_observations_in_message_order() {
    let app = TestApp::new();
    let (status, body) = app.upload("file", ORU.as_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "results": [
                {
                    "code": "2345-7",
                    "value": 120,
                    "units": "mg/dL",
                    "isAbnormal": true,
                    "range": "70 - 100"
                },
                {
                    "code": "2951-2",
                    "value": 140,
                    "units": "mmol/L",
                    "isAbnormal": false,
                    "range": "135 - 145"
                }
            ]
        })
    );
}

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.upload("attachment", ORU.as_bytes()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No file uploaded" }));
}

#[tokio::test]
async fn non_multipart_request_is_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(ORU))
        .unwrap();
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn empty_message_fails_to_parse() {
    let app = TestApp::new();
    let (status, body) = app.upload("file", b"  \r\n").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to parse ORU file" }));
}

#[tokio::test]
async fn message_without_obx_returns_no_results() {
    let app = TestApp::new();
    let (status, body) = app
        .upload("file", b"MSH|^~\\&|LAB\rPID|1||12345")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [] }));
}

struct FlakySource {
    loads: AtomicUsize,
}

#[async_trait]
impl ReferenceSource for FlakySource {
    async fn load_rows(&self) -> ferrum_labs::Result<Vec<ReferenceRow>> {
        if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ferrum_labs::Error::ReferenceSource("disk unavailable".into()));
        }
        Ok(reference_rows())
    }

    fn describe(&self) -> String {
        "flaky source".into()
    }
}

#[tokio::test]
async fn reference_load_failure_is_retried_on_next_upload() {
    let source = Arc::new(FlakySource {
        loads: AtomicUsize::new(0),
    });
    let app = TestApp::with_source(source.clone());

    let (status, body) = app.upload("file", ORU.as_bytes()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to load reference table" }));
    assert!(!app.state.reference.is_loaded());

    let (status, body) = app.upload("file", ORU.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    app.upload("file", ORU.as_bytes()).await;
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reference_table_is_read_from_configured_csv() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        csv,
        "oru_sonic_codes,oru_sonic_units,everlab_lower,everlab_higher\n718-7,g/dL,13.0,17.0"
    )
    .unwrap();

    let mut config = Config::default();
    config.reference.path = csv.path().to_path_buf();
    let app = TestApp::from_state(AppState::new(config));

    let (status, body) = app.upload("file", ORU.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["results"],
        json!([{
            "code": "718-7",
            "value": 13.5,
            "units": "g/dL",
            "isAbnormal": false,
            "range": "13.0 - 17.0"
        }])
    );
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.server.max_request_body_size = 64;
    let app = TestApp::with_config(
        config,
        Arc::new(ferrum_labs::StaticSource::new(reference_rows())),
    );

    let (status, _) = app.upload("file", ORU.as_bytes()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_and_root_report_status() {
    let app = TestApp::new();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "lab-server" }));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, _, body) = app.send(request).await;
    assert_eq!(body["referenceLoaded"], false);

    app.upload("file", ORU.as_bytes()).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, _, body) = app.send(request).await;
    assert_eq!(body["referenceLoaded"], true);
}

#[tokio::test]
async fn responses_carry_request_ids() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;

    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers["x-correlation-id"], "client-123");
}

#[tokio::test]
async fn any_origin_cors_by_default() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;

    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn listed_cors_origins_only() {
    let mut config = Config::default();
    config.server.cors_origins = vec!["http://lab.example".to_string()];
    let app = TestApp::with_config(
        config,
        Arc::new(ferrum_labs::StaticSource::new(reference_rows())),
    );

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://other.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;
    assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://lab.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://lab.example"
    );
}
