use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use ferrum_lab_server::{api::create_router, AppState, Config};
use ferrum_labs::{ReferenceRow, ReferenceSource, StaticSource};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub const BOUNDARY: &str = "labtestboundary7MA4YWxkTrZu0gW";

pub const ORU: &str = "MSH|^~\\&|LAB|HOSP|EHR|HOSP|202401011200||ORU^R01|MSG0001|P|2.5\r\
PID|1||12345^^^HOSP^MR||DOE^JANE\r\
OBR|1|||24323-8^Comprehensive metabolic panel^LN\r\
OBX|1|NM|2345-7^Glucose^LN||120|mg/dL^milligrams per deciliter^UCUM|70-100|H|||F\r\
OBX|2|ST|2951-2^Sodium^LN||pending|mmol/L||||F\r\
OBX|3|NM|2951-2^Sodium^LN||140|mmol/L|135-145|N|||F\r\
OBX|4|NM|718-7^Hemoglobin^LN||13.5|g/dL|12-16|N|||F\r";

pub fn reference_rows() -> Vec<ReferenceRow> {
    vec![
        ReferenceRow::new("2345-7;XYZ", "mg/dL;MG/DL", "70", "100"),
        ReferenceRow::new("2951-2", "mmol/L", "135", "145"),
    ]
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_source(Arc::new(StaticSource::new(reference_rows())))
    }

    pub fn with_source(source: Arc<dyn ReferenceSource>) -> Self {
        Self::with_config(Config::default(), source)
    }

    pub fn with_config(config: Config, source: Arc<dyn ReferenceSource>) -> Self {
        Self::from_state(AppState::with_source(config, source))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = create_router(state.clone());
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };
        (status, headers, json)
    }

    pub async fn upload(&self, field_name: &str, content: &[u8]) -> (StatusCode, Value) {
        let (status, _, json) = self.send(upload_request(field_name, content)).await;
        (status, json)
    }
}

/// A `multipart/form-data` POST to `/upload` with one file part.
pub fn upload_request(field_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"result.hl7\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("valid request")
}
