//! Error types for the lab result server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Message parse error: {0}")]
    Parse(#[from] ferrum_hl7::ParseError),

    #[error("Reference table error: {0}")]
    Reference(ferrum_labs::Error),
}

impl From<ferrum_labs::Error> for Error {
    fn from(err: ferrum_labs::Error) -> Self {
        match err {
            ferrum_labs::Error::Parse(e) => Error::Parse(e),
            other => Error::Reference(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Error::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Multipart(e) => (e.status(), self.to_string()),
            Error::Parse(_) => {
                tracing::error!(error = %self, "Error during processing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse ORU file".to_string(),
                )
            }
            Error::Reference(_) => {
                tracing::error!(error = %self, "Reference table unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to load reference table".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
