//! Upload handler for ORU messages.

use crate::{state::AppState, Error, Result};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use ferrum_labs::ClassifiedObservation;
use serde::Serialize;

/// Multipart part carrying the message.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub results: Vec<ClassifiedObservation>,
}

/// Classify the observations of an uploaded ORU message.
///
/// A request that is not `multipart/form-data`, or has no `file` part, is
/// answered like an upload without a file.
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Upload is not a multipart request");
        Error::MissingFile
    })?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            tracing::debug!(file_name = ?file_name, size = bytes.len(), "Received upload");
            file = Some(bytes);
            break;
        }
    }
    let content = file.ok_or(Error::MissingFile)?;

    let index = state.reference.get().await?;
    let results = ferrum_labs::analyze_bytes(&content, &index)?;

    tracing::info!(
        results = results.len(),
        abnormal = results.iter().filter(|r| r.is_abnormal).count(),
        "Upload classified"
    );

    Ok(Json(UploadResponse { results }))
}
