//! Lab result routes

use crate::api::handlers::labs;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn lab_routes() -> Router<AppState> {
    Router::new().route("/upload", post(labs::upload))
}
