//! Middleware stack for the API

pub mod layers;
pub mod request_id;

// Re-export public API
pub use layers::{compression, cors};
pub use request_id::request_id_middleware;
