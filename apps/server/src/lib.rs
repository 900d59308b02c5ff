//! Lab result server
//!
//! Accepts HL7 v2 ORU uploads and reports each observation with its
//! reference range and an abnormal flag:
//! - `POST /upload` with a multipart `file` part
//! - Reference table loaded once on first use and shared across requests
//! - Configurable CORS, body size limit and logging

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod reference;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
