//! Request handlers for API endpoints

pub mod labs;

pub use labs::*;
