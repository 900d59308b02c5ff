//! Shared application state

use crate::config::Config;
use crate::reference::CsvFileSource;
use ferrum_labs::{ReferenceIndexCell, ReferenceSource};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Loaded on the first upload, then shared read-only
    pub reference: Arc<ReferenceIndexCell>,
}

impl AppState {
    /// State reading the reference table from `config.reference.path`.
    pub fn new(config: Config) -> Self {
        let source = Arc::new(CsvFileSource::new(config.reference.path.clone()));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            config: Arc::new(config),
            reference: Arc::new(ReferenceIndexCell::new(source)),
        }
    }
}
