//! Reference index lifecycle.
//!
//! The index is loaded from a [`ReferenceSource`] on first use and then
//! shared read-only. [`ReferenceIndexCell`] runs at most one load at a time:
//! concurrent first callers wait for that load and reuse its result. A failed
//! load is not cached, so the next caller retries.

use crate::error::{Error, Result};
use crate::reference::{ReferenceRangeIndex, ReferenceRow};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Supplies reference table rows, in table order.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn load_rows(&self) -> Result<Vec<ReferenceRow>>;

    /// Human-readable origin of the rows, for logging.
    fn describe(&self) -> String;
}

/// Rows held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    rows: Vec<ReferenceRow>,
}

impl StaticSource {
    pub fn new(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl ReferenceSource for StaticSource {
    async fn load_rows(&self) -> Result<Vec<ReferenceRow>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.rows.len())
    }
}

pub struct ReferenceIndexCell {
    source: Arc<dyn ReferenceSource>,
    index: OnceCell<Arc<ReferenceRangeIndex>>,
}

impl ReferenceIndexCell {
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            source,
            index: OnceCell::new(),
        }
    }

    /// A cell that is already initialized with `index`.
    pub fn preloaded(index: ReferenceRangeIndex) -> Self {
        Self {
            source: Arc::new(StaticSource::default()),
            index: OnceCell::new_with(Some(Arc::new(index))),
        }
    }

    /// The index, loading it first if no load has succeeded yet.
    pub async fn get(&self) -> Result<Arc<ReferenceRangeIndex>> {
        self.index
            .get_or_try_init(|| async {
                let origin = self.source.describe();
                tracing::info!(source = %origin, "Loading reference table");

                let rows = self.source.load_rows().await.map_err(|e| {
                    tracing::error!(source = %origin, error = %e, "Failed to load reference table");
                    e
                })?;
                let index = ReferenceRangeIndex::new(rows);

                tracing::info!(
                    source = %origin,
                    rows = index.len(),
                    keys = index.key_count(),
                    "Reference table loaded"
                );
                Ok::<_, Error>(Arc::new(index))
            })
            .await
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }
}

impl std::fmt::Debug for ReferenceIndexCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceIndexCell")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
