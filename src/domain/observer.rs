//! Conversion observer: receives progress events from loader and builder.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::domain::entities::NodeData;

/// Hooks invoked while a conversion runs. All methods default to no-ops.
pub trait ConversionObserver {
    fn rows_loaded(&self, _path: &Path, _count: usize) {}

    fn node_added(&self, _row: usize, _depth: usize, _data: &NodeData) {}

    fn row_skipped(&self, _row: usize, _reason: &str) {}

    fn input_missing(&self, _path: &Path) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ConversionObserver for TracingObserver {
    fn rows_loaded(&self, path: &Path, count: usize) {
        info!("loaded {} rows from {}", count, path.display());
    }

    fn node_added(&self, row: usize, depth: usize, data: &NodeData) {
        debug!("row {}: depth {} -> {}", row, depth, data);
    }

    fn row_skipped(&self, row: usize, reason: &str) {
        warn!("row {} skipped: {}", row, reason);
    }

    fn input_missing(&self, path: &Path) {
        error!("input file missing: {}", path.display());
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ConversionObserver for NullObserver {}

/// Lets a caller hand a shared observer to a `Converter` and keep a handle
/// to read it back after the run.
impl<T: ConversionObserver + ?Sized> ConversionObserver for std::rc::Rc<T> {
    fn rows_loaded(&self, path: &Path, count: usize) {
        (**self).rows_loaded(path, count)
    }

    fn node_added(&self, row: usize, depth: usize, data: &NodeData) {
        (**self).node_added(row, depth, data)
    }

    fn row_skipped(&self, row: usize, reason: &str) {
        (**self).row_skipped(row, reason)
    }

    fn input_missing(&self, path: &Path) {
        (**self).input_missing(path)
    }
}
