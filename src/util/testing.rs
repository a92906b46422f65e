//! Shared helpers for unit and integration tests.

use std::cell::RefCell;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ConversionObserver, NodeData};

static TEST_SETUP: Once = Once::new();

/// Two-level catalogue: one root with one child, preceded by a header line.
pub const SAMPLE_CSV: &str = "\
label,Id,link,label,Id,link
Meat & Fish,179549,browse/179549,,,
Meat & Fish,179549,browse/179549,Fish,176741,browse/179549/176741
";

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "tabtree=trace");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Write `content` to `dir/name` and return the full path.
pub fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create input directory");
    }
    std::fs::write(&path, content).expect("write input file");
    path
}

/// Observer event, as captured by `RecordingObserver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    RowsLoaded(usize),
    NodeAdded { row: usize, depth: usize, label: String },
    RowSkipped { row: usize, reason: String },
    InputMissing(PathBuf),
}

/// Observer that records every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.borrow().clone()
    }

    pub fn skipped_rows(&self) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::RowSkipped { row, .. } => Some(*row),
                _ => None,
            })
            .collect()
    }
}

impl ConversionObserver for RecordingObserver {
    fn rows_loaded(&self, _path: &Path, count: usize) {
        self.events.borrow_mut().push(ObservedEvent::RowsLoaded(count));
    }

    fn node_added(&self, row: usize, depth: usize, data: &NodeData) {
        self.events.borrow_mut().push(ObservedEvent::NodeAdded {
            row,
            depth,
            label: data.label.clone(),
        });
    }

    fn row_skipped(&self, row: usize, reason: &str) {
        self.events.borrow_mut().push(ObservedEvent::RowSkipped {
            row,
            reason: reason.to_string(),
        });
    }

    fn input_missing(&self, path: &Path) {
        self.events
            .borrow_mut()
            .push(ObservedEvent::InputMissing(path.to_path_buf()));
    }
}
