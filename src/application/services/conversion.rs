//! Conversion service
//!
//! Runs one conversion end to end: load rows, build the forest, render it,
//! and optionally persist the rendered text.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::application::loader::{LoaderOptions, RowLoader};
use crate::application::render::Format;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    ConversionObserver, DepthPolicy, ForestArena, TracingObserver, TreeBuilder, TreeNode,
};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Parameters of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub input_filename: PathBuf,
    /// Single ASCII character separating cells
    pub delimiter: String,
    pub skip_header: usize,
    pub skip_columns: usize,
    pub depth_policy: DepthPolicy,
}

impl ConverterConfig {
    pub fn new(
        input_filename: impl Into<PathBuf>,
        delimiter: impl Into<String>,
        skip_header: usize,
        skip_columns: usize,
    ) -> Self {
        Self {
            input_filename: input_filename.into(),
            delimiter: delimiter.into(),
            skip_header,
            skip_columns,
            depth_policy: DepthPolicy::default(),
        }
    }

    pub fn with_depth_policy(mut self, depth_policy: DepthPolicy) -> Self {
        self.depth_policy = depth_policy;
        self
    }

    /// Fails on a delimiter that is not one ASCII character.
    pub fn validate(&self) -> ApplicationResult<()> {
        LoaderOptions::delimiter_byte(&self.delimiter).map(|_| ())
    }

    pub fn loader_options(&self) -> ApplicationResult<LoaderOptions> {
        Ok(LoaderOptions {
            delimiter: LoaderOptions::delimiter_byte(&self.delimiter)?,
            skip_header: self.skip_header,
            skip_columns: self.skip_columns,
        })
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub format: Format,
    pub text: String,
    pub forest: Vec<TreeNode>,
}

/// Service running conversions against a filesystem.
pub struct ConversionService {
    fs: Arc<dyn FileSystem>,
}

impl ConversionService {
    /// Create a new conversion service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load the input and build its forest.
    #[instrument(level = "debug", skip(self, observer), fields(input = %config.input_filename.display()))]
    pub fn build_forest(
        &self,
        config: &ConverterConfig,
        observer: &dyn ConversionObserver,
    ) -> ApplicationResult<ForestArena> {
        let options = config.loader_options()?;
        let rows = RowLoader::new(Arc::clone(&self.fs)).load(&config.input_filename, &options)?;
        observer.rows_loaded(&config.input_filename, rows.len());

        let forest = TreeBuilder::new(config.depth_policy).build(&rows, observer)?;
        debug!(
            "forest: {} roots, {} nodes, height {}",
            forest.roots().len(),
            forest.len(),
            forest.height()
        );
        Ok(forest)
    }

    /// Convert the configured input and render it as `format`.
    pub fn run(
        &self,
        config: &ConverterConfig,
        format: Format,
        observer: &dyn ConversionObserver,
    ) -> ApplicationResult<RenderedOutput> {
        let forest = self.build_forest(config, observer)?;
        let text = format.render(&forest)?;
        info!(
            "converted {} to {} ({} nodes)",
            config.input_filename.display(),
            format,
            forest.len()
        );
        Ok(RenderedOutput {
            format,
            text,
            forest: forest.to_tree_nodes(),
        })
    }

    /// Persist rendered text, creating parent directories as needed.
    pub fn write(&self, text: &str, output_path: &Path) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(output_path)
            .with_path_context("create output directory", output_path)?;
        self.fs
            .write(output_path, text)
            .with_path_context("write output", output_path)?;
        debug!("wrote {} bytes to {}", text.len(), output_path.display());
        Ok(())
    }
}

/// Run one conversion on the real filesystem.
///
/// Every error, including a missing input file, is returned to the caller.
pub fn run_conversion(
    config: &ConverterConfig,
    format: Format,
    observer: &dyn ConversionObserver,
) -> ApplicationResult<RenderedOutput> {
    ConversionService::new(Arc::new(RealFileSystem)).run(config, format, observer)
}

/// Stateful converter holding the latest forest and its rendering.
///
/// A missing input file is reported to the observer and leaves an empty
/// forest; any other failure clears partial state and is returned.
pub struct Converter {
    config: ConverterConfig,
    format: Format,
    service: ConversionService,
    observer: Box<dyn ConversionObserver>,
    forest: Vec<TreeNode>,
    rendered: String,
}

impl Converter {
    pub fn new(config: ConverterConfig, format: Format) -> Self {
        Self::with_deps(
            config,
            format,
            Arc::new(RealFileSystem),
            Box::new(TracingObserver),
        )
    }

    /// Create a converter with custom dependencies (for testing).
    pub fn with_deps(
        config: ConverterConfig,
        format: Format,
        fs: Arc<dyn FileSystem>,
        observer: Box<dyn ConversionObserver>,
    ) -> Self {
        Self {
            config,
            format,
            service: ConversionService::new(fs),
            observer,
            forest: Vec::new(),
            rendered: String::new(),
        }
    }

    /// Rebuild the forest and rendered text from the input file.
    pub fn convert(&mut self) -> ApplicationResult<()> {
        self.forest.clear();
        self.rendered.clear();

        match self
            .service
            .run(&self.config, self.format, self.observer.as_ref())
        {
            Ok(output) => {
                self.forest = output.forest;
                self.rendered = output.text;
                Ok(())
            }
            Err(e) if e.is_missing_input() => {
                self.observer.input_missing(&self.config.input_filename);
                self.rendered = self.format.render(&ForestArena::new())?;
                Ok(())
            }
            Err(e) => {
                error!("conversion of {} failed: {}", self.config.input_filename.display(), e);
                Err(e)
            }
        }
    }

    /// Write the latest rendering to `output_path`.
    pub fn write(&self, output_path: &Path) -> ApplicationResult<()> {
        self.service.write(&self.rendered, output_path)
    }

    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}
