//! Input selection and the batch loop.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::TextPainter;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::{InputConfig, ViewerConfig};
use crate::frame::{render_frame, FrameOutcome};
use crate::output::OutputMode;

/// The first `max_files` rasters of a directory, in file-name order.
#[derive(Debug, Clone)]
pub struct InputSelection {
    dir: PathBuf,
    suffix: String,
    max_files: usize,
}

impl InputSelection {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            suffix: ".nc".to_string(),
            max_files,
        }
    }

    pub fn from_config(input: &InputConfig) -> Self {
        Self {
            dir: input.dir.clone(),
            suffix: input.suffix.clone(),
            max_files: input.max_files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files whose name ends with the suffix, sorted by name.
    ///
    /// Each call rescans the directory, so the selection can be restarted.
    pub fn iter(&self) -> Result<impl Iterator<Item = PathBuf>> {
        anyhow::ensure!(
            self.dir.is_dir(),
            "Input directory {:?} does not exist or is not a directory",
            self.dir
        );

        let suffix = self.suffix.clone();
        let entries = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(suffix.as_str()))
            })
            .map(|entry| entry.into_path())
            .take(self.max_files);

        Ok(entries)
    }
}

/// Counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rendered: usize,
    pub no_data: usize,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.rendered + self.no_data + self.failed.len()
    }
}

/// Render and emit every selected file.
///
/// The first failure aborts the batch unless `output.keep_going` is set,
/// in which case failures are logged and collected in the summary.
pub fn run_batch(config: &ViewerConfig, text: &TextPainter) -> Result<BatchSummary> {
    let selection = InputSelection::from_config(&config.input);
    let sink = OutputMode::from_config(&config.output);
    let mut summary = BatchSummary::default();

    info!(
        dir = %selection.dir().display(),
        max_files = config.input.max_files,
        dpi = config.render_dpi(),
        "Starting batch"
    );

    for path in selection.iter()? {
        let result = render_frame(&path, config, text).and_then(|outcome| match outcome {
            FrameOutcome::Rendered(frame) => sink.emit(&frame).map(|_| true),
            FrameOutcome::NoData => Ok(false),
        });

        match result {
            Ok(true) => summary.rendered += 1,
            Ok(false) => summary.no_data += 1,
            Err(e) if config.output.keep_going => {
                error!(file = %path.display(), error = %format!("{:#}", e), "Failed to process file");
                summary.failed.push(path);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to process {}", path.display()));
            }
        }
    }

    info!(
        rendered = summary.rendered,
        no_data = summary.no_data,
        failed = summary.failed.len(),
        "Batch complete"
    );
    Ok(summary)
}
