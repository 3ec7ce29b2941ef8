//! Output sinks: an interactive window, an external viewer, or a directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{OutputConfig, OutputKind};
use crate::frame::RenderedFrame;
use crate::window::show_figure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Show the figure in a window and wait until it is closed. Writes nothing.
    Window,
    /// Write a preview PNG, run `command` on it and wait for it to exit.
    Viewer { preview_dir: PathBuf, command: String },
    /// Write `<dir>/<stem>.png`.
    Save { dir: PathBuf },
}

impl OutputMode {
    pub fn from_config(output: &OutputConfig) -> Self {
        match (output.mode, &output.viewer) {
            (OutputKind::Display, None) => OutputMode::Window,
            (OutputKind::Display, Some(command)) => OutputMode::Viewer {
                preview_dir: output
                    .preview_dir
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join("chla-viewer")),
                command: command.clone(),
            },
            (OutputKind::Save, _) => OutputMode::Save {
                dir: output.save_dir.clone(),
            },
        }
    }

    /// Hand the frame to the sink. Returns the PNG path when one was written.
    pub fn emit(&self, frame: &RenderedFrame) -> Result<Option<PathBuf>> {
        match self {
            OutputMode::Window => {
                let title = frame.stem();
                info!(figure = %title, "Showing figure; close the window to continue");
                show_figure(&title, &frame.figure)?;
                Ok(None)
            }
            OutputMode::Viewer {
                preview_dir,
                command,
            } => {
                let path = write_png(preview_dir, frame)?;
                open_viewer(command, &path)?;
                Ok(Some(path))
            }
            OutputMode::Save { dir } => {
                let path = write_png(dir, frame)?;
                info!(path = %path.display(), dpi = frame.figure.dpi, "Saved figure");
                Ok(Some(path))
            }
        }
    }
}

fn write_png(dir: &Path, frame: &RenderedFrame) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("{}.png", frame.stem()));
    let png = frame.figure.to_png().context("Failed to encode PNG")?;
    fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Run `command` with the image path appended and block until it exits.
///
/// A viewer that exits unsuccessfully is logged, not treated as a failure.
fn open_viewer(command: &str, image: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .with_context(|| format!("Empty viewer command {:?}", command))?;

    info!(viewer = program, path = %image.display(), "Opening preview");
    let status = Command::new(program)
        .args(parts)
        .arg(image)
        .status()
        .with_context(|| format!("Failed to launch viewer {:?}", program))?;

    if !status.success() {
        warn!(viewer = program, status = %status, "Viewer exited with an error");
    }
    Ok(())
}
