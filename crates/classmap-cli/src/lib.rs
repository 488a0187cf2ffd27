//! CLI logic for the classmap diagram tool.
//!
//! This module walks a Java source tree, parses every file it finds and
//! writes one PlantUML class diagram for the whole tree.

pub mod error_adapter;

mod args;
mod config;
mod discovery;
mod progress;

pub use args::Args;
pub use progress::Dashboard;

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

use classmap::{ClassmapError, DiagramBuilder};

use error_adapter::render_reports;

/// Run the classmap CLI application
///
/// Every `.java` file below the source root is parsed. Files that cannot be
/// read or parsed are reported and skipped; the diagram is built from the
/// rest.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ClassmapError` for:
/// - Configuration loading errors
/// - Malformed declarations
/// - Output I/O errors
pub fn run(args: &Args) -> Result<Dashboard, ClassmapError> {
    // Load configuration
    let mut app_config = config::load_config(args.config.as_deref().map(Path::new))?;
    if let Some(title) = &args.title {
        app_config = app_config.with_title(title.as_str());
    }

    let root = args
        .input
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| app_config.source().root().to_path_buf());
    let output = args
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| app_config.source().output().to_path_buf());

    info!(
        source_root = root.display().to_string(),
        output_path = output.display().to_string();
        "Processing sources"
    );

    let builder = DiagramBuilder::new(app_config);
    let mut dashboard = Dashboard::default();

    let mut units = Vec::new();
    for path in discovery::collect_java_files(&root) {
        dashboard.on_file(&path);
        match builder.parse_file(&path) {
            Ok(unit) => units.push(unit),
            Err(err) => {
                dashboard.on_skipped(&path);
                warn!(path = path.display().to_string(), error = err.to_string(); "Skipping source file");
                for report in render_reports(&err) {
                    warn!("{report}");
                }
            }
        }
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = BufWriter::new(fs::File::create(&output)?);
    builder.render_with(&units, &mut out, &mut dashboard)?;
    out.flush()?;

    dashboard.log_summary();
    info!(output_file = output.display().to_string(); "PlantUML exported successfully");

    Ok(dashboard)
}
