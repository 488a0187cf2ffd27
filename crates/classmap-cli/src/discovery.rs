//! Java source discovery.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

/// Collects every `.java` regular file below `root`, sorted by path.
///
/// `module-info.java` and `package-info.java` declare no types and are
/// skipped. A missing root yields an empty list; unreadable entries are
/// logged and skipped.
pub fn collect_java_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        warn!(root = root.display().to_string(); "Source root does not exist");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = err.to_string(); "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_type_source(path))
        .collect();

    files.sort();
    debug!(root = root.display().to_string(), files = files.len(); "Discovered Java sources");
    files
}

fn is_type_source(path: &Path) -> bool {
    let is_java = path.extension().and_then(|ext| ext.to_str()) == Some("java");
    let name = path.file_name().and_then(|name| name.to_str());
    is_java && !matches!(name, Some("module-info.java" | "package-info.java"))
}
