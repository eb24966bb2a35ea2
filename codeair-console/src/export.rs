//! Run exports written to disk.

use std::io;
use std::path::{Path, PathBuf};

/// Write `html` as `dir/file_name`, creating `dir` if needed. Only the last
/// path component of `file_name` is used.
pub fn write_html(dir: &Path, file_name: &str, html: &str) -> io::Result<PathBuf> {
    let name = Path::new(file_name)
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "export file name is empty"))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Exported run");
    Ok(path)
}
