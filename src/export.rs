use crate::error::ExportError;
use std::fs;
use std::path::PathBuf;

/// Saves rendered results as a text file. Outside the evaluator core; the
/// CLI is the only caller.
///
/// Content and filename are required and must be non-empty; the extension
/// defaults to `txt`. Returns the path that was written.
pub fn save_as_file(
    content: &str,
    filename: &str,
    extension: Option<&str>,
) -> Result<PathBuf, ExportError> {
    if content.is_empty() {
        return Err(ExportError::MissingContent);
    }
    if filename.is_empty() {
        return Err(ExportError::MissingFilename);
    }

    let extension = extension.unwrap_or("txt");
    let path = PathBuf::from(format!("{}.{}", filename, extension));
    fs::write(&path, content)?;
    Ok(path)
}
