use std::path::Path;

use crate::TransferError;

/// Checks that `path` names an existing regular file.
///
/// Rejects:
/// - Missing paths (reported as a file access error)
/// - Directories and other non-regular entries
///
/// Symlinks are followed.
pub fn validate_artifact_path(path: &Path) -> Result<(), TransferError> {
    let metadata = std::fs::metadata(path).map_err(|e| TransferError::file_access(path, e))?;

    if !metadata.is_file() {
        return Err(TransferError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}
