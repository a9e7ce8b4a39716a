//! Persisting the merged guide

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::xmltv::{Element, write_document};

/// Serialize `root` and write it to `path`, returning the number of bytes written.
///
/// Missing parent directories are created. The document is written to a sibling
/// `.tmp` file first and renamed over the target, so readers never see a half
/// written guide.
pub async fn save_document(root: &Element, path: &Path) -> AppResult<u64> {
    let xml = write_document(root)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::output(parent, format!("Failed to create directory: {e}")))?;
    }

    let temp_path = temp_path_for(path);
    debug!("Writing merged guide to temporary file {}", temp_path.display());

    tokio::fs::write(&temp_path, xml.as_bytes())
        .await
        .map_err(|e| AppError::output(&temp_path, format!("Failed to write file: {e}")))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(AppError::output(path, format!("Failed to move file into place: {e}")));
    }

    let bytes = xml.len() as u64;
    info!("Wrote {} bytes to {}", bytes, path.display());
    Ok(bytes)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
