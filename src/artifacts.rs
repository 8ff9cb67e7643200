//! JSON artifacts passed between pipeline stages.

use std::io::ErrorKind;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, Result};

/// Overwrite `path` with pretty-printed JSON, creating the parent directory if needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body)?;
    Ok(())
}

/// Read and decode an artifact. A missing file is `ArtifactMissing`, not a plain IO error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::ArtifactMissing(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}
