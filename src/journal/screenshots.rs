//! Screenshot storage for uploaded chart images

use crate::error::{JournalError, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// An image received with a trade submission
#[derive(Debug, Clone)]
pub struct UploadedScreenshot {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Writes uploaded images into a dedicated directory
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an upload as `{%Y%m%d_%H%M%S}_{name}` and return the path to record
    pub fn save(&self, upload: &UploadedScreenshot, at: NaiveDateTime) -> Result<String> {
        let name = sanitized_name(&upload.file_name)?;
        let stored_name = format!("{}_{}", at.format("%Y%m%d_%H%M%S"), name);
        let path = self.dir.join(&stored_name);

        fs::write(&path, &upload.bytes)?;
        info!("Saved screenshot {} ({} bytes)", path.display(), upload.bytes.len());

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Keep only the final path component and require an image extension
fn sanitized_name(file_name: &str) -> Result<String> {
    let name = Path::new(file_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            JournalError::Validation(format!("invalid screenshot file name '{}'", file_name))
        })?;

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(JournalError::Validation(format!(
            "screenshot '{}' must be one of: {}",
            name,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    Ok(name.to_string())
}
