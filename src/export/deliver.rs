use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    capture::buffer::RecordedFile,
    catalog::model::DEFAULT_SELECTION_NAME,
    foundation::error::{PhotocardError, PhotocardResult},
};

pub const SHARE_TITLE: &str = "Cosmo Recording";

/// `cosmo-<selection lowercased>-<timestamp>.<ext>`; no selection means "Cosmo".
pub fn export_file_name(selection: Option<&str>, timestamp_ms: u64, extension: &str) -> String {
    let name = selection
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SELECTION_NAME)
        .to_lowercase();
    format!("cosmo-{name}-{timestamp_ms}.{extension}")
}

/// A native share sheet.
pub trait ShareSurface {
    /// Whether the surface accepts a file of this type.
    fn can_share(&self, file_name: &str, mime_type: &str) -> bool;
    fn share(&mut self, file_name: &str, file: &RecordedFile, title: &str) -> PhotocardResult<()>;
}

/// A plain file download.
pub trait DownloadSurface {
    fn download(&mut self, file_name: &str, file: &RecordedFile) -> PhotocardResult<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Shared { file_name: String },
    Downloaded { file_name: String },
}

/// Share when a surface is available and accepts the file. A failed or cancelled share falls
/// back to download silently.
pub fn deliver(
    file: &RecordedFile,
    file_name: &str,
    share: Option<&mut dyn ShareSurface>,
    download: &mut dyn DownloadSurface,
) -> PhotocardResult<ExportOutcome> {
    if file.is_empty() {
        return Err(PhotocardError::export("recording is empty"));
    }
    if let Some(share) = share
        && share.can_share(file_name, &file.mime_type)
    {
        match share.share(file_name, file, SHARE_TITLE) {
            Ok(()) => {
                tracing::info!(file_name, "recording shared");
                return Ok(ExportOutcome::Shared {
                    file_name: file_name.to_string(),
                });
            }
            Err(e) => tracing::warn!("share failed, falling back to download: {e}"),
        }
    }
    download.download(file_name, file)?;
    tracing::info!(file_name, bytes = file.len(), "recording downloaded");
    Ok(ExportOutcome::Downloaded {
        file_name: file_name.to_string(),
    })
}

/// Downloads into a directory on disk.
#[derive(Clone, Debug)]
pub struct DownloadDir {
    dir: PathBuf,
    last: Option<PathBuf>,
}

impl DownloadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recent download.
    pub fn last_path(&self) -> Option<&Path> {
        self.last.as_deref()
    }
}

impl DownloadSurface for DownloadDir {
    fn download(&mut self, file_name: &str, file: &RecordedFile) -> PhotocardResult<()> {
        if file_name.contains(['/', '\\']) || file_name.is_empty() {
            return Err(PhotocardError::export(format!(
                "invalid download file name '{file_name}'"
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create download directory '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.last = Some(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/deliver.rs"]
mod tests;
