//! Video download staging.
//!
//! Downloads a remote video to a uniquely named file in the configured
//! temp directory. The returned [`TempVideo`] guard owns the file and
//! removes it when dropped, so every exit path of the request that
//! triggered the download cleans up after itself.

use crate::error::AppError;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const DEFAULT_SUFFIX: &str = "mp4";

#[derive(Clone)]
pub struct VideoFetcher {
    client: Client,
    temp_dir: PathBuf,
}

/// A downloaded video file, deleted on drop.
pub struct TempVideo {
    path: PathBuf,
}

impl VideoFetcher {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            temp_dir: temp_dir.into(),
        }
    }

    /// Stream `url` into a fresh temp file and hand ownership to the caller.
    pub async fn fetch(&self, url: &str) -> Result<TempVideo, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Download(e.to_string()))?;

        let suffix = url_suffix(url);
        let path = self
            .temp_dir
            .join(format!("video_{}.{}", Uuid::new_v4(), suffix));

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Download(format!("failed to create temp file: {}", e)))?;

        // The guard exists from this point on, so a failed write still
        // removes the partial file.
        let video = TempVideo { path };

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AppError::Download(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Download(format!("failed to write temp file: {}", e)))?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::Download(format!("failed to flush temp file: {}", e)))?;

        tracing::debug!(path = ?video.path, "Video downloaded to temp location");

        Ok(video)
    }
}

impl TempVideo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate that the downloaded file landed on disk with content.
    pub async fn ensure_non_empty(&self) -> Result<(), AppError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|_| AppError::InvalidVideo("video file not created".to_string()))?;

        if meta.len() == 0 {
            return Err(AppError::InvalidVideo("video file is empty".to_string()));
        }

        tracing::debug!(path = ?self.path, size = meta.len(), "Video file validated");
        Ok(())
    }
}

impl Drop for TempVideo {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = ?self.path, error = %e, "Failed to remove temp video file");
        } else {
            tracing::debug!(path = ?self.path, "Cleaned up temp video file");
        }
    }
}

/// File suffix derived from the URL's path component.
fn url_suffix(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
}
