//! yt-dlp audio fetcher.
//!
//! Shells out to the yt-dlp binary to extract the audio track of a video as
//! mp3. yt-dlp owns codec selection, retries, and network timeouts; this
//! adapter only verifies that the expected file actually appeared.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use super::AudioFetcher;

/// Extension of every file the fetcher produces.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Per-record download failures. The download stage logs these and moves on.
#[derive(Debug, Error)]
pub enum AudioFetchError {
    #[error("failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("yt-dlp exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("yt-dlp reported success but {0} was not created")]
    OutputMissing(PathBuf),
}

/// Audio fetcher backed by the yt-dlp CLI
pub struct YtDlpFetcher {
    /// Path to the yt-dlp binary (default: "yt-dlp")
    binary_path: String,
    /// mp3 quality passed through to the postprocessor
    quality: String,
}

impl YtDlpFetcher {
    /// Create a fetcher using `yt-dlp` from PATH.
    pub fn new(quality: impl Into<String>) -> Self {
        Self::with_binary_path("yt-dlp", quality)
    }

    /// Create a fetcher with a custom binary path.
    pub fn with_binary_path(binary_path: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            quality: quality.into(),
        }
    }

    /// Probe the binary with `--version` so a missing install fails loudly
    /// before the batch starts instead of once per record.
    pub async fn ensure_available(&self) -> Result<(), AudioFetchError> {
        let status = Command::new(&self.binary_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(AudioFetchError::Failed {
                code: status.code().unwrap_or(-1),
                stderr: "--version probe failed".to_string(),
            })
        }
    }
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, dest_base: &Path) -> Result<(), AudioFetchError> {
        // yt-dlp substitutes the intermediate extension itself; the
        // postprocessor then transcodes to mp3 at the same base name.
        let template = format!("{}.%(ext)s", dest_base.display());

        let output = Command::new(&self.binary_path)
            .arg("-f")
            .arg("bestaudio/best")
            .arg("-x")
            .arg("--audio-format")
            .arg(AUDIO_EXTENSION)
            .arg("--audio-quality")
            .arg(&self.quality)
            .arg("--no-warnings")
            .arg("--no-progress")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(AudioFetchError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let expected = dest_base.with_extension(AUDIO_EXTENSION);
        if !expected.exists() {
            return Err(AudioFetchError::OutputMissing(expected));
        }

        Ok(())
    }
}
