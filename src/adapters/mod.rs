//! Adapter interfaces for external systems.
//!
//! The pipeline consumes three collaborators: a metadata API, an audio
//! fetcher, and a transcription engine. Each is a trait so the stages can be
//! exercised with stubs; the production implementations live in the
//! submodules.

pub mod whisper;
pub mod youtube;
pub mod ytdlp;

use std::path::Path;

use async_trait::async_trait;

pub use whisper::{TranscriptionError, WhisperEngine};
pub use youtube::{MetadataFetchError, VideoDetails, YouTubeClient};
pub use ytdlp::{AudioFetchError, YtDlpFetcher, AUDIO_EXTENSION};

/// Paged search plus batch detail lookup against the metadata API.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Ids of the channel's most recently published videos, newest first.
    async fn recent_video_ids(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, MetadataFetchError>;

    /// Title/description details for a batch of ids. May return fewer items
    /// than asked for when a video has become unavailable.
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetails>, MetadataFetchError>;
}

/// Fetches the audio track of a video to a local file.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download audio for `url`, producing `<dest_base>.mp3`. The extension
    /// is appended by the fetcher.
    async fn fetch(&self, url: &str, dest_base: &Path) -> Result<(), AudioFetchError>;
}

/// Speech-to-text over a single audio file.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;
}
