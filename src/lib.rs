//! tubescribe - resumable channel transcription pipeline
//!
//! A batch pipeline that syncs a channel's video metadata, downloads the
//! audio, and transcribes it with Whisper.
//!
//! # Architecture
//!
//! The system is built around a JSON-backed work queue:
//! - Every video is one record in the store, keyed by its upstream id
//! - Optional record fields double as per-stage completion markers
//! - Each stage skips whatever is already done, so re-running after a
//!   partial failure or interruption never duplicates work
//!
//! # Modules
//!
//! - `adapters`: External collaborators (YouTube API, yt-dlp, Whisper)
//! - `pipeline`: The stages (Sync, Download, Transcribe, Export)
//! - `store`: The JSON work queue (VideoRecord, Store)
//! - `slug`: Title normalization and description cleanup
//! - `config`: Settings resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the whole pipeline
//! tubescribe run
//!
//! # Or stage by stage
//! tubescribe sync -n 25
//! tubescribe download
//! tubescribe transcribe --model small
//!
//! # Check progress
//! tubescribe status
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod slug;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::{
    AudioFetchError, AudioFetcher, MetadataFetchError, MetadataSource, TranscriptionEngine,
    TranscriptionError, VideoDetails,
};
pub use config::Settings;
pub use store::{Store, StoreError, VideoRecord};
