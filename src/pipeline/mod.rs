//! The batch pipeline stages.
//!
//! Three stages run in order, each independently re-entrant:
//!
//! 1. **Sync**: merge the channel's recent uploads into the store
//! 2. **Download**: fetch audio for records without a confirmed file
//! 3. **Transcribe**: run the speech-to-text engine, persisting per record
//!
//! plus **Export**, an alternate sink that appends transcript blocks to a
//! flat text log and tracks completion in the log itself.
//!
//! Every stage loads its state from the store, skips whatever is already
//! done, and persists what it changed, so re-running after a partial
//! failure picks up exactly where the last run stopped.

pub mod download;
pub mod export;
pub mod sync;
pub mod transcribe;

pub use download::DownloadReport;
pub use export::ExportReport;
pub use sync::SyncReport;
pub use transcribe::{MissingAudioError, TranscribeReport};
