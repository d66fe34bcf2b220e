//! JSON-backed work queue for the pipeline.
//!
//! One `VideoRecord` per video, keyed by the upstream video id. The file is
//! the single source of truth: each stage loads it fully, mutates records in
//! memory, and rewrites it. Optional fields double as completion markers:
//! `filename` for the download stage, `transcript` for transcription.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Errors reading or writing the store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted store exists but is not valid JSON. Fatal: no stage may
    /// run against a store it cannot parse.
    #[error("store file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One video's metadata and pipeline state.
///
/// Field order here is the serialized key order; keep it stable so store
/// rewrites stay diff-friendly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Upstream video id; unique key, immutable once created.
    pub video_id: String,

    /// Latest upstream title; overwritten on every sync.
    pub title: String,

    /// Watch URL derived from the video id.
    pub url: String,

    /// Cleaned upstream description.
    pub description: String,

    /// Audio filename under the audio folder; set by the download stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Transcript text; set by the transcription stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl VideoRecord {
    /// Create a record with the fields sync knows about.
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            url: url.into(),
            description: description.into(),
            filename: None,
            transcript: None,
        }
    }

    /// Whether the transcription stage has completed for this record.
    pub fn has_transcript(&self) -> bool {
        self.transcript.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Ordered collection of video records bound to its file on disk.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    records: Vec<VideoRecord>,
}

impl Store {
    /// Load the store from disk. A missing file is an empty store; an
    /// unparsable file is `StoreError::Corrupt`.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                records: Vec::new(),
            });
        }

        let content = fs::read_to_string(path).await?;
        let records =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Persist the full collection, atomically: the serialized array goes to
    /// a sibling temp file which is then renamed over the store path, so a
    /// crash mid-write never leaves a truncated store behind.
    pub async fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Serializing Vec<VideoRecord> cannot fail; the map keeps the error
        // type honest without a panic path.
        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }

    /// Insert or merge a record by `video_id`. Incoming values win for
    /// `title`, `url`, and `description`; `filename` and `transcript` on the
    /// existing record survive unless the incoming record carries them.
    /// Returns `true` when the record was new.
    pub fn upsert(&mut self, record: VideoRecord) -> bool {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.video_id == record.video_id)
        {
            existing.title = record.title;
            existing.url = record.url;
            existing.description = record.description;
            if record.filename.is_some() {
                existing.filename = record.filename;
            }
            if record.transcript.is_some() {
                existing.transcript = record.transcript;
            }
            false
        } else {
            self.records.push(record);
            true
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    /// Mutable access by index; the stages iterate by index so the store can
    /// be saved between records.
    pub fn record_mut(&mut self, index: usize) -> &mut VideoRecord {
        &mut self.records[index]
    }

    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.video_id == video_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> VideoRecord {
        VideoRecord::new(
            id,
            title,
            format!("https://www.youtube.com/watch?v={id}"),
            "a description",
        )
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = Store::load(&temp.path().join("videos.json")).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("videos.json");
        fs::write(&path, "{ not json").await.unwrap();

        let err = Store::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("videos.json");

        let mut store = Store::load(&path).await.unwrap();
        store.upsert(record("bbb", "Second"));
        store.upsert(record("aaa", "First"));
        store.save().await.unwrap();

        let reloaded = Store::load(&path).await.unwrap();
        let ids: Vec<_> = reloaded.records().iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["bbb", "aaa"]);
    }

    #[tokio::test]
    async fn test_upsert_never_duplicates_ids() {
        let temp = TempDir::new().unwrap();
        let mut store = Store::load(&temp.path().join("videos.json")).await.unwrap();

        assert!(store.upsert(record("abc", "Title")));
        assert!(!store.upsert(record("abc", "Title again")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("abc").unwrap().title, "Title again");
    }

    #[tokio::test]
    async fn test_upsert_preserves_completion_fields() {
        let temp = TempDir::new().unwrap();
        let mut store = Store::load(&temp.path().join("videos.json")).await.unwrap();

        let mut done = record("abc", "Old title");
        done.filename = Some("old_title.mp3".to_string());
        done.transcript = Some("words".to_string());
        store.upsert(done);

        store.upsert(record("abc", "New title"));

        let merged = store.get("abc").unwrap();
        assert_eq!(merged.title, "New title");
        assert_eq!(merged.filename.as_deref(), Some("old_title.mp3"));
        assert_eq!(merged.transcript.as_deref(), Some("words"));
    }

    #[tokio::test]
    async fn test_optional_fields_omitted_when_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("videos.json");

        let mut store = Store::load(&path).await.unwrap();
        store.upsert(record("abc", "Title"));
        store.save().await.unwrap();

        let raw = fs::read_to_string(&path).await.unwrap();
        assert!(!raw.contains("filename"));
        assert!(!raw.contains("transcript"));
    }
}
