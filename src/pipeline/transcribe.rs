//! Transcription runner, JSON sink.
//!
//! For each record with audio but no transcript, invokes the engine once and
//! rewrites the whole store immediately after the success. That bounds what
//! an interruption can lose to the single in-flight record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::TranscriptionEngine;
use crate::config::Settings;
use crate::store::{Store, VideoRecord};

/// Per-record precondition failure: the record has no usable audio file.
/// Non-fatal; the record is skipped with a warning.
#[derive(Debug, Error)]
pub enum MissingAudioError {
    #[error("no audio filename recorded for {title:?}")]
    NoFilename { title: String },

    #[error("audio file for {title:?} not found: {path}")]
    FileNotFound { title: String, path: PathBuf },
}

/// Resolve a record's audio file on disk, or say why it is unusable.
pub(crate) fn locate_audio(
    record: &VideoRecord,
    audio_dir: &Path,
) -> Result<PathBuf, MissingAudioError> {
    let filename = record
        .filename
        .as_deref()
        .ok_or_else(|| MissingAudioError::NoFilename {
            title: record.title.clone(),
        })?;

    let path = audio_dir.join(filename);
    if !path.exists() {
        return Err(MissingAudioError::FileNotFound {
            title: record.title.clone(),
            path,
        });
    }

    Ok(path)
}

/// Counters for the transcription summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TranscribeReport {
    pub transcribed: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Transcribe every record that has audio but no transcript. Engine
/// failures for one record are logged and the batch continues; the failed
/// record keeps no transcript and is retried on the next run.
pub async fn run(
    settings: &Settings,
    store: &mut Store,
    engine: &dyn TranscriptionEngine,
) -> Result<TranscribeReport> {
    let mut report = TranscribeReport::default();

    for index in 0..store.len() {
        let record = &store.records()[index];

        if record.has_transcript() {
            info!(title = %record.title, "already transcribed");
            report.skipped += 1;
            continue;
        }

        let audio_path = match locate_audio(record, &settings.audio_dir) {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "skipping record");
                report.missing += 1;
                continue;
            }
        };

        let title = record.title.clone();
        info!(title = %title, "transcribing");

        match engine.transcribe(&audio_path).await {
            Ok(text) => {
                store.record_mut(index).transcript = Some(text.trim().to_string());
                // Persist immediately so a crash never costs more than the
                // record currently in flight.
                store.save().await.context("saving metadata store")?;
                report.transcribed += 1;
            }
            Err(err) => {
                warn!(title = %title, error = %err, "transcription failed, skipping record");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
