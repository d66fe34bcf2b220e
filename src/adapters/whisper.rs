//! Whisper transcription backend.
//!
//! Shells out to the local whisper binary with JSON output into a temp dir,
//! then parses the transcript text back out.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use super::TranscriptionEngine;

/// Per-record engine failures. The transcription stage logs these and
/// leaves the record incomplete.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("failed to run whisper: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("whisper exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("whisper output unreadable: {0}")]
    Output(String),
}

/// Whisper output JSON structure (only the text is consumed)
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
}

/// Transcription engine backed by the whisper CLI
pub struct WhisperEngine {
    /// Path to the whisper binary (WHISPER_PATH env, default "whisper")
    binary_path: String,
    /// Model size/variant, loaded by the whisper process per invocation
    model: String,
}

impl WhisperEngine {
    /// Create an engine for the given model size.
    pub fn new(model: impl Into<String>) -> Self {
        let binary_path =
            std::env::var("WHISPER_PATH").unwrap_or_else(|_| "whisper".to_string());

        Self {
            binary_path,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for WhisperEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let temp_dir = tempfile::tempdir()?;

        let output = Command::new(&self.binary_path)
            .arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_dir")
            .arg(temp_dir.path())
            .arg("--output_format")
            .arg("json")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscriptionError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
        let json_path = temp_dir.path().join(format!("{}.json", stem));

        let json_content = tokio::fs::read_to_string(&json_path).await.map_err(|err| {
            TranscriptionError::Output(format!("{}: {}", json_path.display(), err))
        })?;

        let whisper: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|err| TranscriptionError::Output(err.to_string()))?;

        Ok(whisper.text.trim().to_string())
    }
}
