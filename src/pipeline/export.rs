//! Log-append sink: writes transcript blocks to a flat text log.
//!
//! The log's own content is this sink's completion state: the entire file
//! is scanned for already-logged URLs before anything is appended, and the
//! store's `transcript` field is never written here. When a record already
//! has a stored transcript it is reused instead of invoking the engine
//! again; the store stays the one source of truth for "was it transcribed",
//! the log only tracks "was it exported".

use std::collections::HashSet;

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::transcribe::locate_audio;
use crate::adapters::TranscriptionEngine;
use crate::config::Settings;
use crate::store::Store;

const URL_MARKER: &str = "https://";
const PAREN_MARKER: &str = "(https://";

/// Counters for the export summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportReport {
    pub appended: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Collect URLs already present in the log. A line starting with the URL
/// scheme counts whole; the `(<url>)` suffix of a title line is recognized
/// too, since that is the layout this sink writes.
fn collect_logged_urls(content: &str) -> HashSet<String> {
    let mut urls = HashSet::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with(URL_MARKER) {
            urls.insert(line.to_string());
        } else if let Some(start) = line.rfind(PAREN_MARKER) {
            if let Some(len) = line[start..].find(')') {
                urls.insert(line[start + 1..start + len].to_string());
            }
        }
    }

    urls
}

/// Append a `title (url)` / `summary:` / `transcript:` block for every
/// record not yet in the log. Records without a transcript anywhere (store
/// or inferable from audio) are skipped with a warning.
pub async fn run(
    settings: &Settings,
    store: &Store,
    engine: &dyn TranscriptionEngine,
) -> Result<ExportReport> {
    let existing = match fs::read_to_string(&settings.log_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("reading log {}", settings.log_path.display()))
        }
    };
    let logged = collect_logged_urls(&existing);

    if let Some(parent) = settings.log_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_path)
        .await
        .with_context(|| format!("opening log {}", settings.log_path.display()))?;

    let mut report = ExportReport::default();

    for record in store.records() {
        if logged.contains(&record.url) {
            debug!(title = %record.title, "already in log");
            report.skipped += 1;
            continue;
        }

        let text = if let Some(text) = record.transcript.as_deref().filter(|t| !t.is_empty()) {
            text.to_string()
        } else {
            let audio_path = match locate_audio(record, &settings.audio_dir) {
                Ok(path) => path,
                Err(err) => {
                    warn!(error = %err, "skipping record");
                    report.missing += 1;
                    continue;
                }
            };

            match engine.transcribe(&audio_path).await {
                Ok(text) => text.trim().to_string(),
                Err(err) => {
                    warn!(title = %record.title, error = %err, "transcription failed, skipping record");
                    report.failed += 1;
                    continue;
                }
            }
        };

        let block = format!(
            "{} ({})\nsummary: {}\ntranscript: {}\n\n",
            record.title, record.url, record.description, text
        );
        log.write_all(block.as_bytes())
            .await
            .context("appending to log")?;
        log.flush().await?;
        report.appended += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_urls_from_title_lines() {
        let log = "My Video (https://www.youtube.com/watch?v=abc)\n\
                   summary: words\n\
                   transcript: more words\n\n";

        let urls = collect_logged_urls(log);
        assert!(urls.contains("https://www.youtube.com/watch?v=abc"));
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_collect_urls_from_bare_lines() {
        let log = "https://www.youtube.com/watch?v=xyz\n";

        let urls = collect_logged_urls(log);
        assert!(urls.contains("https://www.youtube.com/watch?v=xyz"));
    }

    #[test]
    fn test_collect_urls_ignores_body_lines() {
        let log = "summary: mentions (parentheses) casually\n\
                   transcript: the site http example dot com\n";

        assert!(collect_logged_urls(log).is_empty());
    }

    #[test]
    fn test_title_containing_parens_uses_last_group() {
        let log = "My Video (part 2) (https://www.youtube.com/watch?v=abc)\n";

        let urls = collect_logged_urls(log);
        assert!(urls.contains("https://www.youtube.com/watch?v=abc"));
        assert_eq!(urls.len(), 1);
    }
}
