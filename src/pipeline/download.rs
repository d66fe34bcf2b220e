//! Audio acquisition stage.
//!
//! Downloads audio for every record that does not already have a confirmed
//! file on disk. The completion check is double: the record's `filename`
//! field must be set AND the file must exist in the audio folder. If the
//! file was deleted externally, the record is fetched again.

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::adapters::{AudioFetcher, AUDIO_EXTENSION};
use crate::config::Settings;
use crate::slug::slugify;
use crate::store::Store;

/// Counters for the download summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadReport {
    pub fetched: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Process all records in stored order. A fetch failure for one record is
/// logged and that record stays without `filename`; the batch continues.
/// The store is saved once after the loop, iff anything changed.
pub async fn run(
    settings: &Settings,
    store: &mut Store,
    fetcher: &dyn AudioFetcher,
) -> Result<DownloadReport> {
    fs::create_dir_all(&settings.audio_dir)
        .await
        .with_context(|| format!("creating audio folder {}", settings.audio_dir.display()))?;

    let mut report = DownloadReport::default();
    let mut dirty = false;

    for index in 0..store.len() {
        let (title, url, has_filename) = {
            let record = &store.records()[index];
            (record.title.clone(), record.url.clone(), record.filename.is_some())
        };

        let base_name = slugify(&title);
        let filename = format!("{base_name}.{AUDIO_EXTENSION}");
        let audio_path = settings.audio_dir.join(&filename);

        if has_filename && audio_path.exists() {
            debug!(title = %title, "audio already downloaded");
            report.skipped += 1;
            continue;
        }

        info!(title = %title, url = %url, "downloading audio");
        let dest_base = settings.audio_dir.join(&base_name);

        match fetcher.fetch(&url, &dest_base).await {
            Ok(()) => {
                store.record_mut(index).filename = Some(filename);
                dirty = true;
                report.fetched += 1;
            }
            Err(err) => {
                warn!(title = %title, error = %err, "audio fetch failed, skipping record");
                report.failed += 1;
            }
        }
    }

    if dirty {
        store.save().await.context("saving metadata store")?;
    }

    Ok(report)
}
