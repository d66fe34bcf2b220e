//! Metadata sync stage.
//!
//! Pulls the channel's most recent uploads (two API calls: id search, then
//! batch detail lookup) and merges them into the store. Sync only ever adds
//! or refreshes records; nothing is deleted and completion fields survive.

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::MetadataSource;
use crate::config::Settings;
use crate::slug::clean_description;
use crate::store::{Store, VideoRecord};

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Counters for the sync summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
}

/// Fetch recent uploads and upsert them into the store, saving once at the
/// end. An API failure therefore aborts the stage with the store file
/// untouched; re-running after the upstream recovers is safe.
pub async fn run(
    settings: &Settings,
    store: &mut Store,
    source: &dyn MetadataSource,
) -> Result<SyncReport> {
    let channel_id = settings.require_channel()?;

    if settings.num_videos == 0 {
        info!("sync requested for 0 videos, store unchanged");
        return Ok(SyncReport::default());
    }

    let ids = source
        .recent_video_ids(channel_id, settings.num_videos)
        .await
        .context("searching for recent videos")?;

    if ids.is_empty() {
        info!(channel = channel_id, "channel has no videos, store unchanged");
        return Ok(SyncReport::default());
    }

    // The detail lookup may return a subset of the searched ids (a video can
    // disappear between the two calls); only what comes back is upserted.
    let details = source
        .video_details(&ids)
        .await
        .context("fetching video details")?;

    let mut report = SyncReport::default();
    for video in details {
        let url = watch_url(&video.id);
        let description = clean_description(&video.description);
        let record = VideoRecord::new(video.id, video.title, url, description);

        if store.upsert(record) {
            report.added += 1;
        } else {
            report.updated += 1;
        }
    }

    store.save().await.context("saving metadata store")?;
    info!(added = report.added, updated = report.updated, "metadata sync complete");

    Ok(report)
}
