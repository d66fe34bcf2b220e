//! Command-line interface for tubescribe.
//!
//! One subcommand per pipeline stage plus `run` for the whole sequence,
//! `status` for store progress, and `config` for the resolved settings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{WhisperEngine, YouTubeClient, YtDlpFetcher};
use crate::config::Settings;
use crate::pipeline;
use crate::store::Store;

/// tubescribe - resumable channel transcription pipeline
#[derive(Parser, Debug)]
#[command(name = "tubescribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync channel metadata into the store
    Sync {
        /// How many recent videos to cover
        #[arg(short = 'n', long)]
        num_videos: Option<u32>,

        /// Channel to sync (or TUBESCRIBE_CHANNEL_ID env)
        #[arg(long, env = "TUBESCRIBE_CHANNEL_ID")]
        channel: Option<String>,
    },

    /// Download audio for records without a confirmed file
    Download,

    /// Transcribe downloaded audio into the store
    Transcribe {
        /// Whisper model size (e.g. "tiny", "base", "small")
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Append transcript blocks to the flat text log
    Export {
        /// Log file to append to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Whisper model size, for records without a stored transcript
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Run sync, download, and transcribe in order
    Run,

    /// Show per-stage progress of the store
    Status,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Resolve settings once and dispatch the subcommand.
    pub async fn execute(self) -> Result<()> {
        let mut settings = Settings::load()?;

        match self.command {
            Commands::Sync {
                num_videos,
                channel,
            } => {
                if let Some(n) = num_videos {
                    settings.num_videos = n;
                }
                if channel.is_some() {
                    settings.channel_id = channel;
                }
                execute_sync(&settings).await
            }
            Commands::Download => execute_download(&settings).await,
            Commands::Transcribe { model } => {
                if let Some(m) = model {
                    settings.model = m;
                }
                execute_transcribe(&settings).await
            }
            Commands::Export { output, model } => {
                if let Some(o) = output {
                    settings.log_path = o;
                }
                if let Some(m) = model {
                    settings.model = m;
                }
                execute_export(&settings).await
            }
            Commands::Run => execute_run(&settings).await,
            Commands::Status => execute_status(&settings).await,
            Commands::Config => execute_config(&settings),
        }
    }
}

async fn open_store(settings: &Settings) -> Result<Store> {
    Store::load(&settings.store_path)
        .await
        .with_context(|| format!("loading store {}", settings.store_path.display()))
}

async fn execute_sync(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings).await?;
    let source = YouTubeClient::new(settings.require_api_key()?);

    println!("📺 Fetching latest video metadata...");
    let report = pipeline::sync::run(settings, &mut store, &source).await?;

    println!(
        "📦 Store updated: {} added, {} updated, {} total",
        report.added,
        report.updated,
        store.len()
    );

    Ok(())
}

async fn execute_download(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings).await?;
    if store.is_empty() {
        println!("⚠️  Store is empty. Run `tubescribe sync` first.");
        return Ok(());
    }

    let fetcher = YtDlpFetcher::new(settings.audio_quality.clone());
    fetcher
        .ensure_available()
        .await
        .context("yt-dlp is not installed or not in PATH")?;

    println!("🎧 Checking audio downloads...");
    let report = pipeline::download::run(settings, &mut store, &fetcher).await?;

    println!(
        "✅ Downloads: {} fetched, {} already present, {} failed",
        report.fetched, report.skipped, report.failed
    );

    Ok(())
}

async fn execute_transcribe(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings).await?;
    if store.is_empty() {
        println!("⚠️  Store is empty. Run `tubescribe sync` first.");
        return Ok(());
    }

    let engine = WhisperEngine::new(settings.model.clone());

    println!("🧠 Starting transcription ({} model)...", settings.model);
    let report = pipeline::transcribe::run(settings, &mut store, &engine).await?;

    println!(
        "✅ Transcripts: {} new, {} already done, {} without audio, {} failed",
        report.transcribed, report.skipped, report.missing, report.failed
    );

    Ok(())
}

async fn execute_export(settings: &Settings) -> Result<()> {
    let store = open_store(settings).await?;
    if store.is_empty() {
        println!("⚠️  Store is empty. Run `tubescribe sync` first.");
        return Ok(());
    }

    let engine = WhisperEngine::new(settings.model.clone());

    println!("📝 Appending transcripts to {}...", settings.log_path.display());
    let report = pipeline::export::run(settings, &store, &engine).await?;

    println!(
        "✅ Log: {} appended, {} already logged, {} without audio, {} failed",
        report.appended, report.skipped, report.missing, report.failed
    );

    Ok(())
}

/// Full pipeline. A sync failure (API down, credentials missing) is
/// reported but does not stop the later stages from working through
/// whatever the store already holds.
async fn execute_run(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings).await?;

    match settings.require_api_key() {
        Ok(api_key) => {
            let source = YouTubeClient::new(api_key);
            println!("📺 Fetching latest video metadata...");
            match pipeline::sync::run(settings, &mut store, &source).await {
                Ok(report) => println!(
                    "📦 Store updated: {} added, {} updated",
                    report.added, report.updated
                ),
                Err(err) => println!("⚠️  Sync failed, continuing with existing store: {err:#}"),
            }
        }
        Err(err) => println!("⚠️  Skipping sync: {err}"),
    }

    if store.is_empty() {
        println!("⚠️  Store is empty, nothing to process.");
        return Ok(());
    }

    let fetcher = YtDlpFetcher::new(settings.audio_quality.clone());
    fetcher
        .ensure_available()
        .await
        .context("yt-dlp is not installed or not in PATH")?;

    println!("🎧 Checking audio downloads...");
    let download = pipeline::download::run(settings, &mut store, &fetcher).await?;
    println!(
        "✅ Downloads: {} fetched, {} already present, {} failed",
        download.fetched, download.skipped, download.failed
    );

    let engine = WhisperEngine::new(settings.model.clone());
    println!("🧠 Starting transcription ({} model)...", settings.model);
    let transcribe = pipeline::transcribe::run(settings, &mut store, &engine).await?;
    println!(
        "✅ Transcripts: {} new, {} already done, {} without audio, {} failed",
        transcribe.transcribed, transcribe.skipped, transcribe.missing, transcribe.failed
    );

    Ok(())
}

async fn execute_status(settings: &Settings) -> Result<()> {
    let store = open_store(settings).await?;

    let downloaded = store
        .records()
        .iter()
        .filter(|r| r.filename.is_some())
        .count();
    let transcribed = store.records().iter().filter(|r| r.has_transcript()).count();

    println!();
    println!("Pipeline Status");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("Store:       {}", settings.store_path.display());
    println!("Audio dir:   {}", settings.audio_dir.display());
    println!();
    println!("Records:     {}", store.len());
    println!("Downloaded:  {}", downloaded);
    println!("Transcribed: {}", transcribed);
    println!("Pending:     {}", store.len() - transcribed);
    println!();

    for record in store.records() {
        let marker = if record.has_transcript() {
            "DONE"
        } else if record.filename.is_some() {
            "AUDI"
        } else {
            "META"
        };
        println!("  [{}] {} ({})", marker, record.title, record.video_id);
    }

    Ok(())
}

fn execute_config(settings: &Settings) -> Result<()> {
    println!();
    println!("Resolved Configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    match &settings.config_file {
        Some(path) => println!("Config file:   {}", path.display()),
        None => println!("Config file:   (none found)"),
    }
    println!("Channel:       {}", settings.channel_id.as_deref().unwrap_or("(unset)"));
    println!(
        "API key:       {}",
        if settings.api_key.is_some() { "set" } else { "(unset)" }
    );
    println!("Videos/sync:   {}", settings.num_videos);
    println!("Model:         {}", settings.model);
    println!("Audio quality: {}", settings.audio_quality);
    println!("Store:         {}", settings.store_path.display());
    println!("Audio dir:     {}", settings.audio_dir.display());
    println!("Log file:      {}", settings.log_path.display());
    println!();

    Ok(())
}
