//! Pipeline configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TUBESCRIBE_*, YOUTUBE_API_KEY)
//! 2. Config file (.tubescribe/config.yaml)
//! 3. Defaults (~/.tubescribe)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tubescribe/config.yaml
//! - Paths in config file are relative to the config file's parent directory
//!
//! Resolution produces a plain `Settings` value that the CLI constructs once
//! and passes into every stage; there is no process-global config state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_NUM_VIDEOS: u32 = 10;
const DEFAULT_MODEL: &str = "base";
const DEFAULT_AUDIO_QUALITY: &str = "192";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Channel to sync
    pub channel: Option<String>,
    /// How many recent videos each sync covers
    pub num_videos: Option<u32>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub whisper: Option<WhisperConfig>,
    #[serde(default)]
    pub audio: Option<AudioConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Metadata store file (relative to the project root)
    pub store: Option<String>,
    /// Audio download folder
    pub audio_dir: Option<String>,
    /// Transcript log file for the export sink
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperConfig {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Quality passed to the audio fetcher (mp3 bitrate)
    pub quality: Option<String>,
}

/// Resolved settings passed by reference into each stage.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Channel whose uploads are synced; required by the sync stage only.
    pub channel_id: Option<String>,
    /// Metadata API credential; required by the sync stage only.
    pub api_key: Option<String>,
    /// How many recent videos each sync covers.
    pub num_videos: u32,
    /// Whisper model size/variant.
    pub model: String,
    /// Audio quality requested from the fetcher.
    pub audio_quality: String,
    /// Metadata store file.
    pub store_path: PathBuf,
    /// Audio download folder.
    pub audio_dir: PathBuf,
    /// Transcript log file for the export sink.
    pub log_path: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Environment values feeding resolution; gathered once so the precedence
/// logic itself is a pure function.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub home: Option<String>,
    pub channel_id: Option<String>,
    pub api_key: Option<String>,
    pub num_videos: Option<String>,
    pub model: Option<String>,
    pub audio_quality: Option<String>,
    pub store_path: Option<String>,
    pub audio_dir: Option<String>,
    pub log_path: Option<String>,
}

impl EnvOverrides {
    fn from_process_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            home: var("TUBESCRIBE_HOME"),
            channel_id: var("TUBESCRIBE_CHANNEL_ID"),
            api_key: var("YOUTUBE_API_KEY"),
            num_videos: var("TUBESCRIBE_NUM_VIDEOS"),
            model: var("TUBESCRIBE_MODEL"),
            audio_quality: var("TUBESCRIBE_AUDIO_QUALITY"),
            store_path: var("TUBESCRIBE_STORE"),
            audio_dir: var("TUBESCRIBE_AUDIO_DIR"),
            log_path: var("TUBESCRIBE_LOG_FILE"),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, a discovered config file,
    /// and defaults.
    pub fn load() -> Result<Self> {
        let default_home = dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(".tubescribe");

        let env = EnvOverrides::from_process_env();
        let config_file = find_config_file();
        let file = match &config_file {
            Some(path) => Some(load_config_file(path)?),
            None => None,
        };

        Ok(Self::resolve(default_home, env, file, config_file))
    }

    /// Pure precedence logic: env > config file > defaults.
    fn resolve(
        default_home: PathBuf,
        env: EnvOverrides,
        file: Option<ConfigFile>,
        config_file: Option<PathBuf>,
    ) -> Self {
        let home = env.home.map(PathBuf::from).unwrap_or(default_home);

        // Relative file paths resolve against the project root (the parent
        // of the .tubescribe directory).
        let base_dir = config_file
            .as_deref()
            .and_then(|p| p.parent())
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let file = file.unwrap_or_default();

        let pick_path = |env_value: Option<String>,
                         file_value: &Option<String>,
                         default: PathBuf| {
            if let Some(v) = env_value {
                PathBuf::from(v)
            } else if let Some(v) = file_value {
                resolve_path(&base_dir, v)
            } else {
                default
            }
        };

        let store_path = pick_path(env.store_path, &file.paths.store, home.join("videos.json"));
        let audio_dir = pick_path(env.audio_dir, &file.paths.audio_dir, home.join("audio"));
        let log_path = pick_path(
            env.log_path,
            &file.paths.log_file,
            home.join("transcripts.log"),
        );

        let num_videos = env
            .num_videos
            .and_then(|v| v.parse().ok())
            .or(file.num_videos)
            .unwrap_or(DEFAULT_NUM_VIDEOS);

        let model = env
            .model
            .or_else(|| file.whisper.as_ref().and_then(|w| w.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let audio_quality = env
            .audio_quality
            .or_else(|| file.audio.as_ref().and_then(|a| a.quality.clone()))
            .unwrap_or_else(|| DEFAULT_AUDIO_QUALITY.to_string());

        Self {
            channel_id: env.channel_id.or(file.channel),
            api_key: env.api_key,
            num_videos,
            model,
            audio_quality,
            store_path,
            audio_dir,
            log_path,
            config_file,
        }
    }

    /// Channel id, or an error telling the operator how to set it.
    pub fn require_channel(&self) -> Result<&str> {
        self.channel_id
            .as_deref()
            .context("Missing channel id. Set TUBESCRIBE_CHANNEL_ID or channel: in config.yaml")
    }

    /// API credential, or an error telling the operator how to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("Missing API credential. Set the YOUTUBE_API_KEY env var")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tubescribe").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn resolve(env: EnvOverrides, file: Option<ConfigFile>) -> Settings {
        Settings::resolve(PathBuf::from("/home/op/.tubescribe"), env, file, None)
    }

    #[test]
    fn test_defaults_without_env_or_file() {
        let settings = resolve(EnvOverrides::default(), None);

        assert_eq!(settings.num_videos, DEFAULT_NUM_VIDEOS);
        assert_eq!(settings.model, "base");
        assert_eq!(settings.audio_quality, "192");
        assert_eq!(
            settings.store_path,
            PathBuf::from("/home/op/.tubescribe/videos.json")
        );
        assert_eq!(
            settings.audio_dir,
            PathBuf::from("/home/op/.tubescribe/audio")
        );
        assert!(settings.channel_id.is_none());
    }

    #[test]
    fn test_env_beats_file() {
        let env = EnvOverrides {
            num_videos: Some("25".to_string()),
            model: Some("large".to_string()),
            channel_id: Some("UCenv".to_string()),
            ..Default::default()
        };
        let file = ConfigFile {
            channel: Some("UCfile".to_string()),
            num_videos: Some(5),
            whisper: Some(WhisperConfig {
                model: Some("tiny".to_string()),
            }),
            ..Default::default()
        };

        let settings = resolve(env, Some(file));
        assert_eq!(settings.num_videos, 25);
        assert_eq!(settings.model, "large");
        assert_eq!(settings.channel_id.as_deref(), Some("UCenv"));
    }

    #[test]
    fn test_file_beats_defaults() {
        let file = ConfigFile {
            num_videos: Some(3),
            audio: Some(AudioConfig {
                quality: Some("320".to_string()),
            }),
            ..Default::default()
        };

        let settings = resolve(EnvOverrides::default(), Some(file));
        assert_eq!(settings.num_videos, 3);
        assert_eq!(settings.audio_quality, "320");
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".tubescribe");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
channel: UCabc123
num_videos: 25
paths:
  store: ./videos.json
  audio_dir: ./audio
whisper:
  model: small
audio:
  quality: "256"
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.channel.as_deref(), Some("UCabc123"));
        assert_eq!(config.num_videos, Some(25));
        assert_eq!(config.paths.store.as_deref(), Some("./videos.json"));
        assert_eq!(config.whisper.unwrap().model.as_deref(), Some("small"));
        assert_eq!(config.audio.unwrap().quality.as_deref(), Some("256"));
    }

    #[test]
    fn test_file_paths_resolve_against_project_root() {
        let env = EnvOverrides::default();
        let file = ConfigFile {
            paths: PathsConfig {
                store: Some("data/videos.json".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let settings = Settings::resolve(
            PathBuf::from("/home/op/.tubescribe"),
            env,
            Some(file),
            Some(PathBuf::from("/work/project/.tubescribe/config.yaml")),
        );

        assert_eq!(
            settings.store_path,
            PathBuf::from("/work/project/data/videos.json")
        );
    }

    #[test]
    fn test_resolve_absolute_path_kept() {
        let base = PathBuf::from("/work/project");
        assert_eq!(
            resolve_path(&base, "/var/data/videos.json"),
            PathBuf::from("/var/data/videos.json")
        );
        assert_eq!(
            resolve_path(&base, "data/videos.json"),
            PathBuf::from("/work/project/data/videos.json")
        );
    }
}
