use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::player::{PlaybackPolicy, DEFAULT_MAX_FRAMES};

const DEFAULT_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_VIDEO_PATH: &str = "crowd_detection_video.mp4";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_PRESENTATION: &str = "Real_Time_Crowd_Flow_Monitoring.pptx";

#[derive(Debug, Deserialize, Default)]
struct DashboardConfigFile {
    addr: Option<String>,
    assets_dir: Option<PathBuf>,
    presentation: Option<String>,
    video: Option<VideoConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct VideoConfigFile {
    path: Option<String>,
    max_frames: Option<u64>,
    strict: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub addr: String,
    pub assets_dir: PathBuf,
    /// File name of the presentation inside `assets_dir`.
    pub presentation: String,
    pub video: VideoSettings,
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub path: String,
    pub max_frames: u64,
    pub policy: PlaybackPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_file(DashboardConfigFile::default())
    }
}

impl DashboardConfig {
    /// File named by `DASHBOARD_CONFIG` (JSON, or TOML by extension), then env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("DASHBOARD_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: DashboardConfigFile) -> Self {
        let video = file.video.unwrap_or_default();
        Self {
            addr: file.addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            assets_dir: file
                .assets_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            presentation: file
                .presentation
                .unwrap_or_else(|| DEFAULT_PRESENTATION.to_string()),
            video: VideoSettings {
                path: video.path.unwrap_or_else(|| DEFAULT_VIDEO_PATH.to_string()),
                max_frames: video.max_frames.unwrap_or(DEFAULT_MAX_FRAMES),
                policy: policy_from_flag(video.strict.unwrap_or(false)),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("DASHBOARD_ADDR") {
            if !addr.trim().is_empty() {
                self.addr = addr;
            }
        }
        if let Ok(dir) = std::env::var("DASHBOARD_ASSETS_DIR") {
            if !dir.trim().is_empty() {
                self.assets_dir = PathBuf::from(dir);
            }
        }
        if let Ok(path) = std::env::var("DASHBOARD_VIDEO_PATH") {
            if !path.trim().is_empty() {
                self.video.path = path;
            }
        }
        if let Ok(max_frames) = std::env::var("DASHBOARD_MAX_FRAMES") {
            self.video.max_frames = max_frames
                .trim()
                .parse()
                .map_err(|_| anyhow!("DASHBOARD_MAX_FRAMES must be a non-negative integer"))?;
        }
        if let Ok(strict) = std::env::var("DASHBOARD_STRICT_PLAYBACK") {
            self.video.policy = policy_from_flag(parse_bool(&strict)?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("invalid listen address '{}': {}", self.addr, e))?;
        if self.video.path.trim().is_empty() {
            return Err(anyhow!("video path must not be empty"));
        }
        if self.presentation.contains('/') || self.presentation.contains("..") {
            return Err(anyhow!("presentation must be a plain file name"));
        }
        Ok(())
    }
}

fn policy_from_flag(strict: bool) -> PlaybackPolicy {
    if strict {
        PlaybackPolicy::Strict
    } else {
        PlaybackPolicy::Lenient
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{}'", other)),
    }
}

fn read_config_file(path: &Path) -> Result<DashboardConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: DashboardConfigFile = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_demo() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.video.path, "crowd_detection_video.mp4");
        assert_eq!(cfg.video.max_frames, 500);
        assert_eq!(cfg.video.policy, PlaybackPolicy::Lenient);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_boolean_flags() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn rejects_bad_addr_and_presentation() {
        let mut cfg = DashboardConfig::default();
        cfg.addr = "not an addr".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = DashboardConfig::default();
        cfg.presentation = "../secret.pptx".to_string();
        assert!(cfg.validate().is_err());
    }
}
