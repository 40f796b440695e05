use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV_PREFIX: &str = "ARGOT";

pub const URL_PLACEHOLDER: &str = "%URL%";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_feed_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout: default_feed_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_feed_url() -> String {
    "http://localhost:5000/posts".into()
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("argot/{}", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_margin_horizontal")]
    pub margin_horizontal: u16,
    #[serde(default = "default_margin_vertical")]
    pub margin_vertical: u16,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            margin_horizontal: default_margin_horizontal(),
            margin_vertical: default_margin_vertical(),
        }
    }
}

fn default_title() -> String {
    "argot".into()
}

fn default_margin_horizontal() -> u16 {
    2
}

fn default_margin_vertical() -> u16 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    // `%URL%` is replaced by the link, otherwise it is appended. Empty means webbrowser.
    #[serde(default = "default_launch_command")]
    pub command: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            command: default_launch_command(),
        }
    }
}

fn default_launch_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["open".into(), URL_PLACEHOLDER.into()]
    } else if cfg!(target_os = "windows") {
        vec![
            "cmd".into(),
            "/C".into(),
            "start".into(),
            String::new(),
            URL_PLACEHOLDER.into(),
        ]
    } else {
        vec!["xdg-open".into(), URL_PLACEHOLDER.into()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("argot").join("argot.log"))
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        cfg = read_config_file(path)?;
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            cfg = read_config_file(&default_path)?;
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn apply_env(cfg: &mut Config, prefix: &str) {
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            apply_env_value(cfg, &normalized, value);
        }
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "feed.url" => cfg.feed.url = value,
        "feed.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.feed.timeout = duration;
            }
        }
        "feed.user_agent" => cfg.feed.user_agent = value,
        "ui.title" => cfg.ui.title = value,
        "ui.margin_horizontal" => {
            if let Ok(parsed) = value.parse::<u16>() {
                cfg.ui.margin_horizontal = parsed;
            }
        }
        "ui.margin_vertical" => {
            if let Ok(parsed) = value.parse::<u16>() {
                cfg.ui.margin_vertical = parsed;
            }
        }
        "launcher.command" => {
            cfg.launcher.command = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        "log.level" => cfg.log.level = value,
        _ => {}
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("argot").join("config.yaml"))
}
