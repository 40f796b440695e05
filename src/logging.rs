use std::fs::{self, File};
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::LogConfig;

// Records go to a file because the UI owns the terminal.
pub fn init(cfg: &LogConfig) -> bool {
    let level = parse_level(&cfg.level);
    if level == LevelFilter::Off {
        return false;
    }
    let Some(path) = cfg.file.as_deref() else {
        return false;
    };
    let Some(file) = open_log_file(path) else {
        return false;
    };

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, log_config, file).is_ok()
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return None;
        }
    }
    File::create(path).ok()
}

pub fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::Info)
}
