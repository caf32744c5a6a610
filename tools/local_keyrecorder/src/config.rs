use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_LOG_FILE;

const MIN_WIDTH: i32 = 320;
const MIN_HEIGHT: i32 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub log_path: PathBuf,
    pub window_title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            window_title: "Local key recorder (educational)".to_string(),
            width: 700,
            height: 480,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub window_title: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Parses `--config`, `--log`, `--title`, `--w` and `--h`. Unknown flags and
/// unparsable numbers are ignored.
pub fn parse_overrides(mut args: impl Iterator<Item = String>) -> CliOverrides {
    let mut overrides = CliOverrides::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(value) = args.next() {
                    overrides.config_path = Some(PathBuf::from(value));
                }
            }
            "--log" => {
                if let Some(value) = args.next() {
                    overrides.log_path = Some(PathBuf::from(value));
                }
            }
            "--title" => {
                if let Some(value) = args.next() {
                    overrides.window_title = Some(value);
                }
            }
            "--w" => {
                if let Some(value) = args.next() {
                    overrides.width = value.parse().ok();
                }
            }
            "--h" => {
                if let Some(value) = args.next() {
                    overrides.height = value.parse().ok();
                }
            }
            _ => {}
        }
    }
    overrides
}

pub fn load_config(overrides: &CliOverrides) -> Result<RecorderConfig> {
    let mut config = match overrides.config_path.as_deref() {
        Some(path) => load_or_create_config(path)?,
        None => RecorderConfig::default(),
    };
    apply_overrides(&mut config, overrides);
    Ok(normalize_config(config))
}

fn load_or_create_config(path: &Path) -> Result<RecorderConfig> {
    if path.exists() {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: RecorderConfig =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        return Ok(config);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let config = RecorderConfig::default();
    let payload = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    fs::write(path, payload).context("Failed to write config file")?;
    Ok(config)
}

fn apply_overrides(config: &mut RecorderConfig, overrides: &CliOverrides) {
    if let Some(log_path) = overrides.log_path.clone() {
        config.log_path = log_path;
    }
    if let Some(title) = overrides.window_title.clone() {
        config.window_title = title;
    }
    if let Some(width) = overrides.width {
        config.width = width;
    }
    if let Some(height) = overrides.height {
        config.height = height;
    }
}

fn normalize_config(mut config: RecorderConfig) -> RecorderConfig {
    if config.log_path.as_os_str().is_empty() {
        config.log_path = PathBuf::from(DEFAULT_LOG_FILE);
    }
    config.width = config.width.max(MIN_WIDTH);
    config.height = config.height.max(MIN_HEIGHT);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_known_flags() {
        let overrides = parse_overrides(args(&["--log", "out.log", "--w", "900", "--bogus", "--h", "tall"]));
        assert_eq!(overrides.log_path, Some(PathBuf::from("out.log")));
        assert_eq!(overrides.width, Some(900));
        assert_eq!(overrides.height, None);
    }

    #[test]
    fn defaults_without_config_file() {
        let config = load_config(&CliOverrides::default()).unwrap();
        assert_eq!(config, RecorderConfig::default());
        assert_eq!(config.log_path, PathBuf::from("local_keyrecorder_edu.log"));
    }

    #[test]
    fn missing_config_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("recorder.json");
        let overrides = CliOverrides {
            config_path: Some(path.clone()),
            ..Default::default()
        };

        let config = load_config(&overrides).unwrap();
        assert_eq!(config, RecorderConfig::default());
        let written: RecorderConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, config);
    }

    #[test]
    fn file_values_are_overridden_and_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recorder.json");
        fs::write(&path, r#"{"log_path": "", "width": 10, "window_title": "Lab"}"#).unwrap();
        let overrides = CliOverrides {
            config_path: Some(path),
            height: Some(600),
            ..Default::default()
        };

        let config = load_config(&overrides).unwrap();
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.window_title, "Lab");
        assert_eq!(config.width, MIN_WIDTH);
        assert_eq!(config.height, 600);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recorder.json");
        fs::write(&path, "{ not json").unwrap();
        let overrides = CliOverrides {
            config_path: Some(path),
            ..Default::default()
        };
        let err = load_config(&overrides).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
