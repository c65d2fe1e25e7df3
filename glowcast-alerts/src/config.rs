//! Service configuration
//!
//! Resolution priority, highest first: command-line argument,
//! environment variable, TOML config file, compiled default. The tuning
//! section only comes from the file; the defaults are the reference
//! values.

use crate::error::{Error, Result};
use glowcast_common::tuning::AlertTuning;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for the alert dispatcher
pub const DEFAULT_PORT: u16 = 5890;

/// Alert dispatcher configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// Relative media paths in event action configs resolve against this
    pub media_root: PathBuf,
    pub tuning: AlertTuning,
}

/// Optional TOML file shape; every field may be omitted
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    db_path: Option<PathBuf>,
    media_root: Option<PathBuf>,
    #[serde(default)]
    tuning: Option<AlertTuning>,
}

impl Config {
    /// Resolve configuration from CLI values and an optional config file
    pub fn resolve(
        cli_port: Option<u16>,
        cli_db_path: Option<PathBuf>,
        cli_media_root: Option<PathBuf>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str::<FileConfig>(&content)
                    .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?
            }
            None => FileConfig::default(),
        };

        Ok(Self {
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            db_path: cli_db_path
                .or(file.db_path)
                .unwrap_or_else(|| PathBuf::from("glowcast.db")),
            media_root: cli_media_root
                .or(file.media_root)
                .unwrap_or_else(|| PathBuf::from(".")),
            tuning: file.tuning.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(None, None, None, None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.db_path, PathBuf::from("glowcast.db"));
        assert_eq!(config.tuning.speech_timeout_ms, 30_000);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = 6000").unwrap();
        writeln!(file, "media_root = \"/srv/media\"").unwrap();

        let config =
            Config::resolve(Some(7000), None, None, Some(file.path())).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_file_tuning_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[tuning]").unwrap();
        writeln!(file, "min_display_ms = 500").unwrap();
        writeln!(file, "assumed_video_duration_ms = 8000").unwrap();
        writeln!(file, "speech_timeout_ms = 15000").unwrap();
        writeln!(file, "speech_gap_ms = 250").unwrap();
        writeln!(file, "speech_max_pending = 5").unwrap();

        let config = Config::resolve(None, None, None, Some(file.path())).unwrap();
        assert_eq!(config.tuning.min_display_ms, 500);
        assert_eq!(config.tuning.speech_max_pending, 5);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        assert!(Config::resolve(None, None, None, Some(file.path())).is_err());
    }
}
