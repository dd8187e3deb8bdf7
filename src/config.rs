use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Error, Result};

fn default_sample_every() -> usize {
    150
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Source .osm document, optionally xz-compressed.
    pub data_path: String,
    /// Directory receiving the CSV tables and the sample document.
    pub dest_path: String,
    /// Sampling keeps every k-th entity.
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,
    #[serde(default)]
    pub progress: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl UserConfig {
    pub fn new(data_path: impl Into<String>, dest_path: impl Into<String>) -> Self {
        UserConfig {
            data_path: data_path.into(),
            dest_path: dest_path.into(),
            sample_every: default_sample_every(),
            progress: false,
            log_level: default_log_level(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_every == 0 {
            return Err("sample_every must be at least 1".into());
        }
        Ok(())
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| Error::from(format!("could not open config file {}: {}", path.display(), err)))?;
    let config: UserConfig = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::from(format!("could not parse config {}: {}", path.display(), err)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let file = write_config(r#"{"data_path": "austin_texas.osm.xz", "dest_path": "output"}"#);
        let config = load_user_config(file.path()).unwrap();
        assert_eq!(config.data_path, "austin_texas.osm.xz");
        assert_eq!(config.sample_every, 150);
        assert!(!config.progress);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_zero_sample_interval_is_rejected() {
        let file = write_config(r#"{"data_path": "a.osm", "dest_path": "out", "sample_every": 0}"#);
        let err = load_user_config(file.path()).unwrap_err();
        assert!(err.message.contains("sample_every"));
    }

    #[test]
    fn test_missing_required_field() {
        let file = write_config(r#"{"data_path": "a.osm"}"#);
        let err = load_user_config(file.path()).unwrap_err();
        assert!(err.message.contains("dest_path"));
    }
}
