//! Backup pipeline configuration, loaded from a JSON file. See
//! `python_poc/backup_procem_data.py`'s `__main__` block for the
//! enumerated field set this mirrors.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file {path} not found: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_counter_delimiter() -> String {
    "\t".to_string()
}

fn default_compression_command() -> String {
    "7z a".to_string()
}

fn default_compressed_file_extension() -> String {
    "7z".to_string()
}

fn default_compression_success_message() -> String {
    String::new()
}

fn default_backup_hour() -> u32 {
    2
}

fn default_backup_days_cwd() -> i64 {
    3
}

fn default_backup_days_local_backup() -> i64 {
    7
}

/// Configuration for one backup pipeline instance. Field names keep the
/// original's vocabulary (`local_data_directory`, `remote_backup_server`,
/// ...) rather than the hyphenated style of `hub::config::Config`, since
/// this file has always been its own independently-maintained JSON
/// document in the original deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory the router writes day-log and counter files into.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    pub local_data_directory: PathBuf,
    pub local_counter_directory: PathBuf,
    pub remote_backup_server: String,
    pub remote_data_directory: String,
    pub remote_counter_directory: String,

    #[serde(default = "default_counter_delimiter")]
    pub counter_delimiter: String,

    pub local_file_permissions: Option<String>,
    pub remote_file_permissions: Option<String>,

    #[serde(default = "default_compression_command")]
    pub compression_command: String,
    #[serde(default = "default_compressed_file_extension")]
    pub compressed_file_extension: String,
    #[serde(default = "default_compression_success_message")]
    pub compression_success_message: String,

    /// Local hour (0-23) at which the daily cycle runs.
    #[serde(default = "default_backup_hour")]
    pub backup_hour: u32,
    /// Days to keep artifacts in `source_dir` before they must have moved
    /// to the local archive.
    #[serde(default = "default_backup_days_cwd")]
    pub backup_days_cwd: i64,
    /// Days to keep artifacts in the local archive before they must have
    /// moved to the remote server. Clamped to be at least
    /// `backup_days_cwd` (`D_local >= D_cwd`, spec §4.10 step 5).
    #[serde(rename = "backup_days_backup_dir", default = "default_backup_days_local_backup")]
    pub backup_days_local_backup: i64,
}

impl Config {
    pub fn load(path: &std::path::Path) -> Result<Config, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = serde_json::from_str(&text)?;
        config.backup_days_local_backup = config.backup_days_local_backup.max(config.backup_days_cwd);
        Ok(config)
    }
}
