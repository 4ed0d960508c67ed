//! Router configuration, loaded from a JSON file. See spec §6
//! "Configuration (enumerated)".

use std::net::SocketAddr;
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

/// The IoT-Ticket wire protocol variant. See SPEC_FULL.md §15 and
/// `procem_rtl.py`'s `IOTTICKET_VERSION` branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadProtocol {
    Old,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Json,
    Csv,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:6666".parse().unwrap()
}

fn default_fanout_addr() -> SocketAddr {
    "127.0.0.1:7777".parse().unwrap()
}

fn default_iotticket_buffer_size() -> usize {
    50
}

fn default_iotticket_max_packet_size() -> usize {
    500
}

fn default_iotticket_minimum_delay_s() -> f64 {
    1.0
}

fn default_iotticket_maximum_retries() -> u32 {
    5
}

fn default_iotticket_max_data_cycles() -> u32 {
    5
}

fn default_procem_iotticket_workers() -> usize {
    10
}

fn default_iotticket_queue_size() -> usize {
    1024
}

fn default_db_queue_size() -> usize {
    1024
}

fn default_present_value_count() -> usize {
    10
}

fn default_db_type() -> DbType {
    DbType::Csv
}

fn default_upload_protocol() -> UploadProtocol {
    UploadProtocol::New
}

fn default_spill_dir() -> PathBuf {
    PathBuf::from("./spill")
}

fn default_day_log_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_ids_for_battery() -> Vec<i64> {
    Vec::new()
}

fn default_store_capacity() -> usize {
    100
}

/// Router configuration as enumerated by spec §6, with a handful of
/// additional addressing/path fields the enumerated list omits but a
/// running process needs (listen/fan-out addresses, spool directories).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub deviceid: String,
    pub username: String,
    pub password: String,
    pub baseurl: String,

    #[serde(rename = "iotticket-version", default = "default_upload_protocol")]
    pub iotticket_version: UploadProtocol,

    #[serde(default = "default_true")]
    pub db_storage_on: bool,
    #[serde(default = "default_true")]
    pub iotticket_send_on: bool,
    #[serde(default = "default_false")]
    pub battery_demo_on: bool,

    #[serde(rename = "iotticket-buffer-size", default = "default_iotticket_buffer_size")]
    pub iotticket_buffer_size: usize,
    #[serde(
        rename = "iotticket-max-packet-size",
        default = "default_iotticket_max_packet_size"
    )]
    pub iotticket_max_packet_size: usize,
    #[serde(
        rename = "iotticket-minimum-delay-s",
        default = "default_iotticket_minimum_delay_s"
    )]
    pub iotticket_minimum_delay_s: f64,
    #[serde(
        rename = "iotticket-maximum-retries",
        default = "default_iotticket_maximum_retries"
    )]
    pub iotticket_maximum_retries: u32,
    #[serde(
        rename = "iotticket-max-data-cycles",
        default = "default_iotticket_max_data_cycles"
    )]
    pub iotticket_max_data_cycles: u32,
    #[serde(
        rename = "procem-iotticket-workers",
        default = "default_procem_iotticket_workers"
    )]
    pub procem_iotticket_workers: usize,
    #[serde(rename = "iotticket-queue-size", default = "default_iotticket_queue_size")]
    pub iotticket_queue_size: usize,

    #[serde(rename = "db-queue-size", default = "default_db_queue_size")]
    pub db_queue_size: usize,
    #[serde(default = "default_db_type")]
    pub db_type: DbType,

    #[serde(default = "default_present_value_count")]
    pub present_value_count: usize,
    #[serde(default = "default_ids_for_battery")]
    pub ids_for_battery: Vec<i64>,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_fanout_addr")]
    pub fanout_addr: SocketAddr,
    #[serde(default = "default_spill_dir")]
    pub spill_dir: PathBuf,
    #[serde(default = "default_day_log_dir")]
    pub day_log_dir: PathBuf,
    /// Per-id cap on the latest-value store (spec §3 "K", configurable
    /// globally). Not part of spec §6's enumerated config surface, which
    /// only names the query-side truncation count `present_value_count`
    /// ("M"); this is the complementary storage-side bound a running
    /// process still needs a value for.
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
    /// Whether the router ingress replies `"OK"` to confirm receipt of a
    /// data datagram (spec §4.4). Mirrors the original's
    /// `USE_UDP_CONFIRMATION` constant.
    #[serde(default = "default_true")]
    pub udp_confirmation_on: bool,
}

impl Config {
    pub fn load(path: &std::path::Path) -> Result<Config, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_applies_defaults() {
        let json = r#"{
            "deviceid": "dev-1",
            "username": "user",
            "password": "pass",
            "baseurl": "https://example.test/api/"
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.iotticket_buffer_size, 50);
        assert_eq!(config.iotticket_version, UploadProtocol::New);
        assert!(config.db_storage_on);
        assert!(config.ids_for_battery.is_empty());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let json = r#"{
            "deviceid": "dev-1",
            "username": "user",
            "password": "pass",
            "baseurl": "https://example.test/api/",
            "typo-field": true
        }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
