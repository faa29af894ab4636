// Filesystem and disk I/O models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemUsage {
    pub mount: String,
    pub device: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub percent: f64,
}

/// Per-device I/O rates derived from consecutive /proc/diskstats samples.
/// `io_percent` is the share of wall time the device spent doing I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskIoRates {
    pub device: String,
    pub read_bytes_sec: f64,
    pub write_bytes_sec: f64,
    pub io_percent: f64,
    pub reads: u64,
    pub writes: u64,
}
