// Snapshot and host-level models

use serde::{Deserialize, Serialize};

use super::{
    ContainerSummary, CpuFrequency, CpuMetrics, DiskIoRates, FilesystemUsage, InterfaceMetrics,
    MemoryMetrics, ProcessSample, SwapMetrics, TcpStates, TemperatureReading,
};

/// Static host identity; computed once per process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSystem {
    pub os: String,
    pub arch: String,
    pub cpu_model: String,
    pub cpu_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UptimeInfo {
    pub uptime_seconds: f64,
    pub boot_time: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadInfo {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub processes_running: u32,
    pub processes_total: u32,
}

/// System-wide file handle usage from /proc/sys/fs/file-nr. Absent from the
/// snapshot when the file is unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdUsage {
    pub allocated: u64,
    pub max: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

/// One fully assembled metrics response. Built fresh per request and
/// discarded after serialization; field order is the wire order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub agent_version: String,
    pub timestamp: String,
    pub hostname: String,
    pub system: HostSystem,
    pub uptime: UptimeInfo,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub swap: SwapMetrics,
    pub load: LoadInfo,
    pub filesystems: Vec<FilesystemUsage>,
    pub disk_io: Vec<DiskIoRates>,
    pub network: Vec<InterfaceMetrics>,
    pub tcp: TcpStates,
    pub processes: Vec<ProcessSample>,
    pub containers: Vec<ContainerSummary>,
    pub logs: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_freq: Option<CpuFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<Vec<TemperatureReading>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_descriptors: Option<FdUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<u64>,
}
