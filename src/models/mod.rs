// Wire models for the metrics snapshot

mod container;
mod cpu;
mod memory;
mod network;
mod process;
mod storage;
mod system;

pub use container::ContainerSummary;
pub use cpu::{CoreUsage, CpuFrequency, CpuMetrics, TemperatureReading};
pub use memory::{MemoryMetrics, SwapMetrics};
pub use network::{InterfaceMetrics, TcpStates};
pub use process::ProcessSample;
pub use storage::{DiskIoRates, FilesystemUsage};
pub use system::{FdUsage, HostSystem, LoadInfo, LogEntry, Snapshot, UptimeInfo};
