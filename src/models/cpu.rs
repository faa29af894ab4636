// CPU usage, frequency and temperature models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub percent: f64,
    pub cores: Vec<CoreUsage>,
    pub context_switches_sec: f64,
    pub procs_running: u32,
    pub procs_blocked: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreUsage {
    pub id: u32,
    pub percent: f64,
}

/// Mean/min/max of the per-cpu scaling frequencies, in MHz. Absent from the
/// snapshot when no cpufreq entry is readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuFrequency {
    pub current_mhz: f64,
    pub min_mhz: f64,
    pub max_mhz: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub name: String,
    pub celsius: f64,
}
