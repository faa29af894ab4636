// Raw counter readers over /proc and /sys.
//
// Base paths are injectable so tests can point the repo at a synthetic tree.
// Every reader either returns a typed record or a CollectError; nothing here
// panics on a missing or malformed source.

mod parser;

pub use parser::{CoreTicks, CpuTicks, DiskCounters, InterfaceCounters, ProcStatSample};

use std::collections::HashSet;
use std::ffi::CString;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::models::{
    CpuFrequency, FdUsage, FilesystemUsage, LoadInfo, MemoryMetrics, ProcessSample, SwapMetrics,
    TcpStates, TemperatureReading, UptimeInfo,
};
use crate::rates::round1;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected format: {0}")]
    Parse(String),
}

/// Filesystem types that never carry user data; skipped when walking
/// /proc/mounts.
const VIRTUAL_FSTYPES: &[&str] = &[
    "sysfs",
    "proc",
    "devtmpfs",
    "devpts",
    "tmpfs",
    "securityfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "debugfs",
    "tracefs",
    "fusectl",
    "configfs",
    "hugetlbfs",
    "mqueue",
    "binfmt_misc",
    "autofs",
    "overlay",
    "nsfs",
    "bpf",
];

pub struct ProcRepo {
    proc_path: PathBuf,
    sys_path: PathBuf,
}

impl ProcRepo {
    pub fn new() -> Self {
        Self::with_paths("/proc", "/sys")
    }

    pub fn with_paths(proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
        }
    }

    fn read_proc(&self, rel: &str) -> Result<String, CollectError> {
        Ok(fs::read_to_string(self.proc_path.join(rel))?)
    }

    pub fn uptime(&self) -> Result<UptimeInfo, CollectError> {
        let uptime = parser::parse_uptime(&self.read_proc("uptime")?)?;
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| (d.as_secs_f64() - uptime) as i64)
            .unwrap_or(0);
        Ok(UptimeInfo {
            uptime_seconds: round1(uptime),
            boot_time,
        })
    }

    /// Raw tick counters from /proc/stat; rates are the caller's business.
    pub fn cpu(&self) -> Result<ProcStatSample, CollectError> {
        parser::parse_proc_stat(&self.read_proc("stat")?)
    }

    pub fn memory(&self) -> Result<(MemoryMetrics, SwapMetrics), CollectError> {
        Ok(parser::parse_meminfo(&self.read_proc("meminfo")?))
    }

    pub fn load(&self) -> Result<LoadInfo, CollectError> {
        parser::parse_loadavg(&self.read_proc("loadavg")?)
    }

    pub fn disk_counters(&self) -> Result<Vec<DiskCounters>, CollectError> {
        Ok(parser::parse_diskstats(&self.read_proc("diskstats")?))
    }

    pub fn interface_counters(&self) -> Result<Vec<InterfaceCounters>, CollectError> {
        Ok(parser::parse_net_dev(&self.read_proc("net/dev")?))
    }

    /// TCP connection counts over /proc/net/tcp and tcp6. A missing file
    /// contributes nothing; the result is always present (possibly all
    /// zeros).
    pub fn tcp_states(&self) -> TcpStates {
        let mut counts = TcpStates::default();
        for file in ["net/tcp", "net/tcp6"] {
            if let Ok(content) = self.read_proc(file) {
                parser::count_tcp_states(&content, &mut counts);
            }
        }
        counts
    }

    pub fn file_descriptors(&self) -> Result<FdUsage, CollectError> {
        parser::parse_file_nr(&self.read_proc("sys/fs/file-nr")?)
    }

    pub fn entropy(&self) -> Result<u64, CollectError> {
        parser::parse_entropy(&self.read_proc("sys/kernel/random/entropy_avail")?)
    }

    /// Mounted filesystems with usage, from /proc/mounts plus statvfs.
    /// Virtual fstypes, repeated mount points and zero-size filesystems are
    /// skipped.
    pub fn filesystems(&self) -> Result<Vec<FilesystemUsage>, CollectError> {
        let mounts = self.read_proc("mounts")?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for line in mounts.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                continue;
            }
            let (device, mount, fstype) = (parts[0], parts[1], parts[2]);
            if VIRTUAL_FSTYPES.contains(&fstype) || !seen.insert(mount.to_string()) {
                continue;
            }
            let Some((total, available)) = statvfs(mount) else {
                continue;
            };
            if total == 0 {
                continue;
            }
            let used = total - available;
            out.push(FilesystemUsage {
                mount: mount.to_string(),
                device: device.rsplit('/').next().unwrap_or(device).to_string(),
                fstype: fstype.to_string(),
                total,
                used,
                available,
                percent: round1(used as f64 / total as f64 * 100.0),
            });
        }
        Ok(out)
    }

    /// Top `n` processes by lifetime CPU share, straight from
    /// /proc/<pid>/stat. Processes that vanish mid-walk are skipped.
    pub fn top_processes(&self, n: usize) -> Result<Vec<ProcessSample>, CollectError> {
        let uptime = parser::parse_uptime(&self.read_proc("uptime")?)?;
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) }.max(1) as u64;
        let clock_ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) }.max(1) as f64;

        let mut samples = Vec::new();
        for entry in fs::read_dir(&self.proc_path)?.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
                continue;
            };
            if let Some(sample) = parser::parse_pid_stat(&stat, pid, page_size, clock_ticks, uptime)
            {
                samples.push(sample);
            }
        }
        samples.sort_by(|a, b| b.cpu.total_cmp(&a.cpu));
        samples.truncate(n);
        Ok(samples)
    }

    /// Mean/min/max of per-cpu scaling frequencies, or None when no cpufreq
    /// entry is readable.
    pub fn cpu_frequency(&self) -> Option<CpuFrequency> {
        let cpu_dir = self.sys_path.join("devices/system/cpu");
        let mut mhz = Vec::new();
        for entry in fs::read_dir(cpu_dir).ok()?.flatten() {
            let name = entry.file_name();
            let Some(rest) = name.to_str().and_then(|s| s.strip_prefix("cpu")) else {
                continue;
            };
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(content) = fs::read_to_string(entry.path().join("cpufreq/scaling_cur_freq"))
                && let Ok(khz) = content.trim().parse::<f64>()
            {
                mhz.push(khz / 1000.0);
            }
        }
        if mhz.is_empty() {
            return None;
        }
        let current = mhz.iter().sum::<f64>() / mhz.len() as f64;
        let min = mhz.iter().copied().fold(f64::INFINITY, f64::min);
        let max = mhz.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(CpuFrequency {
            current_mhz: current.round(),
            min_mhz: min.round(),
            max_mhz: max.round(),
        })
    }

    /// Thermal-zone and hwmon sensor readings, or None when no sensor is
    /// readable.
    pub fn temperatures(&self) -> Option<Vec<TemperatureReading>> {
        let mut temps = Vec::new();

        if let Ok(zones) = fs::read_dir(self.sys_path.join("class/thermal")) {
            for zone in zones.flatten() {
                if !zone
                    .file_name()
                    .to_str()
                    .is_some_and(|s| s.starts_with("thermal_zone"))
                {
                    continue;
                }
                let Ok(raw) = fs::read_to_string(zone.path().join("temp")) else {
                    continue;
                };
                let Ok(millideg) = raw.trim().parse::<i64>() else {
                    continue;
                };
                let name = fs::read_to_string(zone.path().join("type"))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|_| "unknown".into());
                temps.push(TemperatureReading {
                    name,
                    celsius: round1(millideg as f64 / 1000.0),
                });
            }
        }

        if let Ok(chips) = fs::read_dir(self.sys_path.join("class/hwmon")) {
            for chip in chips.flatten() {
                let Ok(files) = fs::read_dir(chip.path()) else {
                    continue;
                };
                for file in files.flatten() {
                    let name = file.file_name();
                    let Some(name) = name.to_str() else { continue };
                    let Some(prefix) = name.strip_suffix("_input") else {
                        continue;
                    };
                    if !name.starts_with("temp") {
                        continue;
                    }
                    let Ok(raw) = fs::read_to_string(file.path()) else {
                        continue;
                    };
                    let Ok(millideg) = raw.trim().parse::<i64>() else {
                        continue;
                    };
                    let label = fs::read_to_string(chip.path().join(format!("{prefix}_label")))
                        .map(|s| s.trim().to_string())
                        .unwrap_or_else(|_| prefix.to_string());
                    temps.push(TemperatureReading {
                        name: label,
                        celsius: round1(millideg as f64 / 1000.0),
                    });
                }
            }
        }

        if temps.is_empty() { None } else { Some(temps) }
    }
}

impl Default for ProcRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// statvfs(3) totals for one mount point: (total bytes, available bytes).
fn statvfs(path: &str) -> Option<(u64, u64)> {
    let c_path = CString::new(path).ok()?;
    let mut vfs = std::mem::MaybeUninit::<libc::statvfs>::zeroed();
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), vfs.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    let vfs = unsafe { vfs.assume_init() };
    let total = vfs.f_blocks as u64 * vfs.f_frsize as u64;
    let available = vfs.f_bavail as u64 * vfs.f_frsize as u64;
    Some((total, available))
}
