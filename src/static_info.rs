// Static host identity: computed lazily on first access, never invalidated.

use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct StaticInfo {
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub cpu_model: String,
    pub cpu_count: u32,
}

/// Process-wide static host facts. The first caller pays for the detection;
/// everyone else reads the cached value.
pub fn get() -> &'static StaticInfo {
    static INFO: OnceLock<StaticInfo> = OnceLock::new();
    INFO.get_or_init(detect)
}

fn detect() -> StaticInfo {
    StaticInfo {
        hostname: sysinfo::System::host_name().unwrap_or_else(|| "unknown".into()),
        os: read_os_pretty_name().unwrap_or_else(|| "Linux".into()),
        arch: std::env::consts::ARCH.to_string(),
        cpu_model: read_cpu_model().unwrap_or_else(|| "unknown".into()),
        cpu_count: std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1),
    }
}

/// First "model name" entry from /proc/cpuinfo.
fn read_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let model = line.split_once(':').map(|(_, v)| v.trim())?;
                if !model.is_empty() {
                    return Some(model.to_string());
                }
            }
        }
    }
    None
}

/// PRETTY_NAME from /etc/os-release.
fn read_os_pretty_name() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        for line in content.lines() {
            if let Some(v) = line.strip_prefix("PRETTY_NAME=") {
                let v = v.trim().trim_matches('"');
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}
