// Pure text parsers for /proc counter files. No file access here; the repo
// reads, these extract.

use super::CollectError;
use crate::models::{
    FdUsage, LoadInfo, MemoryMetrics, ProcessSample, SwapMetrics, TcpStates,
};
use crate::rates::{round1, round2};

/// Idle and total jiffies for one cpu line. Idle includes iowait; total is
/// the sum of the first seven time fields.
#[derive(Debug, Clone, Copy)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CoreTicks {
    pub id: u32,
    pub ticks: CpuTicks,
}

/// Everything we take from one read of /proc/stat.
#[derive(Debug, Clone)]
pub struct ProcStatSample {
    pub aggregate: CpuTicks,
    pub cores: Vec<CoreTicks>,
    pub context_switches: u64,
    pub procs_running: u32,
    pub procs_blocked: u32,
}

/// Raw per-device counters from /proc/diskstats (whole disks only).
#[derive(Debug, Clone)]
pub struct DiskCounters {
    pub device: String,
    pub reads: u64,
    pub writes: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub io_time_ms: u64,
}

/// Raw per-interface counters from /proc/net/dev.
#[derive(Debug, Clone)]
pub struct InterfaceCounters {
    pub interface: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_dropped: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_dropped: u64,
}

fn parse_u64(s: &str) -> Result<u64, CollectError> {
    s.parse::<u64>()
        .map_err(|_| CollectError::Parse(format!("expected integer, got {s:?}")))
}

fn ticks_from_fields(fields: &[&str]) -> Result<CpuTicks, CollectError> {
    if fields.len() < 7 {
        return Err(CollectError::Parse("short cpu line".into()));
    }
    let mut values = [0u64; 7];
    for (slot, field) in values.iter_mut().zip(fields) {
        *slot = parse_u64(field)?;
    }
    Ok(CpuTicks {
        idle: values[3] + values[4],
        total: values.iter().sum(),
    })
}

pub fn parse_proc_stat(content: &str) -> Result<ProcStatSample, CollectError> {
    let mut aggregate = None;
    let mut cores = Vec::new();
    let mut context_switches = 0;
    let mut procs_running = 0;
    let mut procs_blocked = 0;

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        let fields: Vec<&str> = fields.collect();
        if label == "cpu" {
            aggregate = Some(ticks_from_fields(&fields)?);
        } else if let Some(id) = label.strip_prefix("cpu")
            && let Ok(id) = id.parse::<u32>()
        {
            cores.push(CoreTicks {
                id,
                ticks: ticks_from_fields(&fields)?,
            });
        } else if label == "ctxt" {
            context_switches = fields.first().map(|f| parse_u64(f)).transpose()?.unwrap_or(0);
        } else if label == "procs_running" {
            procs_running = fields.first().and_then(|f| f.parse().ok()).unwrap_or(0);
        } else if label == "procs_blocked" {
            procs_blocked = fields.first().and_then(|f| f.parse().ok()).unwrap_or(0);
        }
    }

    Ok(ProcStatSample {
        aggregate: aggregate.ok_or_else(|| CollectError::Parse("no aggregate cpu line".into()))?,
        cores,
        context_switches,
        procs_running,
        procs_blocked,
    })
}

/// First field of /proc/uptime: seconds since boot.
pub fn parse_uptime(content: &str) -> Result<f64, CollectError> {
    content
        .split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CollectError::Parse("bad uptime".into()))
}

/// One pass over /proc/meminfo. Values are `Key: value kB`; unparsable lines
/// are skipped, missing keys read as zero.
pub fn parse_meminfo(content: &str) -> (MemoryMetrics, SwapMetrics) {
    let field = |name: &str| -> u64 {
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix(name)
                && let Some(rest) = rest.strip_prefix(':')
                && let Some(kb) = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok())
            {
                return kb * 1024;
            }
        }
        0
    };

    let total = field("MemTotal");
    let available = field("MemAvailable");
    let used = total.saturating_sub(available);
    let swap_total = field("SwapTotal");
    let swap_free = field("SwapFree");
    let swap_used = swap_total.saturating_sub(swap_free);

    (
        MemoryMetrics {
            total,
            used,
            available,
            buffers: field("Buffers"),
            cached: field("Cached"),
            slab: field("Slab"),
            percent: if total > 0 {
                round1(used as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
        },
        SwapMetrics {
            total: swap_total,
            used: swap_used,
            free: swap_free,
            percent: if swap_total > 0 {
                round1(swap_used as f64 / swap_total as f64 * 100.0)
            } else {
                0.0
            },
        },
    )
}

pub fn parse_loadavg(content: &str) -> Result<LoadInfo, CollectError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(CollectError::Parse("short loadavg".into()));
    }
    let load = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| CollectError::Parse(format!("bad load value {s:?}")))
    };
    let (running, total) = parts[3]
        .split_once('/')
        .ok_or_else(|| CollectError::Parse("bad running/total field".into()))?;
    Ok(LoadInfo {
        load1: load(parts[0])?,
        load5: load(parts[1])?,
        load15: load(parts[2])?,
        processes_running: running.parse().unwrap_or(0),
        processes_total: total.parse().unwrap_or(0),
    })
}

/// Whole-disk device names: sdX, vdX, xvdX (single trailing letter) and
/// nvme<n>n<m>. Partitions and virtual devices are excluded.
fn is_physical_disk(name: &str) -> bool {
    if let Some(rest) = name.strip_prefix("nvme") {
        if let Some((ctrl, ns)) = rest.split_once('n') {
            return !ctrl.is_empty()
                && !ns.is_empty()
                && ctrl.bytes().all(|b| b.is_ascii_digit())
                && ns.bytes().all(|b| b.is_ascii_digit());
        }
        return false;
    }
    let rest = name
        .strip_prefix("sd")
        .or_else(|| name.strip_prefix("vd"))
        .or_else(|| name.strip_prefix("xvd"));
    matches!(rest, Some(r) if r.len() == 1 && r.as_bytes()[0].is_ascii_lowercase())
}

const SECTOR_SIZE: u64 = 512;

/// /proc/diskstats rows for whole disks. Malformed rows are skipped.
pub fn parse_diskstats(content: &str) -> Vec<DiskCounters> {
    let mut disks = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue;
        }
        let device = parts[2];
        if !is_physical_disk(device) {
            continue;
        }
        let field = |i: usize| parts[i].parse::<u64>().ok();
        let (Some(reads), Some(read_sectors), Some(writes), Some(write_sectors), Some(io_time)) = (
            field(3),
            field(5),
            field(7),
            field(9),
            field(12),
        ) else {
            continue;
        };
        disks.push(DiskCounters {
            device: device.to_string(),
            reads,
            writes,
            read_bytes: read_sectors * SECTOR_SIZE,
            write_bytes: write_sectors * SECTOR_SIZE,
            io_time_ms: io_time,
        });
    }
    disks
}

fn is_virtual_interface(name: &str) -> bool {
    name == "lo" || name.starts_with("veth") || name.starts_with("br-") || name.starts_with("docker")
}

/// /proc/net/dev rows, excluding loopback and container-side virtual
/// interfaces.
pub fn parse_net_dev(content: &str) -> Vec<InterfaceCounters> {
    let mut interfaces = Vec::new();
    for line in content.lines().skip(2) {
        let Some((name, stats)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if is_virtual_interface(name) {
            continue;
        }
        let stats: Vec<&str> = stats.split_whitespace().collect();
        if stats.len() < 16 {
            continue;
        }
        let field = |i: usize| stats[i].parse::<u64>().unwrap_or(0);
        interfaces.push(InterfaceCounters {
            interface: name.to_string(),
            rx_bytes: field(0),
            rx_packets: field(1),
            rx_errors: field(2),
            rx_dropped: field(3),
            tx_bytes: field(8),
            tx_packets: field(9),
            tx_errors: field(10),
            tx_dropped: field(11),
        });
    }
    interfaces
}

/// Accumulate connection counts from one /proc/net/tcp{,6} file into
/// `counts`. Unknown state codes count only toward `total`.
pub fn count_tcp_states(content: &str, counts: &mut TcpStates) {
    for line in content.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        counts.total += 1;
        match parts[3].to_ascii_uppercase().as_str() {
            "01" => counts.established += 1,
            "02" => counts.syn_sent += 1,
            "03" => counts.syn_recv += 1,
            "04" => counts.fin_wait1 += 1,
            "05" => counts.fin_wait2 += 1,
            "06" => counts.time_wait += 1,
            "07" => counts.close += 1,
            "08" => counts.close_wait += 1,
            "09" => counts.last_ack += 1,
            "0A" => counts.listen += 1,
            "0B" => counts.closing += 1,
            _ => {}
        }
    }
}

/// /proc/sys/fs/file-nr: allocated, freed, max.
pub fn parse_file_nr(content: &str) -> Result<FdUsage, CollectError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(CollectError::Parse("short file-nr".into()));
    }
    let allocated = parse_u64(parts[0])?;
    let max = parse_u64(parts[2])?;
    Ok(FdUsage {
        allocated,
        max,
        percent: if max > 0 {
            round2(allocated as f64 / max as f64 * 100.0)
        } else {
            0.0
        },
    })
}

pub fn parse_entropy(content: &str) -> Result<u64, CollectError> {
    parse_u64(content.trim())
}

/// One /proc/<pid>/stat line. The command name sits between the outermost
/// parentheses and may itself contain spaces or parentheses; fields are
/// indexed from the text after the closing one.
pub fn parse_pid_stat(
    content: &str,
    pid: u32,
    page_size: u64,
    clock_ticks: f64,
    system_uptime: f64,
) -> Option<ProcessSample> {
    let comm_start = content.find('(')?;
    let comm_end = content.rfind(')')?;
    let name: String = content
        .get(comm_start + 1..comm_end)?
        .chars()
        .take(15)
        .collect();
    let fields: Vec<&str> = content.get(comm_end + 2..)?.split_whitespace().collect();
    if fields.len() < 22 {
        return None;
    }
    let utime: u64 = fields[11].parse().ok()?;
    let stime: u64 = fields[12].parse().ok()?;
    let starttime: u64 = fields[19].parse().ok()?;
    let vsize: u64 = fields[20].parse().ok()?;
    let rss_pages: u64 = fields[21].parse().ok()?;

    let total_time = (utime + stime) as f64;
    let proc_uptime = system_uptime - starttime as f64 / clock_ticks;
    let cpu = if proc_uptime > 0.0 {
        round1(total_time / clock_ticks / proc_uptime * 100.0)
    } else {
        0.0
    };

    Some(ProcessSample {
        pid,
        name,
        cpu,
        mem_rss: rss_pages * page_size,
        mem_virt: vsize,
    })
}
