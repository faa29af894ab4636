// Snapshot orchestration: fan every collection task out onto a bounded
// pool, join them all, assemble one immutable snapshot.
//
// The two rate trackers owned here are the only state that survives a
// request. Everything else is built fresh per call and dropped after
// serialization.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::sync::Semaphore;

use crate::docker_repo::DockerRepo;
use crate::logs_repo::LogsRepo;
use crate::models::{CoreUsage, CpuMetrics, DiskIoRates, HostSystem, InterfaceMetrics, Snapshot};
use crate::proc_repo::{CollectError, ProcRepo};
use crate::rates::{CoreUsageTracker, RateTracker, round1};
use crate::static_info;
use crate::version;

pub struct Collector {
    proc: Arc<ProcRepo>,
    docker: Arc<DockerRepo>,
    logs: Arc<LogsRepo>,
    rates: Arc<RateTracker>,
    cores: Arc<CoreUsageTracker>,
    pool: Arc<Semaphore>,
    top_processes: usize,
}

impl Collector {
    pub fn new(
        proc: Arc<ProcRepo>,
        docker: Arc<DockerRepo>,
        logs: Arc<LogsRepo>,
        concurrency: usize,
        top_processes: usize,
    ) -> Self {
        Self {
            proc,
            docker,
            logs,
            rates: Arc::new(RateTracker::new()),
            cores: Arc::new(CoreUsageTracker::new()),
            pool: Arc::new(Semaphore::new(concurrency.max(1))),
            top_processes,
        }
    }

    /// One full collection pass. All units are joined unconditionally:
    /// there is no partial-timeout policy, so a hung collector elongates
    /// this one response rather than producing a partial snapshot. Each
    /// unit's failure is converted to its documented default at the unit
    /// boundary and never aborts the pass.
    pub async fn collect(&self) -> Snapshot {
        let info = static_info::get();

        let (
            uptime,
            cpu,
            cpu_freq,
            temperatures,
            memory,
            filesystems,
            disk_io,
            network,
            tcp,
            load,
            file_descriptors,
            entropy,
            processes,
            containers,
            logs,
        ) = tokio::join!(
            self.unit("uptime", {
                let proc = self.proc.clone();
                move || proc.uptime()
            }),
            self.unit("cpu", {
                let proc = self.proc.clone();
                let rates = self.rates.clone();
                let cores = self.cores.clone();
                move || Ok(cpu_metrics(&proc, &rates, &cores))
            }),
            self.unit("cpu_freq", {
                let proc = self.proc.clone();
                move || Ok(proc.cpu_frequency())
            }),
            self.unit("temperatures", {
                let proc = self.proc.clone();
                move || Ok(proc.temperatures())
            }),
            self.unit("memory", {
                let proc = self.proc.clone();
                move || proc.memory()
            }),
            self.unit("filesystems", {
                let proc = self.proc.clone();
                move || proc.filesystems()
            }),
            self.unit("disk_io", {
                let proc = self.proc.clone();
                let rates = self.rates.clone();
                move || Ok(disk_io_rates(&proc, &rates))
            }),
            self.unit("network", {
                let proc = self.proc.clone();
                let rates = self.rates.clone();
                move || Ok(network_metrics(&proc, &rates))
            }),
            self.unit("tcp", {
                let proc = self.proc.clone();
                move || Ok(proc.tcp_states())
            }),
            self.unit("load", {
                let proc = self.proc.clone();
                move || proc.load()
            }),
            self.unit("file_descriptors", {
                let proc = self.proc.clone();
                move || Ok(proc.file_descriptors().ok())
            }),
            self.unit("entropy", {
                let proc = self.proc.clone();
                move || Ok(proc.entropy().ok())
            }),
            self.unit("processes", {
                let proc = self.proc.clone();
                let n = self.top_processes;
                move || proc.top_processes(n)
            }),
            self.io_unit(self.docker.list_running_containers()),
            self.io_unit(self.logs.collect()),
        );

        let (memory, swap) = memory.unwrap_or_default();

        Snapshot {
            agent_version: version::VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            hostname: info.hostname.clone(),
            system: HostSystem {
                os: info.os.clone(),
                arch: info.arch.clone(),
                cpu_model: info.cpu_model.clone(),
                cpu_count: info.cpu_count,
            },
            uptime: uptime.unwrap_or_default(),
            cpu: cpu.unwrap_or_default(),
            memory,
            swap,
            load: load.unwrap_or_default(),
            filesystems: filesystems.unwrap_or_default(),
            disk_io: disk_io.unwrap_or_default(),
            network: network.unwrap_or_default(),
            tcp: tcp.unwrap_or_default(),
            processes: processes.unwrap_or_default(),
            containers,
            logs,
            cpu_freq: cpu_freq.flatten(),
            temperatures: temperatures.flatten(),
            file_descriptors: file_descriptors.flatten(),
            entropy: entropy.flatten(),
        }
    }

    /// Run one blocking collection task under a pool permit. Errors are
    /// logged and mapped to None at this boundary; a panicking task is also
    /// contained here (the join error surfaces as None).
    async fn unit<T, F>(&self, operation: &'static str, task: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, CollectError> + Send + 'static,
    {
        let permit = self.pool.clone().acquire_owned().await.ok()?;
        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task()
        })
        .await;
        match joined {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, operation, "collector source unavailable");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, operation, "collector task died");
                None
            }
        }
    }

    /// Async units (socket, subprocess) hold a pool permit for their whole
    /// run; they are already infallible by construction.
    async fn io_unit<T>(&self, work: impl Future<Output = T>) -> T {
        let _permit = self.pool.clone().acquire_owned().await.ok();
        work.await
    }
}

/// Aggregate and per-core CPU usage plus context-switch rate, derived from
/// one /proc/stat sample through the shared trackers. Percentages are
/// clamped to [0, 100]; the context-switch rate is reported as computed.
fn cpu_metrics(proc: &ProcRepo, rates: &RateTracker, cores: &CoreUsageTracker) -> CpuMetrics {
    let sample = match proc.cpu() {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, operation = "cpu", "collector source unavailable");
            return CpuMetrics::default();
        }
    };

    let idle_rate = rates.update("cpu_idle", sample.aggregate.idle);
    let total_rate = rates.update("cpu_total", sample.aggregate.total);
    let percent = if total_rate > 0.0 {
        round1((1.0 - idle_rate / total_rate) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let core_usage = sample
        .cores
        .iter()
        .map(|core| CoreUsage {
            id: core.id,
            percent: cores
                .update(core.id, core.ticks.idle, core.ticks.total)
                .clamp(0.0, 100.0),
        })
        .collect();

    CpuMetrics {
        percent,
        cores: core_usage,
        context_switches_sec: round1(rates.update("ctxt", sample.context_switches)),
        procs_running: sample.procs_running,
        procs_blocked: sample.procs_blocked,
    }
}

/// Per-device I/O rates from consecutive diskstats samples. Byte rates are
/// clamped to be non-negative; io_percent derives from ms-per-second of
/// device time.
fn disk_io_rates(proc: &ProcRepo, rates: &RateTracker) -> Vec<DiskIoRates> {
    let disks = match proc.disk_counters() {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!(error = %e, operation = "disk_io", "collector source unavailable");
            return Vec::new();
        }
    };

    disks
        .into_iter()
        .map(|disk| {
            let read_rate = rates.update(&format!("disk_{}_read", disk.device), disk.read_bytes);
            let write_rate = rates.update(&format!("disk_{}_write", disk.device), disk.write_bytes);
            let io_rate = rates.update(&format!("disk_{}_io", disk.device), disk.io_time_ms);
            DiskIoRates {
                device: disk.device,
                read_bytes_sec: round1(read_rate.max(0.0)),
                write_bytes_sec: round1(write_rate.max(0.0)),
                io_percent: round1((io_rate / 10.0).clamp(0.0, 100.0)),
                reads: disk.reads,
                writes: disk.writes,
            }
        })
        .collect()
}

/// Per-interface totals and derived byte rates (clamped non-negative).
fn network_metrics(proc: &ProcRepo, rates: &RateTracker) -> Vec<InterfaceMetrics> {
    let interfaces = match proc.interface_counters() {
        Ok(i) => i,
        Err(e) => {
            tracing::debug!(error = %e, operation = "network", "collector source unavailable");
            return Vec::new();
        }
    };

    interfaces
        .into_iter()
        .map(|iface| {
            let rx_rate = rates.update(&format!("net_{}_rx", iface.interface), iface.rx_bytes);
            let tx_rate = rates.update(&format!("net_{}_tx", iface.interface), iface.tx_bytes);
            InterfaceMetrics {
                interface: iface.interface,
                rx_bytes: iface.rx_bytes,
                tx_bytes: iface.tx_bytes,
                rx_bytes_sec: round1(rx_rate.max(0.0)),
                tx_bytes_sec: round1(tx_rate.max(0.0)),
                rx_packets: iface.rx_packets,
                tx_packets: iface.tx_packets,
                rx_errors: iface.rx_errors + iface.rx_dropped,
                tx_errors: iface.tx_errors + iface.tx_dropped,
            }
        })
        .collect()
}
