// ProcRepo against a synthetic proc/sys tree

mod common;

use common::{ProcFixture, stat_content};

#[test]
fn uptime_reads_first_field() {
    let fx = ProcFixture::new();
    fx.write_proc("uptime", "3600.25 14000.00\n");
    let uptime = fx.repo().uptime().unwrap();
    assert_eq!(uptime.uptime_seconds, 3600.3);
    assert!(uptime.boot_time > 0);
}

#[test]
fn missing_uptime_is_an_error_not_a_panic() {
    let fx = ProcFixture::new();
    assert!(fx.repo().uptime().is_err());
}

#[test]
fn cpu_sample_from_stat() {
    let fx = ProcFixture::new();
    fx.write_proc("stat", &stat_content(800, 200, 42));
    let sample = fx.repo().cpu().unwrap();
    assert_eq!(sample.aggregate.idle, 800);
    assert_eq!(sample.aggregate.total, 1000);
    assert_eq!(sample.cores.len(), 2);
    assert_eq!(sample.context_switches, 42);
    assert_eq!(sample.procs_running, 2);
}

#[test]
fn memory_and_swap_from_meminfo() {
    let fx = ProcFixture::new();
    fx.write_proc(
        "meminfo",
        "MemTotal: 1000 kB\nMemAvailable: 400 kB\nBuffers: 10 kB\nCached: 20 kB\nSlab: 5 kB\nSwapTotal: 100 kB\nSwapFree: 75 kB\n",
    );
    let (mem, swap) = fx.repo().memory().unwrap();
    assert_eq!(mem.total, 1000 * 1024);
    assert_eq!(mem.used, 600 * 1024);
    assert_eq!(mem.percent, 60.0);
    assert_eq!(swap.used, 25 * 1024);
    assert_eq!(swap.percent, 25.0);
}

#[test]
fn load_from_loadavg() {
    let fx = ProcFixture::new();
    fx.write_proc("loadavg", "1.25 0.75 0.50 3/456 7890\n");
    let load = fx.repo().load().unwrap();
    assert_eq!(load.load1, 1.25);
    assert_eq!(load.processes_running, 3);
    assert_eq!(load.processes_total, 456);
}

#[test]
fn disk_counters_filter_partitions() {
    let fx = ProcFixture::new();
    fx.write_proc(
        "diskstats",
        "   8 0 sda 10 0 1000 5 20 0 2000 8 0 100 13\n   8 1 sda1 5 0 500 2 10 0 1000 4 0 50 6\n",
    );
    let disks = fx.repo().disk_counters().unwrap();
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].device, "sda");
    assert_eq!(disks[0].read_bytes, 1000 * 512);
}

#[test]
fn interface_counters_skip_virtual() {
    let fx = ProcFixture::new();
    fx.write_proc(
        "net/dev",
        "header\nheader\n  eth0: 100 1 0 0 0 0 0 0 200 2 0 0 0 0 0 0\n    lo: 9 9 0 0 0 0 0 0 9 9 0 0 0 0 0 0\n",
    );
    let ifaces = fx.repo().interface_counters().unwrap();
    assert_eq!(ifaces.len(), 1);
    assert_eq!(ifaces[0].interface, "eth0");
    assert_eq!(ifaces[0].rx_bytes, 100);
    assert_eq!(ifaces[0].tx_bytes, 200);
}

#[test]
fn tcp_states_merge_v4_and_v6() {
    let fx = ProcFixture::new();
    fx.write_proc(
        "net/tcp",
        "header\n 0: A:1 B:0 0A 0:0 0:0 0 0\n 1: A:2 B:0 01 0:0 0:0 0 0\n",
    );
    fx.write_proc("net/tcp6", "header\n 0: A:3 B:0 01 0:0 0:0 0 0\n");
    let tcp = fx.repo().tcp_states();
    assert_eq!(tcp.listen, 1);
    assert_eq!(tcp.established, 2);
    assert_eq!(tcp.total, 3);
}

#[test]
fn tcp_states_without_files_are_all_zero() {
    let fx = ProcFixture::new();
    let tcp = fx.repo().tcp_states();
    assert_eq!(tcp, Default::default());
}

#[test]
fn file_descriptors_and_entropy() {
    let fx = ProcFixture::new();
    fx.write_proc("sys/fs/file-nr", "500 0 10000\n");
    fx.write_proc("sys/kernel/random/entropy_avail", "256\n");
    let repo = fx.repo();
    let fd = repo.file_descriptors().unwrap();
    assert_eq!(fd.allocated, 500);
    assert_eq!(fd.percent, 5.0);
    assert_eq!(repo.entropy().unwrap(), 256);
}

#[test]
fn filesystems_skip_virtual_types_and_duplicates() {
    let fx = ProcFixture::new();
    let real_mount = fx.proc_dir();
    let real_mount = real_mount.to_str().unwrap();
    fx.write_proc(
        "mounts",
        &format!(
            "/dev/sda1 {real_mount} ext4 rw 0 0\n\
             /dev/sda1 {real_mount} ext4 rw 0 0\n\
             proc /proc proc rw 0 0\n\
             tmpfs /run tmpfs rw 0 0\n"
        ),
    );
    let fs = fx.repo().filesystems().unwrap();
    assert_eq!(fs.len(), 1);
    assert_eq!(fs[0].device, "sda1");
    assert_eq!(fs[0].fstype, "ext4");
    assert!(fs[0].total > 0);
    assert!(fs[0].percent >= 0.0 && fs[0].percent <= 100.0);
}

#[test]
fn top_processes_sorted_by_cpu() {
    let fx = ProcFixture::new();
    fx.write_proc("uptime", "1000.0 900.0\n");
    // Busy process: large utime. Idle one: zero.
    fx.write_proc(
        "101/stat",
        "101 (busy) S 1 1 1 0 -1 0 0 0 0 0 5000 5000 0 0 20 0 1 0 0 4096000 100 999 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
    );
    fx.write_proc(
        "102/stat",
        "102 (idle) S 1 1 1 0 -1 0 0 0 0 0 0 0 0 0 20 0 1 0 0 4096000 50 999 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
    );
    let procs = fx.repo().top_processes(10).unwrap();
    assert_eq!(procs.len(), 2);
    assert_eq!(procs[0].pid, 101);
    assert_eq!(procs[0].name, "busy");
    assert!(procs[0].cpu > procs[1].cpu);
    assert_eq!(procs[1].pid, 102);

    let only_one = fx.repo().top_processes(1).unwrap();
    assert_eq!(only_one.len(), 1);
    assert_eq!(only_one[0].pid, 101);
}

#[test]
fn cpu_frequency_absent_without_sysfs_entries() {
    let fx = ProcFixture::new();
    assert!(fx.repo().cpu_frequency().is_none());
}

#[test]
fn cpu_frequency_mean_min_max() {
    let fx = ProcFixture::new();
    fx.write_sys("devices/system/cpu/cpu0/cpufreq/scaling_cur_freq", "1000000\n");
    fx.write_sys("devices/system/cpu/cpu1/cpufreq/scaling_cur_freq", "3000000\n");
    let freq = fx.repo().cpu_frequency().unwrap();
    assert_eq!(freq.current_mhz, 2000.0);
    assert_eq!(freq.min_mhz, 1000.0);
    assert_eq!(freq.max_mhz, 3000.0);
}

#[test]
fn temperatures_from_thermal_zones_and_hwmon() {
    let fx = ProcFixture::new();
    fx.write_sys("class/thermal/thermal_zone0/temp", "45500\n");
    fx.write_sys("class/thermal/thermal_zone0/type", "x86_pkg_temp\n");
    fx.write_sys("class/hwmon/hwmon0/temp1_input", "38000\n");
    fx.write_sys("class/hwmon/hwmon0/temp1_label", "Core 0\n");
    let temps = fx.repo().temperatures().unwrap();
    assert_eq!(temps.len(), 2);
    let zone = temps.iter().find(|t| t.name == "x86_pkg_temp").unwrap();
    assert_eq!(zone.celsius, 45.5);
    let core = temps.iter().find(|t| t.name == "Core 0").unwrap();
    assert_eq!(core.celsius, 38.0);
}

#[test]
fn temperatures_absent_without_sensors() {
    let fx = ProcFixture::new();
    assert!(fx.repo().temperatures().is_none());
}
