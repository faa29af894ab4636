// Network interface and TCP state models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceMetrics {
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_bytes_sec: f64,
    pub tx_bytes_sec: f64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    /// Receive errors plus drops.
    pub rx_errors: u64,
    /// Transmit errors plus drops.
    pub tx_errors: u64,
}

/// Connection counts per TCP state across /proc/net/tcp and tcp6.
/// States the kernel reports that are not listed here count only toward
/// `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpStates {
    pub established: u32,
    pub syn_sent: u32,
    pub syn_recv: u32,
    pub fin_wait1: u32,
    pub fin_wait2: u32,
    pub time_wait: u32,
    pub close: u32,
    pub close_wait: u32,
    pub last_ack: u32,
    pub listen: u32,
    pub closing: u32,
    pub total: u32,
}
