// Per-process sample for the top-N list

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// CPU time over the process lifetime, as a percentage of one core.
    pub cpu: f64,
    pub mem_rss: u64,
    pub mem_virt: u64,
}
