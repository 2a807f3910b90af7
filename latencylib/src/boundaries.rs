use serde::{Deserialize, Serialize};
use crate::util::{format_bytes, KIB, MIB};

/// The number of cores the measured CPU splits its L1 and L2 caches between
pub const CORES: u64 = 6;

/// Per core L1 size of the measured CPU, 192 KiB shared by 6 cores
pub const L1_SIZE: u64 = 192 * KIB / CORES;

/// Per core L2 size of the measured CPU, 1.5 MiB shared by 6 cores
pub const L2_SIZE: u64 = 1536 * KIB / CORES;

/// The L3 is reported as a whole
pub const L3_SIZE: u64 = 9 * MIB;

/// A cache size drawn onto the chart as a vertical reference line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBoundary {
    pub name: String,
    pub label: String,
    pub size: u64,
}

impl CacheBoundary {
    /// Creates a boundary labelled with its name and human readable size, e.g. `L1 (32 KiB)`
    pub fn new(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            label: format!("{name} ({})", format_bytes(size)),
            size,
        }
    }
}

/// The L1, L2 and L3 boundaries of the measured CPU, in that order
pub fn compute_cache_boundaries() -> Vec<CacheBoundary> {
    vec![
        CacheBoundary::new("L1", L1_SIZE),
        CacheBoundary::new("L2", L2_SIZE),
        CacheBoundary::new("L3", L3_SIZE),
    ]
}
