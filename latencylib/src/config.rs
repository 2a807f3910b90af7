use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::boundaries::{CacheBoundary, CORES};
use crate::error::ConfigError;
use crate::util::parse_size;

/// A cache hierarchy, each level becomes one reference line on the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheHierarchyConfig {
    pub caches: Vec<CacheLevelConfig>,
}

/// A single cache level. The size is divided by the core count to get the share of one core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheLevelConfig {
    pub name: String,
    pub size: SizeConfig,
    #[serde(default = "default_cores")]
    pub cores: u64,
}

/// A size is either a plain byte count or a human readable string such as `"1.5MiB"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeConfig {
    Bytes(u64),
    Human(String),
}

fn default_cores() -> u64 {
    1
}

impl Default for CacheHierarchyConfig {
    /// The hierarchy of the measured CPU, matching [`crate::boundaries::compute_cache_boundaries`]
    fn default() -> Self {
        let level = |name: &str, size: &str, cores| CacheLevelConfig {
            name: name.to_string(),
            size: SizeConfig::Human(size.to_string()),
            cores,
        };
        CacheHierarchyConfig {
            caches: vec![
                level("L1", "192KiB", CORES),
                level("L2", "1.5MiB", CORES),
                level("L3", "9MiB", 1),
            ],
        }
    }
}

impl CacheHierarchyConfig {
    /// Reads a JSON configuration file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Open { path: path.to_path_buf(), source })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Converts every level into a boundary, keeping the configured order
    pub fn boundaries(&self) -> Result<Vec<CacheBoundary>, ConfigError> {
        self.caches
            .iter()
            .map(|level| Ok(CacheBoundary::new(&level.name, level.size_in_bytes()?)))
            .collect()
    }
}

impl CacheLevelConfig {
    /// The per core size in bytes, using integer division
    pub fn size_in_bytes(&self) -> Result<u64, ConfigError> {
        if self.cores == 0 {
            return Err(ConfigError::ZeroCores(self.name.clone()));
        }
        let total = match &self.size {
            SizeConfig::Bytes(bytes) => *bytes,
            SizeConfig::Human(text) => parse_size(text)?,
        };
        Ok(total / self.cores)
    }
}
