//! World configuration loader.

use std::path::Path;

use world_core::WorldConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`WorldConfig`] from TOML files. Missing keys fall back to
/// their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<WorldConfig> {
        let content = read_file(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse world config TOML: {}", e))
    }
}
