//! Zone definition loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::records::ZoneRecord;

/// Loader for one zone definition from a RON file.
///
/// RON format: a single `ZoneRecord` with its tile matrix and entity
/// placements.
pub struct ZoneLoader;

impl ZoneLoader {
    pub fn load(path: &Path) -> LoadResult<ZoneRecord> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse zone RON: {}", e))
    }
}
