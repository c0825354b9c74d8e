//! Tile type catalog loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::records::TileTypeRecord;

/// Loader for the tile type catalog from RON files.
///
/// RON format: `Vec<TileTypeRecord>`.
pub struct TileTypeLoader;

impl TileTypeLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<TileTypeRecord>> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tile type catalog RON: {}", e))
    }
}
