//! Content loaders for reading world data from files.
//!
//! RON carries zones, tile types, and entity types; TOML carries the world
//! configuration. Loaders only parse; assembling a live world is the
//! builder's job.

mod config;
mod entity_types;
mod tile_types;
mod zones;

pub use config::ConfigLoader;
pub use entity_types::EntityTypeLoader;
pub use tile_types::TileTypeLoader;
pub use zones::ZoneLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
