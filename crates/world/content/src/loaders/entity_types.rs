//! Entity type catalog loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::records::EntityTypeRecord;

/// Loader for the entity type catalog from RON files.
///
/// RON format: `Vec<EntityTypeRecord>`. Component entries under unknown
/// names fail the parse, which is the configuration-error path for
/// misspelled data files.
pub struct EntityTypeLoader;

impl EntityTypeLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EntityTypeRecord>> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse entity type catalog RON: {}", e))
    }
}
