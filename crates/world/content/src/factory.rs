//! Content factory for building a world from a data directory.

use std::path::{Path, PathBuf};

use world_core::{World, WorldConfig};

use crate::builder::WorldBuilder;
use crate::loaders::{ConfigLoader, EntityTypeLoader, LoadResult, TileTypeLoader, ZoneLoader};
use crate::records::{EntityTypeRecord, TileTypeRecord, ZoneRecord};

/// Content factory that loads world data from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tiles.ron
/// ├── entities.ron
/// └── zones/
///     ├── meadow.ron
///     └── cave.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load world configuration from `config.toml`. A missing file yields
    /// the default configuration.
    pub fn load_config(&self) -> LoadResult<WorldConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(WorldConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the tile type catalog from `tiles.ron`.
    pub fn load_tile_types(&self) -> LoadResult<Vec<TileTypeRecord>> {
        TileTypeLoader::load(&self.data_dir.join("tiles.ron"))
    }

    /// Load the entity type catalog from `entities.ron`.
    pub fn load_entity_types(&self) -> LoadResult<Vec<EntityTypeRecord>> {
        EntityTypeLoader::load(&self.data_dir.join("entities.ron"))
    }

    /// Load one zone from `zones/{zone_name}.ron`.
    pub fn load_zone(&self, zone_name: &str) -> LoadResult<ZoneRecord> {
        ZoneLoader::load(&self.data_dir.join("zones").join(format!("{}.ron", zone_name)))
    }

    /// Load everything and assemble a live world. The first listed zone
    /// becomes current.
    pub fn build_world(&self, zone_names: &[&str]) -> LoadResult<World> {
        let config = self.load_config()?;
        let mut builder = WorldBuilder::new(config)
            .with_tile_types(self.load_tile_types()?)
            .with_entity_types(self.load_entity_types()?);
        for zone_name in zone_names {
            builder = builder.with_zone(self.load_zone(zone_name)?);
        }
        Ok(builder.build())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
