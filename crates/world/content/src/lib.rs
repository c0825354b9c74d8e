//! Data-driven world content: record shapes, loaders, and the builder.
//!
//! This crate houses the logical record shapes exchanged with the data
//! source (zones, tile types, entity types) and provides loaders for
//! RON/TOML data files plus a [`WorldBuilder`] that turns validated records
//! into a live [`world_core::World`]. Content is consumed at world
//! construction time and never appears in simulation state.

pub mod builder;
pub mod loaders;
pub mod records;

mod factory;

pub use builder::{WorldBuilder, entity_template, tile_entity_config};
pub use factory::ContentFactory;
pub use loaders::{
    ConfigLoader, EntityTypeLoader, LoadResult, TileTypeLoader, ZoneLoader,
};
pub use records::{
    ActorRecord, ComponentsRecord, EntityTypeRecord, InteractableRecord, InteractionTypeRecord,
    PlacementProperties, PlacementRecord, TileRecord, TileTypeRecord, ZoneRecord,
};
