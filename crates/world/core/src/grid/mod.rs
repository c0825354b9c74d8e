//! Spatial grid: zones, layers, cell occupancy, and walkability.
//!
//! The grid owns zone geometry and the occupancy table but never owns
//! entities; occupancy buckets and zone membership lists hold
//! [`EntityId`] back-references into the registry. Every mutation that
//! other collaborators care about is announced on the [`EventBus`].

mod layer;
mod zone;

pub use layer::Layer;
pub use zone::{Zone, ZoneId};

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::common::{EntityId, GridPos, WorldPos};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus};
use crate::registry::Entity;

/// Insertion-ordered occupants of one (zone, layer, x, y) bucket.
pub type OccupantSlots = ArrayVec<EntityId, { WorldConfig::MAX_OCCUPANTS_PER_CELL }>;

/// Read-only entity lookup the grid consults for tags and components.
///
/// Implemented by the registry; keeps the grid free of any ownership over
/// entity state.
pub trait EntityOracle {
    fn entity(&self, id: EntityId) -> Option<&Entity>;
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CellKey {
    zone: ZoneId,
    layer: Layer,
    x: i32,
    y: i32,
}

impl CellKey {
    fn new(zone: &ZoneId, layer: Layer, position: GridPos) -> Self {
        Self {
            zone: zone.clone(),
            layer,
            x: position.x,
            y: position.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("zone is not registered")]
    UnknownZone,

    #[error("zone already exists")]
    DuplicateZone,

    #[error("no zone is current")]
    NoCurrentZone,

    #[error("position {position} is out of bounds")]
    OutOfBounds { position: GridPos },

    #[error("entity {entity} has no zone assignment")]
    NoZone { entity: EntityId },

    #[error("occupancy bucket at {position} is full")]
    CellFull { position: GridPos },

    #[error("occupancy desync for entity {entity} at {position}")]
    OccupancyDesync { entity: EntityId, position: GridPos },
}

/// Multi-zone spatial substrate.
pub struct SpatialGrid {
    cell_size: f32,
    zones: BTreeMap<ZoneId, Zone>,
    occupancy: BTreeMap<CellKey, OccupantSlots>,
    current_zone: Option<ZoneId>,
    bus: EventBus,
}

impl SpatialGrid {
    /// Tile ids that are hazardous by default, before tag overrides.
    const HAZARD_TILE_IDS: [&'static str; 2] = ["water", "teleporter"];

    pub fn new(bus: EventBus, config: &WorldConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            zones: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            current_zone: None,
            bus,
        }
    }

    // ===== zones =====

    /// Registers a new zone. The first created zone becomes current.
    pub fn create_zone(
        &mut self,
        id: impl Into<ZoneId>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        tiles: Option<Vec<Vec<String>>>,
    ) -> Result<(), GridError> {
        let id = id.into();
        if self.zones.contains_key(&id) {
            tracing::warn!(zone = %id, "zone already exists");
            return Err(GridError::DuplicateZone);
        }

        let zone = match tiles {
            Some(rows) => Zone::with_tiles(id.clone(), name, width, height, rows),
            None => Zone::new(id.clone(), name, width, height),
        };
        self.zones.insert(id.clone(), zone);

        if self.current_zone.is_none() {
            self.current_zone = Some(id.clone());
            self.bus.publish(Event::ZoneChanged { from: None, to: id });
        }
        Ok(())
    }

    /// Switches the ambient current zone used by default-zone overloads.
    pub fn set_current_zone(&mut self, id: &ZoneId) -> Result<(), GridError> {
        if !self.zones.contains_key(id) {
            tracing::warn!(zone = %id, "cannot switch to unknown zone");
            return Err(GridError::UnknownZone);
        }
        if self.current_zone.as_ref() == Some(id) {
            return Ok(());
        }
        let from = self.current_zone.replace(id.clone());
        self.bus.publish(Event::ZoneChanged {
            from,
            to: id.clone(),
        });
        Ok(())
    }

    pub fn current_zone(&self) -> Option<&ZoneId> {
        self.current_zone.as_ref()
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    // ===== occupancy =====

    /// Places `entity` into a zone cell, setting its grid, world, layer, and
    /// zone fields and appending it to the zone membership list.
    ///
    /// A GROUND-layer entity carrying a tile component mirrors its tile id
    /// into the zone matrix at the cell.
    pub fn register_entity(
        &mut self,
        entity: &mut Entity,
        position: GridPos,
        layer: Layer,
        zone_id: &ZoneId,
    ) -> Result<(), GridError> {
        let Some(zone) = self.zones.get_mut(zone_id) else {
            tracing::warn!(zone = %zone_id, entity = %entity.id(), "register into unknown zone");
            return Err(GridError::UnknownZone);
        };
        if !zone.contains(position) {
            tracing::warn!(zone = %zone_id, %position, entity = %entity.id(), "register out of bounds");
            return Err(GridError::OutOfBounds { position });
        }

        let key = CellKey::new(zone_id, layer, position);
        let slot = self.occupancy.entry(key).or_default();
        if !slot.contains(&entity.id()) && slot.try_push(entity.id()).is_err() {
            tracing::warn!(zone = %zone_id, %position, "occupancy bucket full");
            return Err(GridError::CellFull { position });
        }

        zone.attach_entity(entity.id());

        entity.grid_pos = position;
        entity.world_pos = grid_to_world(self.cell_size, position);
        entity.layer = layer;
        entity.zone = Some(zone_id.clone());

        if layer == Layer::Ground {
            if let Some(tile) = entity.components().tile() {
                zone.set_tile(position, tile.tile_id().to_string());
            }
        }
        Ok(())
    }

    /// Removes `entity` from its occupancy bucket and zone membership list,
    /// clearing its zone reference.
    pub fn unregister_entity(&mut self, entity: &mut Entity) -> Result<(), GridError> {
        let Some(zone_id) = entity.zone.take() else {
            tracing::warn!(entity = %entity.id(), "unregister without zone assignment");
            return Err(GridError::NoZone { entity: entity.id() });
        };

        let key = CellKey::new(&zone_id, entity.layer, entity.grid_pos);
        if !self.remove_occupant(&key, entity.id()) {
            tracing::debug!(
                entity = %entity.id(),
                zone = %zone_id,
                position = %entity.grid_pos,
                "entity missing from its occupancy bucket"
            );
        }
        if let Some(zone) = self.zones.get_mut(&zone_id) {
            zone.detach_entity(entity.id());
        }
        Ok(())
    }

    /// Relocates `entity` within its zone. The remove-old/add-new step is
    /// atomic from the caller's perspective: failure on insert rolls back
    /// the removal and nothing is observable in between.
    ///
    /// Walkability is deliberately not checked here; that is the caller's
    /// responsibility before committing a move.
    pub fn move_entity(&mut self, entity: &mut Entity, to: GridPos) -> Result<(), GridError> {
        let Some(zone_id) = entity.zone.clone() else {
            tracing::warn!(entity = %entity.id(), "move without zone assignment");
            return Err(GridError::NoZone { entity: entity.id() });
        };
        let Some(zone) = self.zones.get(&zone_id) else {
            tracing::warn!(zone = %zone_id, "entity zone vanished");
            return Err(GridError::UnknownZone);
        };
        if !zone.contains(to) {
            tracing::warn!(zone = %zone_id, position = %to, "move out of bounds");
            return Err(GridError::OutOfBounds { position: to });
        }

        let from = entity.grid_pos;
        let old_key = CellKey::new(&zone_id, entity.layer, from);
        let new_key = CellKey::new(&zone_id, entity.layer, to);

        if !self.remove_occupant(&old_key, entity.id()) {
            tracing::warn!(entity = %entity.id(), position = %from, "occupancy desync on move");
            return Err(GridError::OccupancyDesync {
                entity: entity.id(),
                position: from,
            });
        }
        let slot = self.occupancy.entry(new_key).or_default();
        if slot.contains(&entity.id()) || slot.try_push(entity.id()).is_err() {
            // Roll back so the entity is never absent from both buckets.
            let _ = self
                .occupancy
                .entry(old_key)
                .or_default()
                .try_push(entity.id());
            tracing::warn!(entity = %entity.id(), position = %to, "destination bucket rejected move");
            return Err(GridError::CellFull { position: to });
        }

        entity.grid_pos = to;
        entity.world_pos = grid_to_world(self.cell_size, to);

        self.bus.publish(Event::EntityMoved {
            entity: entity.id(),
            from,
            to,
        });
        Ok(())
    }

    /// Occupants of one layer, or of all layers concatenated in the fixed
    /// GROUND, OBJECT, ACTOR, UI order when `layer` is `None`.
    pub fn entities_at(
        &self,
        position: GridPos,
        layer: Option<Layer>,
        zone_id: Option<&ZoneId>,
    ) -> Vec<EntityId> {
        let Some(zone_id) = zone_id.or(self.current_zone.as_ref()) else {
            return Vec::new();
        };
        let bucket = |layer| {
            self.occupancy
                .get(&CellKey::new(zone_id, layer, position))
                .map(|slot| slot.as_slice())
                .unwrap_or_default()
        };
        match layer {
            Some(layer) => bucket(layer).to_vec(),
            None => Layer::iter().flat_map(|layer| bucket(layer).iter().copied()).collect(),
        }
    }

    // ===== tiles =====

    pub fn tile_at(&self, position: GridPos, zone_id: Option<&ZoneId>) -> Option<String> {
        let zone_id = zone_id.or(self.current_zone.as_ref())?;
        self.zones
            .get(zone_id)?
            .tile_at(position)
            .map(str::to_string)
    }

    pub fn set_tile_at(
        &mut self,
        position: GridPos,
        tile: impl Into<String>,
        zone_id: Option<&ZoneId>,
    ) -> Result<(), GridError> {
        let Some(zone_id) = zone_id.or(self.current_zone.as_ref()).cloned() else {
            return Err(GridError::NoCurrentZone);
        };
        let Some(zone) = self.zones.get_mut(&zone_id) else {
            tracing::warn!(zone = %zone_id, "set tile in unknown zone");
            return Err(GridError::UnknownZone);
        };
        let tile = tile.into();
        if !zone.set_tile(position, tile.clone()) {
            tracing::warn!(zone = %zone_id, %position, "set tile out of bounds");
            return Err(GridError::OutOfBounds { position });
        }
        self.bus.publish(Event::GridChanged {
            zone: zone_id,
            position,
            tile,
        });
        Ok(())
    }

    // ===== walkability =====

    /// Layered walkability policy, applied in this exact override order:
    ///
    /// 1. out-of-bounds or missing tile: not walkable;
    /// 2. default: walkable;
    /// 3. hazard tiles ("water" tag, or tile id "water"/"teleporter"): not
    ///    walkable;
    /// 4. an explicit "walkable" tag on the tile entity: walkable again,
    ///    even over water;
    /// 5. missing required tags, or any present excluded tag: not walkable;
    /// 6. any OBJECT-layer occupant tagged "solid": not walkable,
    ///    regardless of tile state.
    pub fn is_walkable(
        &self,
        position: GridPos,
        required_tags: &[String],
        excluded_tags: &[String],
        zone_id: Option<&ZoneId>,
        entities: &dyn EntityOracle,
    ) -> bool {
        let Some(zone_id) = zone_id.or(self.current_zone.as_ref()) else {
            return false;
        };
        let Some(zone) = self.zones.get(zone_id) else {
            return false;
        };
        let Some(tile_id) = zone.tile_at(position) else {
            return false;
        };

        let tile_entity = self
            .entities_at(position, Some(Layer::Ground), Some(zone_id))
            .into_iter()
            .filter_map(|id| entities.entity(id))
            .find(|entity| entity.components().tile().is_some());
        let tile_has_tag =
            |tag: &str| tile_entity.is_some_and(|entity| entity.has_tag(tag));

        let mut walkable = tile_entity
            .and_then(|entity| entity.components().tile())
            .is_none_or(|tile| tile.walkable());

        if tile_has_tag("water") || Self::HAZARD_TILE_IDS.contains(&tile_id) {
            walkable = false;
        }
        // Explicit opt-in wins over the hazard defaults.
        if tile_has_tag("walkable") {
            walkable = true;
        }
        if required_tags.iter().any(|tag| !tile_has_tag(tag)) {
            walkable = false;
        }
        if excluded_tags.iter().any(|tag| tile_has_tag(tag)) {
            walkable = false;
        }

        let blocked_by_object = self
            .entities_at(position, Some(Layer::Object), Some(zone_id))
            .into_iter()
            .filter_map(|id| entities.entity(id))
            .any(|entity| entity.has_tag("solid"));
        if blocked_by_object {
            walkable = false;
        }

        walkable
    }

    // ===== coordinates =====

    /// Center of a grid cell in world space.
    pub fn grid_to_world(&self, position: GridPos) -> WorldPos {
        grid_to_world(self.cell_size, position)
    }

    /// Grid cell containing a world-space point (floor division).
    pub fn world_to_grid(&self, position: WorldPos) -> GridPos {
        GridPos::new(
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Occupancy bucket snapshot, mainly for tests and debug overlays.
    pub fn occupants(
        &self,
        zone_id: &ZoneId,
        layer: Layer,
        position: GridPos,
    ) -> Vec<EntityId> {
        self.occupancy
            .get(&CellKey::new(zone_id, layer, position))
            .map(|slot| slot.to_vec())
            .unwrap_or_default()
    }

    fn remove_occupant(&mut self, key: &CellKey, entity: EntityId) -> bool {
        let Some(slot) = self.occupancy.get_mut(key) else {
            return false;
        };
        let Some(index) = slot.iter().position(|other| *other == entity) else {
            return false;
        };
        slot.remove(index);
        if slot.is_empty() {
            self.occupancy.remove(key);
        }
        true
    }
}

fn grid_to_world(cell_size: f32, position: GridPos) -> WorldPos {
    WorldPos::new(
        position.x as f32 * cell_size + cell_size / 2.0,
        position.y as f32 * cell_size + cell_size / 2.0,
    )
}
