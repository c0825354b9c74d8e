//! Turns validated records into a live world.
//!
//! Configuration errors (unknown tile or entity types, out-of-bounds
//! placements) log and skip the one offending item; a zone build is never
//! fatal as a whole.

use std::collections::BTreeMap;

use world_core::{
    ComponentConfig, ComponentOverride, EntityConfig, EntityOverrides, EntityTemplate, GridPos,
    InteractableConfig, InteractableOverride, Layer, TileConfig, World, WorldConfig, ZoneId,
};

use crate::records::{EntityTypeRecord, PlacementRecord, TileTypeRecord, ZoneRecord};

/// Template derived from an [`EntityTypeRecord`].
pub fn entity_template(record: &EntityTypeRecord) -> EntityTemplate {
    let mut tile = TileConfig {
        tile_id: record.id.clone(),
        color: record.color.clone(),
        shape: record.shape,
        size: record.size,
        ..TileConfig::default()
    };
    if let Some(tile_record) = record.components.tile.clone() {
        world_core::TileOverride::from(tile_record).apply_to(&mut tile);
    }

    let mut config = EntityConfig {
        tags: record.tags.clone(),
        z_index: 0,
        active: true,
        components: vec![ComponentConfig::Tile(tile)],
    };

    if let Some(actor_record) = record.components.actor.clone() {
        let mut actor = world_core::ActorConfig::default();
        world_core::ActorOverride::from(actor_record).apply_to(&mut actor);
        config.components.push(ComponentConfig::Actor(actor));
    }

    if let Some(interactable_record) = record.components.interactable.clone() {
        let mut interactable = InteractableConfig::default();
        let mut interactable_override = InteractableOverride::from(interactable_record);
        if interactable_override.valid_directions.is_none() {
            interactable_override.valid_directions = record
                .interaction_directions
                .clone()
                .map(|directions| directions.into_iter().collect());
        }
        interactable_override.apply_to(&mut interactable);
        config.components.push(ComponentConfig::Interactable(interactable));

        // Interaction targeting filters on this tag.
        if !config.tags.iter().any(|tag| tag == "interactable") {
            config.tags.push("interactable".to_string());
        }
    }

    EntityTemplate::new(record.id.clone(), config)
}

/// Entity config for one ground tile of the given type.
pub fn tile_entity_config(record: &TileTypeRecord) -> EntityConfig {
    EntityConfig {
        tags: record.tags.clone(),
        z_index: 0,
        active: true,
        components: vec![ComponentConfig::Tile(TileConfig {
            tile_id: record.id.clone(),
            color: record.color.clone(),
            shape: record.shape,
            property_tags: record.tags.clone(),
            ..TileConfig::default()
        })],
    }
}

/// Occupancy layer for an entity type.
fn placement_layer(record: &EntityTypeRecord) -> Layer {
    record.layer.unwrap_or(if record.components.actor.is_some() {
        Layer::Actor
    } else {
        Layer::Object
    })
}

fn placement_overrides(placement: &PlacementRecord) -> EntityOverrides {
    let properties = &placement.properties;
    let mut components = Vec::new();
    if let Some(tile) = properties.tile.clone() {
        components.push(ComponentOverride::Tile(tile.into()));
    }
    if let Some(actor) = properties.actor.clone() {
        components.push(ComponentOverride::Actor(actor.into()));
    }
    if let Some(interactable) = properties.interactable.clone() {
        components.push(ComponentOverride::Interactable(interactable.into()));
    }
    EntityOverrides {
        kind: None,
        tags: properties.tags.clone(),
        z_index: properties.z_index,
        active: properties.active,
        components,
    }
}

/// Assembles a [`World`] from tile-type, entity-type, and zone records.
pub struct WorldBuilder {
    config: WorldConfig,
    tile_types: BTreeMap<String, TileTypeRecord>,
    entity_types: BTreeMap<String, EntityTypeRecord>,
    zones: Vec<ZoneRecord>,
}

impl WorldBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            tile_types: BTreeMap::new(),
            entity_types: BTreeMap::new(),
            zones: Vec::new(),
        }
    }

    pub fn with_tile_types(mut self, records: impl IntoIterator<Item = TileTypeRecord>) -> Self {
        for record in records {
            self.tile_types.insert(record.id.clone(), record);
        }
        self
    }

    pub fn with_entity_types(
        mut self,
        records: impl IntoIterator<Item = EntityTypeRecord>,
    ) -> Self {
        for record in records {
            self.entity_types.insert(record.id.clone(), record);
        }
        self
    }

    pub fn with_zone(mut self, record: ZoneRecord) -> Self {
        self.zones.push(record);
        self
    }

    pub fn with_zones(mut self, records: impl IntoIterator<Item = ZoneRecord>) -> Self {
        self.zones.extend(records);
        self
    }

    /// Builds the world: templates first, then zones with their ground tile
    /// entities, then placements. The first zone record becomes current.
    pub fn build(self) -> World {
        let mut world = World::new(self.config.clone());

        for record in self.entity_types.values() {
            world
                .registry_mut()
                .register_template(record.id.clone(), entity_template(record));
        }

        for zone_record in &self.zones {
            self.build_zone(&mut world, zone_record);
        }
        world
    }

    fn build_zone(&self, world: &mut World, record: &ZoneRecord) {
        let zone = ZoneId::from(record.id.clone());
        if world
            .grid_mut()
            .create_zone(
                record.id.clone(),
                record.name.clone(),
                record.width,
                record.height,
                Some(record.tiles.clone()),
            )
            .is_err()
        {
            tracing::warn!(zone = %zone, "skipping duplicate zone record");
            return;
        }

        for (y, row) in record.tiles.iter().enumerate() {
            for (x, tile_id) in row.iter().enumerate() {
                if tile_id == world_core::Zone::EMPTY_TILE {
                    continue;
                }
                let Some(tile_type) = self.tile_types.get(tile_id) else {
                    tracing::warn!(zone = %zone, tile = %tile_id, "unknown tile type; cell skipped");
                    continue;
                };
                let position = GridPos::new(x as i32, y as i32);
                if let Err(error) = world.spawn(
                    "tile",
                    tile_entity_config(tile_type),
                    position,
                    Layer::Ground,
                    &zone,
                ) {
                    tracing::warn!(zone = %zone, %position, %error, "tile entity skipped");
                }
            }
        }

        for placement in &record.entities {
            let Some(entity_type) = self.entity_types.get(&placement.kind) else {
                tracing::warn!(
                    zone = %zone,
                    kind = %placement.kind,
                    "unknown entity type; placement skipped"
                );
                continue;
            };
            let position = GridPos::new(placement.x, placement.y);
            if let Err(error) = world.spawn_from_template(
                &placement.kind,
                placement_overrides(placement),
                position,
                placement_layer(entity_type),
                &zone,
            ) {
                tracing::warn!(
                    zone = %zone,
                    kind = %placement.kind,
                    %position,
                    %error,
                    "placement skipped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use world_core::{InteractionKind, Layer as CoreLayer};

    use crate::records::{
        ActorRecord, ComponentsRecord, InteractableRecord, InteractionTypeRecord,
        PlacementProperties,
    };

    use super::*;

    fn tile_type(id: &str, tags: &[&str]) -> TileTypeRecord {
        TileTypeRecord {
            id: id.to_string(),
            name: id.to_string(),
            color: "#ffffff".to_string(),
            shape: world_core::Shape::Rectangle,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    fn entity_type(id: &str, components: ComponentsRecord) -> EntityTypeRecord {
        EntityTypeRecord {
            id: id.to_string(),
            name: id.to_string(),
            color: "#ffffff".to_string(),
            shape: world_core::Shape::Circle,
            size: None,
            tags: Vec::new(),
            components,
            interaction_directions: None,
            layer: None,
        }
    }

    fn sample_builder() -> WorldBuilder {
        let portal = entity_type(
            "portal",
            ComponentsRecord {
                interactable: Some(InteractableRecord {
                    interaction_type: Some(InteractionTypeRecord::Teleport),
                    ..InteractableRecord::default()
                }),
                ..ComponentsRecord::default()
            },
        );
        let player = entity_type(
            "player",
            ComponentsRecord {
                actor: Some(ActorRecord {
                    controlled: Some(true),
                    ..ActorRecord::default()
                }),
                ..ComponentsRecord::default()
            },
        );
        let grass = || "grass".to_string();

        WorldBuilder::new(WorldConfig::default())
            .with_tile_types([tile_type("grass", &["walkable"]), tile_type("water", &["water"])])
            .with_entity_types([portal, player])
            .with_zone(ZoneRecord {
                id: "meadow".to_string(),
                name: "Meadow".to_string(),
                width: 3,
                height: 3,
                tiles: vec![
                    vec![grass(), grass(), grass()],
                    vec![grass(), "water".to_string(), grass()],
                    vec![grass(), grass(), grass()],
                ],
                entities: vec![
                    PlacementRecord {
                        kind: "player".to_string(),
                        x: 0,
                        y: 0,
                        properties: PlacementProperties::default(),
                    },
                    PlacementRecord {
                        kind: "portal".to_string(),
                        x: 2,
                        y: 2,
                        properties: PlacementProperties {
                            interactable: Some(InteractableRecord {
                                target_zone: Some("cave".to_string()),
                                target_x: Some(1),
                                target_y: Some(1),
                                ..InteractableRecord::default()
                            }),
                            ..PlacementProperties::default()
                        },
                    },
                ],
            })
            .with_zone(ZoneRecord {
                id: "cave".to_string(),
                name: "Cave".to_string(),
                width: 2,
                height: 2,
                tiles: vec![vec![grass(), grass()], vec![grass(), grass()]],
                entities: Vec::new(),
            })
    }

    #[test]
    fn builds_zones_tiles_and_placements() {
        let world = sample_builder().build();

        assert_eq!(world.grid().current_zone(), Some(&ZoneId::from("meadow")));
        assert_eq!(
            world
                .grid()
                .tile_at(GridPos::new(1, 1), Some(&ZoneId::from("meadow"))),
            Some("water".to_string())
        );
        assert!(!world.grid().is_walkable(
            GridPos::new(1, 1),
            &[],
            &[],
            Some(&ZoneId::from("meadow")),
            world.registry(),
        ));
        assert!(world.grid().is_walkable(
            GridPos::new(0, 1),
            &[],
            &[],
            Some(&ZoneId::from("meadow")),
            world.registry(),
        ));

        // 9 + 4 tiles, one player, one portal.
        assert_eq!(world.registry().len(), 15);

        let portal = world
            .registry()
            .entities()
            .find(|entity| entity.kind() == "portal")
            .expect("portal placed");
        assert_eq!(portal.layer, CoreLayer::Object);
        assert!(portal.has_tag("interactable"));
        match portal.components().interactable().unwrap().kind() {
            InteractionKind::Teleport { zone, position } => {
                assert_eq!(zone, &ZoneId::from("cave"));
                assert_eq!(*position, GridPos::new(1, 1));
            }
            other => panic!("unexpected interaction kind: {other:?}"),
        }

        let player = world
            .registry()
            .entities()
            .find(|entity| entity.kind() == "player")
            .expect("player placed");
        assert_eq!(player.layer, CoreLayer::Actor);
    }

    #[test]
    fn bad_items_are_skipped_not_fatal() {
        let mut builder = sample_builder();
        builder.zones[0].entities.push(PlacementRecord {
            kind: "dragon".to_string(),
            x: 1,
            y: 0,
            properties: PlacementProperties::default(),
        });
        // Teleporter without a destination anywhere: hard config failure,
        // placement skipped.
        builder.zones[0].entities.push(PlacementRecord {
            kind: "portal".to_string(),
            x: 1,
            y: 2,
            properties: PlacementProperties::default(),
        });
        // Out-of-bounds placement.
        builder.zones[0].entities.push(PlacementRecord {
            kind: "player".to_string(),
            x: 99,
            y: 0,
            properties: PlacementProperties::default(),
        });

        let world = builder.build();
        // Same population as the clean build: every bad item was skipped.
        assert_eq!(world.registry().len(), 15);
        assert_eq!(world.grid().zones().count(), 2);
    }
}
