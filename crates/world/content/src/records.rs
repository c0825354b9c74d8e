//! Schema-validated record shapes exchanged with the data source.
//!
//! Records stay close to the on-disk form; the [`crate::builder`] module
//! turns them into live templates, zones, and entities. Unknown component
//! names are rejected at parse time, which is the configuration-error path
//! for misspelled data.

use serde::{Deserialize, Serialize};

use world_core::{
    ActorOverride, Direction, DirectionSet, InteractableOverride, InteractionType, Layer, Shape,
    TileOverride,
};

/// One zone definition: geometry, a tile matrix, and entity placements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// `height × width` matrix of tile-type ids, row-major.
    #[serde(default)]
    pub tiles: Vec<Vec<String>>,
    #[serde(default)]
    pub entities: Vec<PlacementRecord>,
}

/// One entity placement inside a zone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub properties: PlacementProperties,
}

/// Per-placement template overrides.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementProperties {
    pub tags: Vec<String>,
    pub z_index: Option<i32>,
    pub active: Option<bool>,
    pub tile: Option<TileRecord>,
    pub actor: Option<ActorRecord>,
    pub interactable: Option<InteractableRecord>,
}

impl PlacementProperties {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.z_index.is_none()
            && self.active.is_none()
            && self.tile.is_none()
            && self.actor.is_none()
            && self.interactable.is_none()
    }
}

/// One tile type: the visual plus tags that drive walkability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileTypeRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One entity type: visual, tags, component configs, and the directions
/// its interactable side accepts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityTypeRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub components: ComponentsRecord,
    /// Subset of {up, right, down, left}; absent means all directions.
    #[serde(default)]
    pub interaction_directions: Option<Vec<Direction>>,
    /// Occupancy layer; defaults to ACTOR for actor-component entities and
    /// OBJECT otherwise.
    #[serde(default)]
    pub layer: Option<Layer>,
}

/// Component configs by name. Unknown names fail deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentsRecord {
    pub tile: Option<TileRecord>,
    pub actor: Option<ActorRecord>,
    pub interactable: Option<InteractableRecord>,
}

/// Tile component keys. Every key is optional so the same record doubles
/// as a per-placement override.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileRecord {
    pub tile_id: Option<String>,
    pub color: Option<String>,
    pub shape: Option<Shape>,
    pub size: Option<f32>,
    pub walkable: Option<bool>,
    pub property_tags: Option<Vec<String>>,
}

impl From<TileRecord> for TileOverride {
    fn from(record: TileRecord) -> Self {
        TileOverride {
            tile_id: record.tile_id,
            color: record.color,
            shape: record.shape,
            size: record.size,
            walkable: record.walkable,
            property_tags: record.property_tags,
        }
    }
}

/// Actor component keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorRecord {
    pub speed: Option<f32>,
    pub facing: Option<Direction>,
    pub controlled: Option<bool>,
    pub interaction_range: Option<i32>,
    pub required_tags: Option<Vec<String>>,
    pub excluded_tags: Option<Vec<String>>,
}

impl From<ActorRecord> for ActorOverride {
    fn from(record: ActorRecord) -> Self {
        ActorOverride {
            speed: record.speed,
            facing: record.facing,
            controlled: record.controlled,
            interaction_range: record.interaction_range,
            required_tags: record.required_tags,
            excluded_tags: record.excluded_tags,
        }
    }
}

/// Interaction data keys. `custom` interactions carry code, not data, so
/// they are registered programmatically rather than loaded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractableRecord {
    pub interaction_type: Option<InteractionTypeRecord>,
    pub text: Option<String>,
    pub target_zone: Option<String>,
    pub target_x: Option<i32>,
    pub target_y: Option<i32>,
    pub state: Option<bool>,
    pub valid_directions: Option<Vec<Direction>>,
}

impl From<InteractableRecord> for InteractableOverride {
    fn from(record: InteractableRecord) -> Self {
        InteractableOverride {
            interaction_type: record.interaction_type.map(InteractionType::from),
            text: record.text,
            target_zone: record.target_zone.map(Into::into),
            target_x: record.target_x,
            target_y: record.target_y,
            state: record.state,
            valid_directions: record
                .valid_directions
                .map(|directions| directions.into_iter().collect::<DirectionSet>()),
            custom: None,
        }
    }
}

/// Data-expressible interaction types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionTypeRecord {
    Dialog,
    Pickup,
    Teleport,
    Toggle,
}

impl From<InteractionTypeRecord> for InteractionType {
    fn from(record: InteractionTypeRecord) -> Self {
        match record {
            InteractionTypeRecord::Dialog => InteractionType::Dialog,
            InteractionTypeRecord::Pickup => InteractionType::Pickup,
            InteractionTypeRecord::Teleport => InteractionType::Teleport,
            InteractionTypeRecord::Toggle => InteractionType::Toggle,
        }
    }
}

fn default_color() -> String {
    "#ffffff".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_type_catalog_parses() {
        let source = r##"
            [
                (
                    id: "grass",
                    name: "Grass",
                    color: "#3a5f3a",
                    shape: rectangle,
                    tags: ["walkable"],
                ),
                (
                    id: "water",
                    color: "#2a4a7f",
                    shape: rectangle,
                    tags: ["water"],
                ),
            ]
        "##;
        let records: Vec<TileTypeRecord> = ron::from_str(source).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "grass");
        assert_eq!(records[1].tags, vec!["water"]);
        // Omitted name falls back to empty.
        assert_eq!(records[1].name, "");
    }

    #[test]
    fn entity_type_with_components_parses() {
        let source = r##"
            (
                id: "chest",
                name: "Old Chest",
                color: "#b8860b",
                shape: rectangle,
                tags: ["interactable"],
                components: (
                    interactable: Some((
                        interaction_type: Some(dialog),
                        text: Some("The chest is locked."),
                    )),
                ),
                interaction_directions: Some([up, left]),
            )
        "##;
        let record: EntityTypeRecord = ron::from_str(source).unwrap();
        let interactable = record.components.interactable.unwrap();
        assert_eq!(
            interactable.interaction_type,
            Some(InteractionTypeRecord::Dialog)
        );
        assert_eq!(
            record.interaction_directions,
            Some(vec![Direction::Up, Direction::Left])
        );
    }

    #[test]
    fn unknown_component_name_is_rejected() {
        let source = r#"
            (
                id: "ghost",
                components: (
                    physics: Some(()),
                ),
            )
        "#;
        assert!(ron::from_str::<EntityTypeRecord>(source).is_err());
    }

    #[test]
    fn zone_record_with_placements_parses() {
        let source = r#"
            (
                id: "meadow",
                name: "Meadow",
                width: 2,
                height: 2,
                tiles: [
                    ["grass", "grass"],
                    ["grass", "water"],
                ],
                entities: [
                    (type: "chest", x: 1, y: 0),
                    (
                        type: "portal",
                        x: 0,
                        y: 1,
                        properties: (
                            interactable: Some((
                                target_zone: Some("cave"),
                                target_x: Some(1),
                                target_y: Some(1),
                            )),
                        ),
                    ),
                ],
            )
        "#;
        let record: ZoneRecord = ron::from_str(source).unwrap();
        assert_eq!(record.tiles[1][1], "water");
        assert_eq!(record.entities[0].kind, "chest");
        assert!(record.entities[0].properties.is_empty());
        let portal = &record.entities[1];
        assert_eq!(
            portal
                .properties
                .interactable
                .as_ref()
                .unwrap()
                .target_zone
                .as_deref(),
            Some("cave")
        );
    }
}
