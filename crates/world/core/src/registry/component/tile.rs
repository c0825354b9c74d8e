use crate::config::WorldConfig;
use crate::render::Shape;

/// Renderable cell content: the visual plus the tile-level walkability data
/// the grid consults.
///
/// GROUND-layer tile entities mirror `tile_id` into their zone's tile
/// matrix on registration; on other layers the component is purely the
/// entity's renderable.
#[derive(Clone, Debug, PartialEq)]
pub struct TileComponent {
    tile_id: String,
    color: String,
    shape: Shape,
    size: f32,
    walkable: bool,
    property_tags: Vec<String>,
}

impl TileComponent {
    pub fn tile_id(&self) -> &str {
        &self.tile_id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }

    pub fn property_tags(&self) -> &[String] {
        &self.property_tags
    }
}

/// Construction parameters for [`TileComponent`].
#[derive(Clone, Debug, PartialEq)]
pub struct TileConfig {
    pub tile_id: String,
    pub color: String,
    pub shape: Shape,
    /// Edge length in world units; defaults to the configured cell size.
    pub size: Option<f32>,
    pub walkable: bool,
    pub property_tags: Vec<String>,
}

impl TileConfig {
    pub fn new(tile_id: impl Into<String>) -> Self {
        Self {
            tile_id: tile_id.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build(self, config: &WorldConfig) -> TileComponent {
        TileComponent {
            tile_id: self.tile_id,
            color: self.color,
            shape: self.shape,
            size: self.size.unwrap_or(config.cell_size),
            walkable: self.walkable,
            property_tags: self.property_tags,
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_id: String::new(),
            color: "#ffffff".to_string(),
            shape: Shape::Rectangle,
            size: None,
            walkable: true,
            property_tags: Vec::new(),
        }
    }
}

/// Per-field template override for [`TileConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileOverride {
    pub tile_id: Option<String>,
    pub color: Option<String>,
    pub shape: Option<Shape>,
    pub size: Option<f32>,
    pub walkable: Option<bool>,
    pub property_tags: Option<Vec<String>>,
}

impl TileOverride {
    pub fn apply_to(self, config: &mut TileConfig) {
        if let Some(tile_id) = self.tile_id {
            config.tile_id = tile_id;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(shape) = self.shape {
            config.shape = shape;
        }
        if let Some(size) = self.size {
            config.size = Some(size);
        }
        if let Some(walkable) = self.walkable {
            config.walkable = walkable;
        }
        if let Some(property_tags) = self.property_tags {
            config.property_tags = property_tags;
        }
    }
}
