use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{EntityId, GridPos};

/// Name of a zone, unique within one grid.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl ZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rectangular grid instance with its own tile matrix and entity list.
///
/// The tile matrix is row-major and always covers the full `width × height`
/// area; cells without explicit data hold [`Zone::EMPTY_TILE`].
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    id: ZoneId,
    name: String,
    width: u32,
    height: u32,
    tiles: Vec<String>,
    entities: Vec<EntityId>,
}

impl Zone {
    /// Tile id filled into cells that no definition covered.
    pub const EMPTY_TILE: &'static str = "empty";

    pub fn new(id: ZoneId, name: impl Into<String>, width: u32, height: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        Self {
            id,
            name: name.into(),
            width,
            height,
            tiles: vec![Self::EMPTY_TILE.to_string(); cells],
            entities: Vec::new(),
        }
    }

    /// Builds a zone from a `height × width` matrix of tile ids. Short or
    /// ragged rows are padded with [`Zone::EMPTY_TILE`]; excess cells are
    /// dropped.
    pub fn with_tiles(
        id: ZoneId,
        name: impl Into<String>,
        width: u32,
        height: u32,
        rows: Vec<Vec<String>>,
    ) -> Self {
        let mut zone = Self::new(id, name, width, height);
        for (y, row) in rows.into_iter().take(height as usize).enumerate() {
            for (x, tile) in row.into_iter().take(width as usize).enumerate() {
                let index = y * width as usize + x;
                zone.tiles[index] = tile;
            }
        }
        zone
    }

    pub fn id(&self) -> &ZoneId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: GridPos) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub fn tile_at(&self, position: GridPos) -> Option<&str> {
        if !self.contains(position) {
            return None;
        }
        self.tiles
            .get(self.index_of(position))
            .map(String::as_str)
    }

    /// Rewrites one matrix cell. Returns `false` without mutation when the
    /// position is out of bounds.
    pub fn set_tile(&mut self, position: GridPos, tile: impl Into<String>) -> bool {
        if !self.contains(position) {
            return false;
        }
        self.ensure_capacity();
        let index = self.index_of(position);
        self.tiles[index] = tile.into();
        true
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Appends `entity` to the membership list unless already present.
    pub(crate) fn attach_entity(&mut self, entity: EntityId) {
        if !self.entities.contains(&entity) {
            self.entities.push(entity);
        }
    }

    pub(crate) fn detach_entity(&mut self, entity: EntityId) -> bool {
        if let Some(index) = self.entities.iter().position(|other| *other == entity) {
            self.entities.remove(index);
            true
        } else {
            false
        }
    }

    fn index_of(&self, position: GridPos) -> usize {
        position.y as usize * self.width as usize + position.x as usize
    }

    /// Grows the matrix back to `width × height` if construction left it
    /// short. Registration must never observe a missing cell.
    fn ensure_capacity(&mut self) {
        let cells = (self.width as usize) * (self.height as usize);
        if self.tiles.len() < cells {
            self.tiles.resize(cells, Self::EMPTY_TILE.to_string());
        }
    }
}
