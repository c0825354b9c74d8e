use crate::common::{EntityId, GridPos, WorldPos};
use crate::grid::{Layer, ZoneId};

use super::component::ComponentSet;

/// One simulated entity.
///
/// The registry exclusively owns entity identity and the component set; the
/// grid only ever holds the id as a back-reference. Spatial fields
/// (`grid_pos`, `world_pos`, `layer`, `zone`) are written by the grid on
/// registration and relocation.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    kind: String,
    pub active: bool,
    tags: Vec<String>,
    components: ComponentSet,
    pub world_pos: WorldPos,
    pub grid_pos: GridPos,
    pub layer: Layer,
    pub zone: Option<ZoneId>,
    pub z_index: i32,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            active: true,
            tags: Vec::new(),
            components: ComponentSet::default(),
            world_pos: WorldPos::default(),
            grid_pos: GridPos::default(),
            layer: Layer::default(),
            zone: None,
            z_index: 0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    // ===== tags =====

    /// Insertion-ordered tag list; duplicates are possible only through
    /// template concatenation, never through `add_tag`.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Adds `tag` unless present. Returns `false` (no-op) on duplicates.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes every occurrence of `tag`. Returns `false` when absent.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|other| other != tag);
        self.tags.len() != before
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|other| other == tag)
    }

    /// Appends tags verbatim, preserving duplicates. Template merge only.
    pub(crate) fn extend_tags_raw(&mut self, tags: impl IntoIterator<Item = String>) {
        self.tags.extend(tags);
    }

    // ===== per-tick component driving =====

    /// Advances the actor interpolation, if any.
    pub(crate) fn step_actor(
        &mut self,
        dt: f32,
        tick: crate::common::Tick,
        config: &crate::config::WorldConfig,
    ) {
        let Self {
            components,
            world_pos,
            ..
        } = self;
        if let Some(actor) = components.actor_mut() {
            actor.step(world_pos, dt, tick, config);
        }
    }

    /// Clears expired transient component state.
    pub(crate) fn sweep_timers(&mut self, tick: crate::common::Tick) {
        if let Some(interactable) = self.components.interactable_mut() {
            interactable.expire_highlight(tick);
        }
    }

    /// Stops any in-flight movement and pins the actor at `at`.
    pub(crate) fn halt_actor(&mut self, at: WorldPos) {
        let Self {
            components,
            world_pos,
            ..
        } = self;
        if let Some(actor) = components.actor_mut() {
            actor.halt_at(world_pos, at);
        } else {
            *world_pos = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_tag_is_idempotent() {
        let mut entity = Entity::new(EntityId(1), "chest");
        assert!(entity.add_tag("interactable"));
        assert!(!entity.add_tag("interactable"));
        assert_eq!(entity.tags(), &["interactable".to_string()]);
    }

    #[test]
    fn remove_absent_tag_fails_without_mutation() {
        let mut entity = Entity::new(EntityId(1), "chest");
        entity.add_tag("solid");
        assert!(!entity.remove_tag("water"));
        assert_eq!(entity.tags(), &["solid".to_string()]);

        assert!(entity.remove_tag("solid"));
        assert!(entity.tags().is_empty());
    }

    #[test]
    fn remove_tag_collapses_template_duplicates() {
        let mut entity = Entity::new(EntityId(1), "chest");
        entity.extend_tags_raw(["loot".to_string(), "loot".to_string()]);
        assert!(entity.remove_tag("loot"));
        assert!(!entity.has_tag("loot"));
    }
}
