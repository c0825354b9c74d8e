//! Entity identity, component composition, templates, and tick driving.
//!
//! The registry is the single owner of entity state. The grid and the
//! interaction resolver reach entities only through it, and destruction
//! always unregisters from the grid first so no occupancy bucket is left
//! holding a dangling id.

pub mod component;
mod entity;
mod template;

pub use component::{
    ActorComponent, ActorConfig, ActorOverride, Component, ComponentConfig, ComponentKind,
    ComponentOverride, ComponentSet, CustomHandler, InteractableComponent, InteractableConfig,
    InteractableConfigError, InteractableOverride, InteractionKind, InteractionType, MotionState,
    TileComponent, TileConfig, TileOverride,
};
pub use entity::Entity;
pub use template::{EntityConfig, EntityOverrides, EntityTemplate};

use std::collections::BTreeMap;

use crate::common::{EntityId, Tick, WorldRect};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus};
use crate::grid::{EntityOracle, SpatialGrid};
use crate::render::{DrawOp, Viewport};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("entity {0} is not registered")]
    UnknownEntity(EntityId),

    #[error("template '{0}' is not registered")]
    UnknownTemplate(String),

    #[error("entity {entity} has no {kind:?} component")]
    MissingComponent {
        entity: EntityId,
        kind: ComponentKind,
    },

    #[error(transparent)]
    ComponentConfig(#[from] InteractableConfigError),
}

/// Owner of all entities, component instances, and templates for one world.
pub struct EntityRegistry {
    bus: EventBus,
    config: WorldConfig,
    entities: BTreeMap<EntityId, Entity>,
    templates: BTreeMap<String, EntityTemplate>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new(bus: EventBus, config: WorldConfig) -> Self {
        Self {
            bus,
            config,
            entities: BTreeMap::new(),
            templates: BTreeMap::new(),
            next_id: 0,
        }
    }

    // ===== lifecycle =====

    /// Allocates an identity, attaches the configured components, and
    /// publishes the spawn event. Subscribers never observe a
    /// partially-constructed entity.
    pub fn create_entity(
        &mut self,
        kind: impl Into<String>,
        config: EntityConfig,
    ) -> Result<EntityId, RegistryError> {
        let id = EntityId(self.next_id);
        let kind = kind.into();
        let mut entity = Entity::new(id, kind.clone());
        entity.active = config.active;
        entity.z_index = config.z_index;
        entity.extend_tags_raw(config.tags);

        for component_config in config.components {
            let component = component_config.build(&self.config).inspect_err(|error| {
                tracing::warn!(%id, %kind, %error, "component config rejected");
            })?;
            if entity.components_mut().attach(component).is_some() {
                tracing::warn!(%id, %kind, "duplicate component kind in config; replaced");
            }
        }

        self.next_id += 1;
        self.entities.insert(id, entity);
        self.bus.publish(Event::EntitySpawned { entity: id, kind });
        Ok(id)
    }

    /// Clones a registered template, merges `overrides`, and creates the
    /// entity. Unknown templates log and fail.
    pub fn create_entity_from_template(
        &mut self,
        template_id: &str,
        overrides: EntityOverrides,
    ) -> Result<EntityId, RegistryError> {
        let Some(template) = self.templates.get(template_id) else {
            tracing::warn!(template = template_id, "unknown entity template");
            return Err(RegistryError::UnknownTemplate(template_id.to_string()));
        };
        let (kind, config) = template.instantiate(overrides);
        self.create_entity(kind, config)
    }

    /// Registers a template. Additive; re-registration replaces.
    pub fn register_template(&mut self, id: impl Into<String>, template: EntityTemplate) {
        let id = id.into();
        if self.templates.insert(id.clone(), template).is_some() {
            tracing::debug!(template = %id, "template re-registered");
        }
    }

    pub fn template(&self, id: &str) -> Option<&EntityTemplate> {
        self.templates.get(id)
    }

    /// Unregisters the entity from the grid (when it holds a zone
    /// reference), announces the destruction, then drops the entity.
    pub fn destroy_entity(
        &mut self,
        id: EntityId,
        grid: &mut SpatialGrid,
    ) -> Result<(), RegistryError> {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!(%id, "destroy of unknown entity");
            return Err(RegistryError::UnknownEntity(id));
        };
        if entity.zone.is_some() {
            let _ = grid.unregister_entity(entity);
        }
        self.bus.publish(Event::EntityDestroyed { entity: id });
        self.entities.remove(&id);
        Ok(())
    }

    // ===== access =====

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ===== components =====

    /// Builds and attaches a component, replacing any previous instance of
    /// the same kind.
    pub fn add_component(
        &mut self,
        id: EntityId,
        config: ComponentConfig,
    ) -> Result<(), RegistryError> {
        let component = config.build(&self.config)?;
        let Some(entity) = self.entities.get_mut(&id) else {
            return Err(RegistryError::UnknownEntity(id));
        };
        entity.components_mut().attach(component);
        Ok(())
    }

    /// Detaches a component after running its cleanup.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> Result<Component, RegistryError> {
        let Some(entity) = self.entities.get_mut(&id) else {
            return Err(RegistryError::UnknownEntity(id));
        };
        entity
            .components_mut()
            .detach(kind)
            .ok_or(RegistryError::MissingComponent { entity: id, kind })
    }

    // ===== tick driving =====

    /// Drives every component of every active entity, creation order.
    pub fn update_all(&mut self, dt: f32, tick: Tick) {
        let config = self.config.clone();
        for entity in self.entities.values_mut() {
            if !entity.active {
                continue;
            }
            entity.step_actor(dt, tick, &config);
            entity.sweep_timers(tick);
        }
    }

    /// Emits draw ops for active entities, ascending z-index (stable for
    /// ties), culled against the viewport predicate.
    pub fn render_all(&self, viewport: &dyn Viewport) -> Vec<DrawOp> {
        let mut visible: Vec<&Entity> = self
            .entities
            .values()
            .filter(|entity| entity.active)
            .collect();
        visible.sort_by_key(|entity| entity.z_index);

        let mut ops = Vec::new();
        for entity in visible {
            let Some(tile) = entity.components().tile() else {
                continue;
            };
            let bounds = WorldRect::centered(entity.world_pos, tile.size());
            if !viewport.is_visible(bounds) {
                continue;
            }
            let highlight = entity
                .components()
                .interactable()
                .is_some_and(InteractableComponent::is_highlighted);
            ops.push(DrawOp {
                entity: entity.id(),
                layer: entity.layer,
                z_index: entity.z_index,
                position: entity.world_pos,
                size: tile.size(),
                shape: tile.shape(),
                color: tile.color().to_string(),
                highlight,
            });
        }
        ops
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

impl EntityOracle for EntityRegistry {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }
}
