//! Closed component set.
//!
//! Components are a fixed enumeration rather than an open type map: every
//! capability an entity can carry is one of the variants below, with a
//! typed config per variant. An entity holds at most one instance per kind.

mod actor;
mod interactable;
mod tile;

pub use actor::{ActorComponent, ActorConfig, ActorOverride, MotionState};
pub use interactable::{
    CustomHandler, InteractableComponent, InteractableConfig, InteractableConfigError,
    InteractableOverride, InteractionKind, InteractionType,
};
pub use tile::{TileComponent, TileConfig, TileOverride};

use crate::config::WorldConfig;

/// Discriminant for the closed component set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Tile,
    Actor,
    Interactable,
}

/// One attached component instance.
#[derive(Clone, Debug)]
pub enum Component {
    Tile(TileComponent),
    Actor(ActorComponent),
    Interactable(InteractableComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Tile(_) => ComponentKind::Tile,
            Component::Actor(_) => ComponentKind::Actor,
            Component::Interactable(_) => ComponentKind::Interactable,
        }
    }

    /// Releases transient state before the component is detached.
    pub(crate) fn cleanup(&mut self) {
        match self {
            Component::Tile(_) => {}
            Component::Actor(actor) => actor.cleanup(),
            Component::Interactable(interactable) => interactable.cleanup(),
        }
    }
}

/// Construction parameters for one component.
#[derive(Clone, Debug)]
pub enum ComponentConfig {
    Tile(TileConfig),
    Actor(ActorConfig),
    Interactable(InteractableConfig),
}

impl ComponentConfig {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentConfig::Tile(_) => ComponentKind::Tile,
            ComponentConfig::Actor(_) => ComponentKind::Actor,
            ComponentConfig::Interactable(_) => ComponentKind::Interactable,
        }
    }

    pub(crate) fn build(
        self,
        config: &WorldConfig,
    ) -> Result<Component, InteractableConfigError> {
        Ok(match self {
            ComponentConfig::Tile(tile) => Component::Tile(tile.build(config)),
            ComponentConfig::Actor(actor) => Component::Actor(actor.build(config)),
            ComponentConfig::Interactable(interactable) => {
                Component::Interactable(interactable.build()?)
            }
        })
    }
}

/// Per-field template override for one component kind.
#[derive(Clone, Debug)]
pub enum ComponentOverride {
    Tile(TileOverride),
    Actor(ActorOverride),
    Interactable(InteractableOverride),
}

impl ComponentOverride {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentOverride::Tile(_) => ComponentKind::Tile,
            ComponentOverride::Actor(_) => ComponentKind::Actor,
            ComponentOverride::Interactable(_) => ComponentKind::Interactable,
        }
    }

    /// Merges override fields onto `config`; override wins per key.
    pub(crate) fn apply(self, config: &mut ComponentConfig) {
        match (self, config) {
            (ComponentOverride::Tile(o), ComponentConfig::Tile(c)) => o.apply_to(c),
            (ComponentOverride::Actor(o), ComponentConfig::Actor(c)) => o.apply_to(c),
            (ComponentOverride::Interactable(o), ComponentConfig::Interactable(c)) => o.apply_to(c),
            _ => {}
        }
    }

    /// Full config for a kind the base template did not carry; unset keys
    /// take their defaults.
    pub(crate) fn into_config(self) -> ComponentConfig {
        match self {
            ComponentOverride::Tile(o) => {
                let mut config = TileConfig::default();
                o.apply_to(&mut config);
                ComponentConfig::Tile(config)
            }
            ComponentOverride::Actor(o) => {
                let mut config = ActorConfig::default();
                o.apply_to(&mut config);
                ComponentConfig::Actor(config)
            }
            ComponentOverride::Interactable(o) => {
                let mut config = InteractableConfig::default();
                o.apply_to(&mut config);
                ComponentConfig::Interactable(config)
            }
        }
    }
}

/// Component storage of one entity: at most one instance per kind.
#[derive(Clone, Debug, Default)]
pub struct ComponentSet {
    tile: Option<TileComponent>,
    actor: Option<ActorComponent>,
    interactable: Option<InteractableComponent>,
}

impl ComponentSet {
    pub fn tile(&self) -> Option<&TileComponent> {
        self.tile.as_ref()
    }

    pub fn tile_mut(&mut self) -> Option<&mut TileComponent> {
        self.tile.as_mut()
    }

    pub fn actor(&self) -> Option<&ActorComponent> {
        self.actor.as_ref()
    }

    pub fn actor_mut(&mut self) -> Option<&mut ActorComponent> {
        self.actor.as_mut()
    }

    pub fn interactable(&self) -> Option<&InteractableComponent> {
        self.interactable.as_ref()
    }

    pub fn interactable_mut(&mut self) -> Option<&mut InteractableComponent> {
        self.interactable.as_mut()
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Tile => self.tile.is_some(),
            ComponentKind::Actor => self.actor.is_some(),
            ComponentKind::Interactable => self.interactable.is_some(),
        }
    }

    /// Installs `component`, replacing and returning any previous instance
    /// of the same kind.
    pub fn attach(&mut self, component: Component) -> Option<Component> {
        match component {
            Component::Tile(tile) => self.tile.replace(tile).map(Component::Tile),
            Component::Actor(actor) => self.actor.replace(actor).map(Component::Actor),
            Component::Interactable(interactable) => self
                .interactable
                .replace(interactable)
                .map(Component::Interactable),
        }
    }

    /// Removes and returns the instance of `kind`, running its cleanup.
    pub fn detach(&mut self, kind: ComponentKind) -> Option<Component> {
        let mut component = match kind {
            ComponentKind::Tile => self.tile.take().map(Component::Tile),
            ComponentKind::Actor => self.actor.take().map(Component::Actor),
            ComponentKind::Interactable => self.interactable.take().map(Component::Interactable),
        }?;
        component.cleanup();
        Some(component)
    }
}
