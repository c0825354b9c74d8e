//! Grid-structured 2D world simulation substrate.
//!
//! `world-core` defines the canonical simulation model: the spatial grid
//! (zones, layers, cell occupancy, walkability), the entity and component
//! registry, the typed event bus and hierarchical state store, and the
//! direction-sensitive interaction protocol. All state mutation flows
//! through [`world::World`]; presentation, input capture, and scheduling
//! are external collaborators reached through narrow contracts
//! ([`render::Viewport`], the input events on the bus, and the
//! update/render entry points).

pub mod common;
pub mod config;
pub mod events;
pub mod grid;
pub mod interaction;
pub mod registry;
pub mod render;
pub mod store;
pub mod world;

pub use common::{Direction, DirectionSet, EntityId, GridPos, Tick, WorldPos, WorldRect};
pub use config::WorldConfig;
pub use events::{Event, EventBus, EventKind, InputAction, SubscriberId};
pub use grid::{EntityOracle, GridError, Layer, OccupantSlots, SpatialGrid, Zone, ZoneId};
pub use interaction::{DialogState, EffectScope, InteractionError, InteractionRequest};
pub use registry::{
    ActorConfig, ActorOverride, Component, ComponentConfig, ComponentKind, ComponentOverride,
    CustomHandler, Entity, EntityConfig, EntityOverrides, EntityRegistry, EntityTemplate,
    InteractableConfig, InteractableOverride, InteractionKind, InteractionType, MotionState,
    RegistryError, TileComponent, TileConfig, TileOverride,
};
pub use render::{DrawOp, RectViewport, Shape, UnboundedViewport, Viewport};
pub use store::{StateStore, WatcherId};
pub use world::{World, WorldError};
