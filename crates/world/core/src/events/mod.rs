//! Typed event definitions and the synchronous event bus.
//!
//! Events are a closed set of variants with typed payloads. [`EventKind`]
//! (the derived discriminant enum) is the subscription key, so a subscriber
//! picks one variant shape and never sees unrelated payloads. The bus is the
//! sole coupling mechanism between the grid, the registry, and interaction
//! logic; none of them hold references into each other.

mod bus;

pub use bus::{EventBus, SubscriberId};

use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use crate::common::{Direction, EntityId, GridPos};
use crate::grid::ZoneId;

/// Discrete input actions delivered by the external input collaborator.
///
/// The core never sees raw key codes; the key-to-action mapping lives with
/// the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Pause,
    Confirm,
    Cancel,
}

impl InputAction {
    /// Movement direction for movement actions, `None` otherwise.
    pub fn movement_direction(self) -> Option<Direction> {
        match self {
            InputAction::MoveUp => Some(Direction::Up),
            InputAction::MoveDown => Some(Direction::Down),
            InputAction::MoveLeft => Some(Direction::Left),
            InputAction::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Every event the simulation publishes or consumes.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(PartialOrd, Ord, Hash))]
pub enum Event {
    /// An input action was pressed.
    KeyDown(InputAction),
    /// An input action was released.
    KeyUp(InputAction),
    /// Published by the registry after an entity is fully constructed.
    EntitySpawned { entity: EntityId, kind: String },
    /// Published by the registry just before an entity is removed.
    EntityDestroyed { entity: EntityId },
    /// Published by the grid after a successful occupancy relocation.
    EntityMoved {
        entity: EntityId,
        from: GridPos,
        to: GridPos,
    },
    /// The ambient current zone switched.
    ZoneChanged { from: Option<ZoneId>, to: ZoneId },
    /// A zone tile matrix cell was rewritten.
    GridChanged {
        zone: ZoneId,
        position: GridPos,
        tile: String,
    },
    /// An actor requested an interaction with the occupant of its facing cell.
    InteractionRequested {
        actor: EntityId,
        target: EntityId,
        direction: Direction,
    },
    /// A dialog interaction was accepted.
    DialogOpened {
        entity: EntityId,
        actor: EntityId,
        text: String,
    },
    /// The open dialog was dismissed (timer or explicit input).
    DialogClosed { entity: EntityId },
    /// A pickup interaction consumed its target.
    ItemPickedUp { actor: EntityId, item: EntityId },
    /// A teleport interaction relocated the actor.
    Teleported {
        actor: EntityId,
        zone: ZoneId,
        position: GridPos,
    },
    /// A toggle interaction flipped its state.
    Toggled { entity: EntityId, state: bool },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}
