//! Direction-sensitive interaction resolution.
//!
//! An actor turns an interact input into an [`InteractionRequest`] for the
//! first "interactable"-tagged occupant of its facing cell. The request is
//! announced on the bus, then resolved here: the target must still exist,
//! must carry an interactable component, and must accept the request's
//! direction before its typed effect runs. Every accepted request also
//! flashes the target's highlight.

use crate::common::{Direction, EntityId, GridPos, Tick};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus};
use crate::grid::{GridError, SpatialGrid};
use crate::registry::{EntityRegistry, InteractionKind};
use crate::store::StateStore;

/// One directional interaction attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionRequest {
    pub actor: EntityId,
    pub target: EntityId,
    pub direction: Direction,
}

/// World access handed to custom interaction handlers.
///
/// Deliberately narrow: effects talk to the store and the bus, never to
/// grid or registry internals.
pub struct EffectScope<'a> {
    pub store: &'a mut StateStore,
    pub bus: &'a EventBus,
}

/// Open dialog bookkeeping held by the world. `expires_at` is `None` for
/// long text that waits for an explicit close input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogState {
    pub entity: EntityId,
    pub expires_at: Option<Tick>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("actor {0} is not registered")]
    ActorMissing(EntityId),

    #[error("target {0} is gone")]
    TargetMissing(EntityId),

    #[error("target {0} is not interactable")]
    NotInteractable(EntityId),

    #[error("direction {direction} not accepted by {target}")]
    DirectionRejected {
        target: EntityId,
        direction: Direction,
    },

    #[error("teleport destination rejected: {0}")]
    TeleportFailed(#[from] GridError),
}

/// Computes the interaction request for `actor`, if any: the first
/// "interactable"-tagged occupant (excluding the actor itself) of the cell
/// `interaction_range` steps along the actor's facing.
pub fn find_target(
    grid: &SpatialGrid,
    registry: &EntityRegistry,
    actor: EntityId,
) -> Option<InteractionRequest> {
    let actor_entity = registry.entity(actor)?;
    let actor_component = actor_entity.components().actor()?;
    let direction = actor_component.facing();
    let cell = actor_entity
        .grid_pos
        .offset(direction, actor_component.interaction_range());

    let target = grid
        .entities_at(cell, None, actor_entity.zone.as_ref())
        .into_iter()
        .filter(|id| *id != actor)
        .find(|id| {
            registry
                .entity(*id)
                .is_some_and(|entity| entity.active && entity.has_tag("interactable"))
        })?;

    Some(InteractionRequest {
        actor,
        target,
        direction,
    })
}

/// Resolves an accepted request into its typed effect.
///
/// Returns the dialog to open, when the effect was a dialog. Rejections
/// (wrong direction, vanished target) log and leave all state untouched.
pub fn dispatch(
    request: &InteractionRequest,
    grid: &mut SpatialGrid,
    registry: &mut EntityRegistry,
    store: &mut StateStore,
    bus: &EventBus,
    config: &WorldConfig,
    tick: Tick,
) -> Result<Option<DialogState>, InteractionError> {
    let Some(target) = registry.entity(request.target) else {
        tracing::debug!(target = %request.target, "interaction target vanished");
        return Err(InteractionError::TargetMissing(request.target));
    };
    let Some(interactable) = target.components().interactable() else {
        tracing::debug!(target = %request.target, "interaction target not interactable");
        return Err(InteractionError::NotInteractable(request.target));
    };
    if !interactable.accepts(request.direction) {
        tracing::debug!(
            target = %request.target,
            direction = %request.direction,
            "interaction direction rejected"
        );
        return Err(InteractionError::DirectionRejected {
            target: request.target,
            direction: request.direction,
        });
    }
    let kind = interactable.kind().clone();

    let mut dialog = None;
    match kind {
        InteractionKind::Dialog { text } => {
            bus.publish(Event::DialogOpened {
                entity: request.target,
                actor: request.actor,
                text: text.clone(),
            });
            let expires_at = (text.chars().count() <= config.dialog_auto_close_len)
                .then(|| tick + config.dialog_auto_close_ticks);
            dialog = Some(DialogState {
                entity: request.target,
                expires_at,
            });
        }
        InteractionKind::Pickup => {
            bus.publish(Event::ItemPickedUp {
                actor: request.actor,
                item: request.target,
            });
            // Destroy unregisters from the grid before dropping the entity.
            let _ = registry.destroy_entity(request.target, grid);
            return Ok(None);
        }
        InteractionKind::Teleport { zone, position } => {
            teleport_actor(request.actor, &zone, position, grid, registry)?;
            bus.publish(Event::Teleported {
                actor: request.actor,
                zone,
                position,
            });
        }
        InteractionKind::Toggle { .. } => {
            let state = toggle_state(registry, request.target)
                .ok_or(InteractionError::NotInteractable(request.target))?;
            bus.publish(Event::Toggled {
                entity: request.target,
                state,
            });
        }
        InteractionKind::Custom(handler) => {
            let mut scope = EffectScope { store, bus };
            handler.invoke(request, &mut scope);
        }
    }

    if let Some(interactable) = registry
        .entity_mut(request.target)
        .and_then(|entity| entity.components_mut().interactable_mut())
    {
        interactable.set_highlight(tick + config.highlight_ticks);
    }

    Ok(dialog)
}

/// Moves `actor` to `position` in `zone`, crossing zones when needed, and
/// clears any in-flight interpolation so the camera never sees a snap-back.
fn teleport_actor(
    actor: EntityId,
    zone: &crate::grid::ZoneId,
    position: GridPos,
    grid: &mut SpatialGrid,
    registry: &mut EntityRegistry,
) -> Result<(), InteractionError> {
    // Validate the destination up front so a rejected teleport mutates
    // nothing.
    let Some(target_zone) = grid.zone(zone) else {
        tracing::warn!(%zone, "teleport to unknown zone");
        return Err(GridError::UnknownZone.into());
    };
    if !target_zone.contains(position) {
        tracing::warn!(%zone, %position, "teleport destination out of bounds");
        return Err(GridError::OutOfBounds { position }.into());
    }

    let Some(entity) = registry.entity_mut(actor) else {
        return Err(InteractionError::ActorMissing(actor));
    };

    if entity.zone.as_ref() == Some(zone) {
        grid.move_entity(entity, position)?;
    } else {
        let layer = entity.layer;
        let previous = (entity.zone.clone(), entity.grid_pos);
        grid.unregister_entity(entity)?;
        grid.set_current_zone(zone)?;
        if let Err(error) = grid.register_entity(entity, position, layer, zone) {
            // Destination bucket rejected the actor; put it back where it was.
            if let (Some(previous_zone), previous_pos) = previous {
                let _ = grid.set_current_zone(&previous_zone);
                let _ = grid.register_entity(entity, previous_pos, layer, &previous_zone);
            }
            return Err(error.into());
        }
    }

    let destination = grid.grid_to_world(position);
    entity.halt_actor(destination);
    Ok(())
}

fn toggle_state(registry: &mut EntityRegistry, target: EntityId) -> Option<bool> {
    let interactable = registry
        .entity_mut(target)?
        .components_mut()
        .interactable_mut()?;
    match interactable.kind_mut() {
        InteractionKind::Toggle { state } => {
            *state = !*state;
            Some(*state)
        }
        _ => None,
    }
}
