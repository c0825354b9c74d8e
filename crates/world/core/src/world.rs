//! World coordinator.
//!
//! [`World`] is the explicit context object tying the bus, the store, the
//! grid, and the registry together for one running world instance. The
//! external fixed-timestep scheduler calls [`World::update`] zero or more
//! times per frame followed by one [`World::render`]; render never mutates
//! simulation state.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::json;

use crate::common::{Direction, EntityId, GridPos, Tick};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus, EventKind, InputAction};
use crate::grid::{GridError, Layer, SpatialGrid, ZoneId};
use crate::interaction::{self, DialogState};
use crate::registry::{EntityConfig, EntityOverrides, EntityRegistry, RegistryError};
use crate::render::{DrawOp, Viewport};
use crate::store::StateStore;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Clone, Copy, Debug)]
struct InputEvent {
    action: InputAction,
    pressed: bool,
}

/// One running world: configuration, event bus, state store, spatial grid,
/// entity registry, and the interaction protocol state.
pub struct World {
    config: WorldConfig,
    bus: EventBus,
    store: StateStore,
    grid: SpatialGrid,
    registry: EntityRegistry,
    tick: Tick,
    input: Rc<RefCell<VecDeque<InputEvent>>>,
    held_moves: Vec<InputAction>,
    dialog: Option<DialogState>,
}

impl World {
    /// Store path holding the pause flag.
    pub const PAUSED_PATH: &'static str = "session.paused";

    pub fn new(config: WorldConfig) -> Self {
        let bus = EventBus::new();
        let input: Rc<RefCell<VecDeque<InputEvent>>> = Rc::default();

        for (kind, pressed) in [(EventKind::KeyDown, true), (EventKind::KeyUp, false)] {
            let queue = Rc::clone(&input);
            bus.subscribe(kind, move |event| {
                let action = match event {
                    Event::KeyDown(action) | Event::KeyUp(action) => *action,
                    _ => return,
                };
                queue.borrow_mut().push_back(InputEvent { action, pressed });
            });
        }

        Self {
            grid: SpatialGrid::new(bus.clone(), &config),
            registry: EntityRegistry::new(bus.clone(), config.clone()),
            store: StateStore::new(),
            bus,
            config,
            tick: Tick::ZERO,
            input,
            held_moves: Vec::new(),
            dialog: None,
        }
    }

    // ===== accessors =====

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut SpatialGrid {
        &mut self.grid
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn dialog(&self) -> Option<DialogState> {
        self.dialog
    }

    pub fn is_paused(&self) -> bool {
        self.store
            .get(Self::PAUSED_PATH, json!(false))
            .as_bool()
            .unwrap_or(false)
    }

    // ===== entity lifecycle =====

    /// Creates an entity and places it on the grid in one step. A failed
    /// placement destroys the half-spawned entity again.
    pub fn spawn(
        &mut self,
        kind: impl Into<String>,
        config: EntityConfig,
        position: GridPos,
        layer: Layer,
        zone: &ZoneId,
    ) -> Result<EntityId, WorldError> {
        let id = self.registry.create_entity(kind, config)?;
        self.place(id, position, layer, zone)
    }

    /// Template-based variant of [`World::spawn`].
    pub fn spawn_from_template(
        &mut self,
        template_id: &str,
        overrides: EntityOverrides,
        position: GridPos,
        layer: Layer,
        zone: &ZoneId,
    ) -> Result<EntityId, WorldError> {
        let id = self
            .registry
            .create_entity_from_template(template_id, overrides)?;
        self.place(id, position, layer, zone)
    }

    /// Destroys an entity, unregistering it from the grid first.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), WorldError> {
        self.registry.destroy_entity(id, &mut self.grid)?;
        Ok(())
    }

    fn place(
        &mut self,
        id: EntityId,
        position: GridPos,
        layer: Layer,
        zone: &ZoneId,
    ) -> Result<EntityId, WorldError> {
        let Some(entity) = self.registry.entity_mut(id) else {
            return Err(RegistryError::UnknownEntity(id).into());
        };
        if let Err(error) = self.grid.register_entity(entity, position, layer, zone) {
            let _ = self.registry.destroy_entity(id, &mut self.grid);
            return Err(error.into());
        }
        Ok(id)
    }

    // ===== simulation =====

    /// One fixed-timestep update pass.
    pub fn update(&mut self, dt: f32) {
        let events: Vec<InputEvent> = self.input.borrow_mut().drain(..).collect();
        let mut interact_pressed = false;

        for event in events {
            if event.action.movement_direction().is_some() {
                self.held_moves.retain(|held| *held != event.action);
                if event.pressed {
                    self.held_moves.push(event.action);
                }
                continue;
            }
            if !event.pressed {
                continue;
            }
            match event.action {
                InputAction::Pause => self.toggle_pause(),
                InputAction::Confirm | InputAction::Cancel => self.close_dialog(),
                InputAction::Interact => {
                    // An interact press while a dialog is open dismisses it
                    // instead of starting a new interaction.
                    if self.dialog.is_some() {
                        self.close_dialog();
                    } else {
                        interact_pressed = true;
                    }
                }
                _ => {}
            }
        }

        if self.is_paused() {
            return;
        }

        self.tick = self.tick + 1;

        if self
            .dialog
            .is_some_and(|dialog| dialog.expires_at.is_some_and(|at| self.tick >= at))
        {
            self.close_dialog();
        }

        let move_direction = self
            .held_moves
            .last()
            .and_then(|action| action.movement_direction());
        let controlled: Vec<EntityId> = self
            .registry
            .entities()
            .filter(|entity| {
                entity.active
                    && entity
                        .components()
                        .actor()
                        .is_some_and(|actor| actor.is_controlled())
            })
            .map(|entity| entity.id())
            .collect();
        for id in controlled {
            if let Some(direction) = move_direction {
                self.try_move(id, direction);
            }
            if interact_pressed {
                self.try_interact(id);
            }
        }

        self.registry.update_all(dt, self.tick);
    }

    /// One render pass. Never mutates simulation state.
    pub fn render(&self, viewport: &dyn Viewport) -> Vec<DrawOp> {
        self.registry.render_all(viewport)
    }

    /// Attempts one grid step for `actor`. Facing updates even when the
    /// destination is not walkable; the motion state stays idle then.
    pub fn try_move(&mut self, actor: EntityId, direction: Direction) -> bool {
        let Some(entity) = self.registry.entity(actor) else {
            return false;
        };
        let Some(actor_component) = entity.components().actor() else {
            return false;
        };
        if actor_component.is_moving() {
            return false;
        }
        let can_move = actor_component.can_accept_move(self.tick);
        let required = actor_component.required_tags().to_vec();
        let excluded = actor_component.excluded_tags().to_vec();
        let zone = entity.zone.clone();
        let destination = entity.grid_pos.offset(direction, 1);

        if let Some(actor_component) = self
            .registry
            .entity_mut(actor)
            .and_then(|entity| entity.components_mut().actor_mut())
        {
            actor_component.set_facing(direction);
        }

        if !can_move {
            return false;
        }
        if !self
            .grid
            .is_walkable(destination, &required, &excluded, zone.as_ref(), &self.registry)
        {
            return false;
        }

        let destination_world = self.grid.grid_to_world(destination);
        let Some(entity) = self.registry.entity_mut(actor) else {
            return false;
        };
        let origin_world = entity.world_pos;
        if self.grid.move_entity(entity, destination).is_err() {
            return false;
        }
        // Occupancy and grid position snap immediately; the world position
        // interpolates from where the actor actually was.
        entity.world_pos = origin_world;
        if let Some(actor_component) = entity.components_mut().actor_mut() {
            actor_component.begin_move(destination, destination_world);
        }
        true
    }

    /// Builds and resolves an interaction request for `actor`, if its
    /// facing cell holds an interactable occupant.
    pub fn try_interact(&mut self, actor: EntityId) -> bool {
        let Some(request) = interaction::find_target(&self.grid, &self.registry, actor) else {
            return false;
        };
        self.bus.publish(Event::InteractionRequested {
            actor: request.actor,
            target: request.target,
            direction: request.direction,
        });
        match interaction::dispatch(
            &request,
            &mut self.grid,
            &mut self.registry,
            &mut self.store,
            &self.bus,
            &self.config,
            self.tick,
        ) {
            Ok(Some(dialog)) => {
                self.replace_dialog(dialog);
                true
            }
            Ok(None) => true,
            // Rejections are logged at the rejection site.
            Err(_) => false,
        }
    }

    fn toggle_pause(&mut self) {
        let paused = !self.is_paused();
        self.store.set(Self::PAUSED_PATH, json!(paused));
    }

    fn replace_dialog(&mut self, dialog: DialogState) {
        self.close_dialog();
        self.dialog = Some(dialog);
    }

    fn close_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            self.bus.publish(Event::DialogClosed {
                entity: dialog.entity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::registry::{
        ActorConfig, ComponentConfig, CustomHandler, InteractableConfig, TileConfig,
    };
    use crate::render::{RectViewport, UnboundedViewport};
    use crate::common::{DirectionSet, WorldPos, WorldRect};

    const DT: f32 = 0.25;

    fn test_config() -> WorldConfig {
        WorldConfig {
            move_cooldown_ticks: 2,
            highlight_ticks: 3,
            dialog_auto_close_ticks: 3,
            ..WorldConfig::default()
        }
    }

    /// World whose zones are fully paved with walkable grass tiles.
    fn grass_world(zones: &[(&str, u32, u32)]) -> World {
        let mut world = World::new(test_config());
        for (id, width, height) in zones {
            world
                .grid_mut()
                .create_zone(*id, *id, *width, *height, None)
                .unwrap();
            let zone = ZoneId::from(*id);
            for y in 0..*height {
                for x in 0..*width {
                    world
                        .spawn(
                            "tile",
                            EntityConfig::new()
                                .with_tag("walkable")
                                .with_component(ComponentConfig::Tile(TileConfig::new("grass"))),
                            GridPos::new(x as i32, y as i32),
                            Layer::Ground,
                            &zone,
                        )
                        .unwrap();
                }
            }
        }
        world
    }

    fn spawn_player(world: &mut World, zone: &str, position: GridPos) -> EntityId {
        world
            .spawn(
                "player",
                EntityConfig::new()
                    .with_component(ComponentConfig::Tile(TileConfig::new("player")))
                    .with_component(ComponentConfig::Actor(ActorConfig {
                        controlled: true,
                        ..ActorConfig::default()
                    })),
                position,
                Layer::Actor,
                &ZoneId::from(zone),
            )
            .unwrap()
    }

    fn spawn_interactable(
        world: &mut World,
        zone: &str,
        position: GridPos,
        config: InteractableConfig,
    ) -> EntityId {
        world
            .spawn(
                "prop",
                EntityConfig::new()
                    .with_tag("interactable")
                    .with_component(ComponentConfig::Tile(TileConfig::new("prop")))
                    .with_component(ComponentConfig::Interactable(config)),
                position,
                Layer::Object,
                &ZoneId::from(zone),
            )
            .unwrap()
    }

    fn face(world: &mut World, id: EntityId, direction: Direction) {
        world
            .registry_mut()
            .entity_mut(id)
            .unwrap()
            .components_mut()
            .actor_mut()
            .unwrap()
            .set_facing(direction);
    }

    fn record(world: &World, kind: EventKind) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        world
            .bus()
            .subscribe(kind, move |event| sink.borrow_mut().push(event.clone()));
        log
    }

    fn press(world: &World, action: InputAction) {
        world.bus().publish(Event::KeyDown(action));
    }

    fn release(world: &World, action: InputAction) {
        world.bus().publish(Event::KeyUp(action));
    }

    #[test]
    fn movement_input_rejected_by_water() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let zone = ZoneId::from("a");
        // Swap the grass tile entity at (1, 0) for a water one; the tag and
        // the mirrored tile id both drive walkability.
        let grass = world
            .registry()
            .entities()
            .find(|entity| entity.layer == Layer::Ground && entity.grid_pos == GridPos::new(1, 0))
            .map(|entity| entity.id())
            .unwrap();
        world.despawn(grass).unwrap();
        world
            .spawn(
                "tile",
                EntityConfig::new()
                    .with_tag("water")
                    .with_component(ComponentConfig::Tile(TileConfig::new("water"))),
                GridPos::new(1, 0),
                Layer::Ground,
                &zone,
            )
            .unwrap();
        let player = spawn_player(&mut world, "a", GridPos::new(1, 1));

        press(&world, InputAction::MoveUp);
        world.update(DT);

        let entity = world.registry().entity(player).unwrap();
        assert_eq!(entity.grid_pos, GridPos::new(1, 1));
        let actor = entity.components().actor().unwrap();
        assert!(!actor.is_moving());
        // Facing still turned toward the rejected direction.
        assert_eq!(actor.facing(), Direction::Up);
    }

    #[test]
    fn movement_snaps_grid_and_interpolates_world() {
        let mut world = grass_world(&[("a", 4, 4)]);
        let zone = ZoneId::from("a");
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));

        press(&world, InputAction::MoveRight);
        world.update(DT);
        release(&world, InputAction::MoveRight);

        // Occupancy and grid position snap on acceptance.
        let entity = world.registry().entity(player).unwrap();
        assert_eq!(entity.grid_pos, GridPos::new(1, 0));
        assert_eq!(
            world.grid().occupants(&zone, Layer::Actor, GridPos::new(1, 0)),
            vec![player]
        );
        assert!(
            world
                .grid()
                .occupants(&zone, Layer::Actor, GridPos::new(0, 0))
                .is_empty()
        );

        // The interpolation finishes within a few ticks, then the cooldown
        // holds the next move off.
        while world
            .registry()
            .entity(player)
            .unwrap()
            .components()
            .actor()
            .unwrap()
            .is_moving()
        {
            world.update(DT);
        }
        let entity = world.registry().entity(player).unwrap();
        assert_eq!(entity.world_pos, world.grid().grid_to_world(GridPos::new(1, 0)));
        assert!(!entity.components().actor().unwrap().can_accept_move(world.tick()));
    }

    #[test]
    fn teleport_interaction_crosses_zones() {
        let mut world = grass_world(&[("a", 5, 5), ("b", 8, 8)]);
        let player = spawn_player(&mut world, "a", GridPos::new(2, 2));
        spawn_interactable(
            &mut world,
            "a",
            GridPos::new(2, 1),
            InteractableConfig::teleport("b", 5, 5),
        );
        face(&mut world, player, Direction::Up);
        let teleports = record(&world, EventKind::Teleported);

        press(&world, InputAction::Interact);
        world.update(DT);

        let entity = world.registry().entity(player).unwrap();
        assert_eq!(entity.zone, Some(ZoneId::from("b")));
        assert_eq!(entity.grid_pos, GridPos::new(5, 5));
        assert_eq!(
            entity.world_pos,
            world.grid().grid_to_world(GridPos::new(5, 5))
        );
        assert!(
            world
                .grid()
                .occupants(&ZoneId::from("a"), Layer::Actor, GridPos::new(2, 2))
                .is_empty()
        );
        assert_eq!(
            world
                .grid()
                .occupants(&ZoneId::from("b"), Layer::Actor, GridPos::new(5, 5)),
            vec![player]
        );
        assert_eq!(world.grid().current_zone(), Some(&ZoneId::from("b")));
        assert_eq!(teleports.borrow().len(), 1);
    }

    #[test]
    fn wrong_direction_produces_no_effect() {
        let mut world = grass_world(&[("a", 5, 5)]);
        let player = spawn_player(&mut world, "a", GridPos::new(2, 2));
        let sign = spawn_interactable(
            &mut world,
            "a",
            GridPos::new(1, 2),
            InteractableConfig::dialog("Keep out").with_valid_directions(DirectionSet::UP),
        );
        face(&mut world, player, Direction::Left);

        let dialogs = record(&world, EventKind::DialogOpened);
        let requests = record(&world, EventKind::InteractionRequested);

        press(&world, InputAction::Interact);
        world.update(DT);

        // The request went out, but the effect and highlight did not.
        assert_eq!(requests.borrow().len(), 1);
        assert!(dialogs.borrow().is_empty());
        assert!(world.dialog().is_none());
        assert!(
            !world
                .registry()
                .entity(sign)
                .unwrap()
                .components()
                .interactable()
                .unwrap()
                .is_highlighted()
        );
    }

    #[test]
    fn pickup_destroys_target() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let zone = ZoneId::from("a");
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        let coin = spawn_interactable(
            &mut world,
            "a",
            GridPos::new(1, 0),
            InteractableConfig::pickup(),
        );
        face(&mut world, player, Direction::Right);
        let pickups = record(&world, EventKind::ItemPickedUp);
        let destroys = record(&world, EventKind::EntityDestroyed);

        press(&world, InputAction::Interact);
        world.update(DT);

        assert_eq!(pickups.borrow().len(), 1);
        assert_eq!(destroys.borrow().len(), 1);
        assert!(world.registry().entity(coin).is_none());
        assert!(
            !world
                .grid()
                .occupants(&zone, Layer::Object, GridPos::new(1, 0))
                .contains(&coin)
        );
    }

    #[test]
    fn toggle_flips_state_each_interaction() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        spawn_interactable(
            &mut world,
            "a",
            GridPos::new(0, 1),
            InteractableConfig::toggle(false),
        );
        face(&mut world, player, Direction::Down);
        let toggles = record(&world, EventKind::Toggled);

        press(&world, InputAction::Interact);
        world.update(DT);
        // Wait out the highlight, then toggle back.
        press(&world, InputAction::Interact);
        world.update(DT);

        let states: Vec<bool> = toggles
            .borrow()
            .iter()
            .map(|event| match event {
                Event::Toggled { state, .. } => *state,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn short_dialog_auto_closes() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        spawn_interactable(
            &mut world,
            "a",
            GridPos::new(1, 0),
            InteractableConfig::dialog("Hi"),
        );
        face(&mut world, player, Direction::Right);
        let closed = record(&world, EventKind::DialogClosed);

        press(&world, InputAction::Interact);
        world.update(DT);
        assert!(world.dialog().is_some());

        for _ in 0..4 {
            world.update(DT);
        }
        assert!(world.dialog().is_none());
        assert_eq!(closed.borrow().len(), 1);
    }

    #[test]
    fn interact_press_dismisses_open_dialog() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        spawn_interactable(
            &mut world,
            "a",
            GridPos::new(1, 0),
            InteractableConfig::dialog("Hi"),
        );
        face(&mut world, player, Direction::Right);
        let opened = record(&world, EventKind::DialogOpened);

        press(&world, InputAction::Interact);
        world.update(DT);
        assert_eq!(opened.borrow().len(), 1);

        press(&world, InputAction::Interact);
        world.update(DT);
        assert!(world.dialog().is_none());
        assert_eq!(opened.borrow().len(), 1);
    }

    #[test]
    fn pause_freezes_simulation() {
        let mut world = grass_world(&[("a", 3, 3)]);
        spawn_player(&mut world, "a", GridPos::new(0, 0));

        world.update(DT);
        let tick_before = world.tick();

        press(&world, InputAction::Pause);
        world.update(DT);
        world.update(DT);
        assert!(world.is_paused());
        assert_eq!(world.tick(), tick_before);

        press(&world, InputAction::Pause);
        world.update(DT);
        assert!(!world.is_paused());
        assert!(world.tick() > tick_before);
    }

    #[test]
    fn custom_handler_reaches_store_and_bus() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        let handler = CustomHandler::new(|request, scope| {
            scope
                .store
                .set("stats.presses", json!(request.actor.raw()));
        });
        spawn_interactable(
            &mut world,
            "a",
            GridPos::new(1, 0),
            InteractableConfig::custom(handler),
        );
        face(&mut world, player, Direction::Right);

        press(&world, InputAction::Interact);
        world.update(DT);

        assert_eq!(
            world.store().get("stats.presses", json!(null)),
            json!(player.raw())
        );
    }

    #[test]
    fn successful_dispatch_flashes_highlight() {
        let mut world = grass_world(&[("a", 3, 3)]);
        let player = spawn_player(&mut world, "a", GridPos::new(0, 0));
        let lever = spawn_interactable(
            &mut world,
            "a",
            GridPos::new(0, 1),
            InteractableConfig::toggle(false),
        );
        face(&mut world, player, Direction::Down);

        press(&world, InputAction::Interact);
        world.update(DT);
        let is_lit = |world: &World| {
            world
                .registry()
                .entity(lever)
                .unwrap()
                .components()
                .interactable()
                .unwrap()
                .is_highlighted()
        };
        assert!(is_lit(&world));

        // highlight_ticks in the test config is 3.
        for _ in 0..3 {
            world.update(DT);
        }
        assert!(!is_lit(&world));
    }

    #[test]
    fn render_sorts_by_z_and_culls_offscreen() {
        let mut world = grass_world(&[("a", 2, 1)]);
        let zone = ZoneId::from("a");
        let near = world
            .spawn(
                "prop",
                EntityConfig::new()
                    .with_z_index(5)
                    .with_component(ComponentConfig::Tile(TileConfig::new("prop"))),
                GridPos::new(0, 0),
                Layer::Object,
                &zone,
            )
            .unwrap();
        let far = world
            .spawn(
                "prop",
                EntityConfig::new()
                    .with_z_index(1)
                    .with_component(ComponentConfig::Tile(TileConfig::new("prop"))),
                GridPos::new(1, 0),
                Layer::Object,
                &zone,
            )
            .unwrap();

        let everything = world.render(&UnboundedViewport);
        let order: Vec<EntityId> = everything
            .iter()
            .filter(|op| op.entity == near || op.entity == far)
            .map(|op| op.entity)
            .collect();
        assert_eq!(order, vec![far, near]);

        // Window over the first cell only: the far prop is culled.
        let cell = world.config().cell_size;
        let window = RectViewport::new(WorldRect::new(
            WorldPos::new(0.0, 0.0),
            WorldPos::new(cell - 1.0, cell - 1.0),
        ));
        let visible = world.render(&window);
        assert!(visible.iter().any(|op| op.entity == near));
        assert!(!visible.iter().any(|op| op.entity == far));
    }

    #[test]
    fn render_does_not_advance_simulation() {
        let mut world = grass_world(&[("a", 2, 2)]);
        spawn_player(&mut world, "a", GridPos::new(0, 0));
        world.update(DT);
        let tick = world.tick();
        let _ = world.render(&UnboundedViewport);
        assert_eq!(world.tick(), tick);
    }
}
