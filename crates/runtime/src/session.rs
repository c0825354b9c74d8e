//! Scheduler-facing session facade.
//!
//! The external loop owns the accumulator: it calls [`Session::update`]
//! zero or more times per frame with the fixed timestep, then
//! [`Session::render`] exactly once with whatever viewport the camera
//! currently covers. Input reaches the session as discrete actions; the
//! key-code mapping stays with the host.

use std::path::Path;

use world_core::{
    DrawOp, Event, EventBus, EventKind, InputAction, SubscriberId, Viewport, World, WorldConfig,
};

use world_content::{ContentFactory, LoadResult, WorldBuilder};

/// Session configuration.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub world: WorldConfig,
}

/// One running simulation session wrapping a [`World`].
pub struct Session {
    world: World,
}

impl Session {
    /// Session over an empty world; zones and entities are added through
    /// [`Session::world_mut`].
    pub fn new(config: SessionConfig) -> Self {
        Self {
            world: World::new(config.world),
        }
    }

    /// Session over a world assembled by a content builder.
    pub fn from_builder(builder: WorldBuilder) -> Self {
        Self {
            world: builder.build(),
        }
    }

    /// Session over a world loaded from a content data directory.
    pub fn load(data_dir: impl AsRef<Path>, zones: &[&str]) -> LoadResult<Self> {
        let factory = ContentFactory::new(data_dir.as_ref());
        Ok(Self {
            world: factory.build_world(zones)?,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Delivers one discrete input action as a key-down or key-up event.
    pub fn dispatch(&self, action: InputAction, pressed: bool) {
        let event = if pressed {
            Event::KeyDown(action)
        } else {
            Event::KeyUp(action)
        };
        self.world.bus().publish(event);
    }

    /// Convenience for tap-style inputs: press and immediately release.
    pub fn tap(&self, action: InputAction) {
        self.dispatch(action, true);
        self.dispatch(action, false);
    }

    /// Subscribes a presentation collaborator to one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriberId
    where
        F: Fn(&Event) + 'static,
    {
        self.world.bus().subscribe(kind, handler)
    }

    pub fn bus(&self) -> &EventBus {
        self.world.bus()
    }

    /// One fixed-timestep update pass.
    pub fn update(&mut self, fixed_dt: f32) {
        self.world.update(fixed_dt);
    }

    /// One render pass; `_variable_dt` is accepted for scheduler symmetry
    /// but the draw queue depends only on current state.
    pub fn render(&self, _variable_dt: f32, viewport: &dyn Viewport) -> Vec<DrawOp> {
        self.world.render(viewport)
    }
}
