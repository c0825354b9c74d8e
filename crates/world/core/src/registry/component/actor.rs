use crate::common::{Direction, GridPos, Tick, WorldPos};
use crate::config::WorldConfig;

/// Movement phase of an actor.
///
/// `Idle → Moving → Idle`: a move is accepted only while idle and off
/// cooldown; the grid position snaps immediately while the world position
/// interpolates toward the destination until arrival.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionState {
    Idle,
    Moving { target: GridPos, destination: WorldPos },
}

/// Grid movement and interaction intent for a controllable or scripted
/// entity.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorComponent {
    speed: f32,
    facing: Direction,
    controlled: bool,
    motion: MotionState,
    cooldown_until: Tick,
    interaction_range: i32,
    required_tags: Vec<String>,
    excluded_tags: Vec<String>,
}

impl ActorComponent {
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, MotionState::Moving { .. })
    }

    pub fn interaction_range(&self) -> i32 {
        self.interaction_range
    }

    pub fn required_tags(&self) -> &[String] {
        &self.required_tags
    }

    pub fn excluded_tags(&self) -> &[String] {
        &self.excluded_tags
    }

    /// Whether a movement input may be accepted right now.
    pub fn can_accept_move(&self, tick: Tick) -> bool {
        !self.is_moving() && tick >= self.cooldown_until
    }

    /// Enters the moving phase toward `target`.
    pub fn begin_move(&mut self, target: GridPos, destination: WorldPos) {
        self.motion = MotionState::Moving {
            target,
            destination,
        };
    }

    /// Advances the interpolated `world_pos` toward the destination.
    /// Returns `true` on arrival, which also starts the move cooldown.
    pub fn step(
        &mut self,
        world_pos: &mut WorldPos,
        dt: f32,
        tick: Tick,
        config: &WorldConfig,
    ) -> bool {
        let MotionState::Moving { destination, .. } = self.motion else {
            return false;
        };

        let distance = world_pos.distance_to(destination);
        let step = self.speed * dt;
        if distance <= step || distance <= config.arrival_epsilon {
            *world_pos = destination;
            self.arrive(tick, config);
            return true;
        }

        let t = step / distance;
        world_pos.x += (destination.x - world_pos.x) * t;
        world_pos.y += (destination.y - world_pos.y) * t;
        false
    }

    /// Drops any in-flight movement and pins the actor at `at`. Used by
    /// teleports to prevent the interpolation from visibly snapping back.
    pub fn halt_at(&mut self, world_pos: &mut WorldPos, at: WorldPos) {
        *world_pos = at;
        self.motion = MotionState::Idle;
        self.cooldown_until = Tick::ZERO;
    }

    pub(crate) fn cleanup(&mut self) {
        self.motion = MotionState::Idle;
        self.cooldown_until = Tick::ZERO;
    }

    fn arrive(&mut self, tick: Tick, config: &WorldConfig) {
        self.motion = MotionState::Idle;
        self.cooldown_until = tick + config.move_cooldown_ticks;
    }
}

/// Construction parameters for [`ActorComponent`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActorConfig {
    /// World units per second; defaults to the configured actor speed.
    pub speed: Option<f32>,
    pub facing: Direction,
    /// Whether the actor consumes player input actions.
    pub controlled: bool,
    /// Cells between the actor and its interaction target; defaults to the
    /// configured interaction range.
    pub interaction_range: Option<i32>,
    pub required_tags: Vec<String>,
    pub excluded_tags: Vec<String>,
}

impl ActorConfig {
    pub(crate) fn build(self, config: &WorldConfig) -> ActorComponent {
        ActorComponent {
            speed: self.speed.unwrap_or(config.actor_speed),
            facing: self.facing,
            controlled: self.controlled,
            motion: MotionState::Idle,
            cooldown_until: Tick::ZERO,
            interaction_range: self.interaction_range.unwrap_or(config.interaction_range),
            required_tags: self.required_tags,
            excluded_tags: self.excluded_tags,
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            speed: None,
            facing: Direction::Down,
            controlled: false,
            interaction_range: None,
            required_tags: Vec::new(),
            // Solid tiles block movement unless an actor opts out.
            excluded_tags: vec!["solid".to_string()],
        }
    }
}

/// Per-field template override for [`ActorConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorOverride {
    pub speed: Option<f32>,
    pub facing: Option<Direction>,
    pub controlled: Option<bool>,
    pub interaction_range: Option<i32>,
    pub required_tags: Option<Vec<String>>,
    pub excluded_tags: Option<Vec<String>>,
}

impl ActorOverride {
    pub fn apply_to(self, config: &mut ActorConfig) {
        if let Some(speed) = self.speed {
            config.speed = Some(speed);
        }
        if let Some(facing) = self.facing {
            config.facing = facing;
        }
        if let Some(controlled) = self.controlled {
            config.controlled = controlled;
        }
        if let Some(range) = self.interaction_range {
            config.interaction_range = Some(range);
        }
        if let Some(required) = self.required_tags {
            config.required_tags = required;
        }
        if let Some(excluded) = self.excluded_tags {
            config.excluded_tags = excluded;
        }
    }
}
