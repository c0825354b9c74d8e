use serde::{Deserialize, Serialize};

/// World configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of one grid cell in world units.
    pub cell_size: f32,

    /// Ticks an actor must wait after arriving before the next move is accepted.
    pub move_cooldown_ticks: u64,

    /// Ticks an interactable stays highlighted after a successful dispatch.
    pub highlight_ticks: u64,

    /// Ticks before a short dialog closes on its own.
    pub dialog_auto_close_ticks: u64,

    /// Dialogs at or below this many characters auto-close; longer ones wait
    /// for an explicit close input.
    pub dialog_auto_close_len: usize,

    /// Default actor movement speed in world units per second.
    pub actor_speed: f32,

    /// Default number of cells between an actor and its interaction target.
    pub interaction_range: i32,

    /// World-space distance below which a moving actor counts as arrived.
    pub arrival_epsilon: f32,
}

impl WorldConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum entities tracked per occupancy cell (one zone/layer/x/y bucket).
    pub const MAX_OCCUPANTS_PER_CELL: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CELL_SIZE: f32 = 32.0;
    pub const DEFAULT_MOVE_COOLDOWN_TICKS: u64 = 4;
    pub const DEFAULT_HIGHLIGHT_TICKS: u64 = 12;
    pub const DEFAULT_DIALOG_AUTO_CLOSE_TICKS: u64 = 180;
    pub const DEFAULT_DIALOG_AUTO_CLOSE_LEN: usize = 80;
    pub const DEFAULT_ACTOR_SPEED: f32 = 128.0;
    pub const DEFAULT_INTERACTION_RANGE: i32 = 1;
    pub const DEFAULT_ARRIVAL_EPSILON: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            move_cooldown_ticks: Self::DEFAULT_MOVE_COOLDOWN_TICKS,
            highlight_ticks: Self::DEFAULT_HIGHLIGHT_TICKS,
            dialog_auto_close_ticks: Self::DEFAULT_DIALOG_AUTO_CLOSE_TICKS,
            dialog_auto_close_len: Self::DEFAULT_DIALOG_AUTO_CLOSE_LEN,
            actor_speed: Self::DEFAULT_ACTOR_SPEED,
            interaction_range: Self::DEFAULT_INTERACTION_RANGE,
            arrival_epsilon: Self::DEFAULT_ARRIVAL_EPSILON,
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}
