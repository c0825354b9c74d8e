//! Session orchestration for the gridworld simulation.
//!
//! The runtime wires a [`world_core::World`] (assembled directly or from
//! `world-content` data files) to the external collaborators: the
//! fixed-timestep scheduler, the input source, and the presentation layer
//! consuming draw ops and events.

mod logging;
mod session;

pub use logging::init_tracing;
pub use session::{Session, SessionConfig};
