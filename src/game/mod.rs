//! Game Logic Module
//!
//! The deterministic heart of the engine. Nothing here touches a clock or
//! suspends; callers pass timestamps in.
//!
//! ## Module Structure
//!
//! - `state`: the game document, players, missions, elimination records
//! - `build`: room assignment builder and deterministic regeneration
//! - `eliminate`: kill/self-report validation and mission inheritance
//! - `rotation`: wall-clock room rotation schedule

pub mod build;
pub mod eliminate;
pub mod rotation;
pub mod state;

// Re-export key types
pub use build::{build_game, regenerate_from_config, BuildError, BuildOptions};
pub use eliminate::{eliminate, mark_self_eliminated, EliminationError, EliminationEvent};
pub use rotation::{current_assignment_for, time_until_rotation};
pub use state::{
    Assignment, EliminationCause, EliminationRecord, GameStateV1, Player, RoomConfig,
    SCHEMA_VERSION,
};
