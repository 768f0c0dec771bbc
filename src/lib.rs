//! # Assassin Party Game Engine
//!
//! Mission assignment and elimination-inheritance engine for a live social
//! party game: every player secretly hunts another player, in a particular
//! room, with a particular object, and a kill hands the victim's mission
//! to the killer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ASSASSIN SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded 32-bit LCG PRNG                    │
//! │  ├── shuffle.rs  - Fisher–Yates shuffle, Sattolo derangement │
//! │  └── name.rs     - Identity normalization                    │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── state.rs    - Game document, missions, audit trail      │
//! │  ├── build.rs    - Assignment builder and regeneration       │
//! │  ├── eliminate.rs- Kill/self-report state machine            │
//! │  └── rotation.rs - Wall-clock room rotation schedule         │
//! │                                                              │
//! │  store/          - Persistence (non-deterministic)           │
//! │  ├── memory.rs   - Versioned TTL document store              │
//! │  └── service.rs  - CAS read-modify-write service facade      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No system time dependencies (callers pass timestamps in)
//! - No HashMap (BTreeMap keeps serialized documents byte-stable)
//! - All randomness from the seeded LCG, keyed by the room code
//!
//! Any device holding the same `RoomConfig` and room code regenerates an
//! **identical** game document, so no central source of truth is required.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod store;

// Re-export commonly used types
pub use crate::core::name::normalize;
pub use crate::core::rng::SeededRng;
pub use crate::core::shuffle::{derangement, shuffled, DerangementError};
pub use crate::game::build::{build_game, regenerate_from_config, BuildError, BuildOptions};
pub use crate::game::eliminate::{eliminate, mark_self_eliminated, EliminationError};
pub use crate::game::rotation::{current_assignment_for, time_until_rotation};
pub use crate::game::state::{
    Assignment, EliminationCause, EliminationRecord, GameStateV1, Player, RoomConfig,
};
pub use crate::store::memory::{MemoryStore, StoreError, DEFAULT_TTL_SECONDS};
pub use crate::store::service::{GameError, GameService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Smallest playable game: a derangement needs at least a 3-cycle.
pub const MIN_PLAYERS: usize = 3;

/// Suggested polling cadence for clients, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1_500;
