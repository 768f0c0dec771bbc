//! Persistence Layer
//!
//! The **non-deterministic** side of the crate: a versioned in-memory
//! document store and the service facade that runs engine mutations
//! against it. Every operation here may suspend; nothing under `core/` or
//! `game/` ever does.

pub mod memory;
pub mod service;

pub use memory::{MemoryStore, StoreError, Versioned, DEFAULT_TTL_SECONDS};
pub use service::{GameError, GameService};
