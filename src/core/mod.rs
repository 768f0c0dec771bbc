//! Core deterministic primitives.
//!
//! Everything in this module is a pure function of its inputs (plus the
//! explicit seed): no system time, no I/O, no suspension points. The game
//! layer is deterministic because it only draws randomness from here.

pub mod name;
pub mod rng;
pub mod shuffle;

// Re-export core types
pub use name::normalize;
pub use rng::SeededRng;
pub use shuffle::{derangement, shuffled, DerangementError};
