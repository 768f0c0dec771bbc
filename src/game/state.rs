//! Game State Document
//!
//! The serializable aggregate for one running game: players, missions,
//! claim flags, and the elimination record. Uses BTreeMap everywhere a map
//! is serialized so the JSON form is byte-stable across rebuilds.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::name::normalize;

/// Schema tag written into every persisted document.
///
/// Loaders check this before trusting the rest of the payload; unknown
/// versions are rejected rather than guessed at.
pub const SCHEMA_VERSION: &str = "v1";

// =============================================================================
// PLAYER
// =============================================================================

/// A participant, carrying both the display form the host typed and the
/// normalized identity every map is keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name, first-seen spelling preserved.
    pub name: String,
    /// Canonical identity key (trim + lowercase + collapsed whitespace).
    pub name_normalized: String,
}

impl Player {
    /// Build a player from a raw display name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            name_normalized: normalize(name),
        }
    }
}

// =============================================================================
// MISSION ASSIGNMENT
// =============================================================================

/// One player's secret mission: who to hunt, where, and with what.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Display name of the current target.
    pub target_name: String,
    /// Room the hit must happen in.
    pub room: String,
    /// Object that must be involved.
    pub object: String,
}

// =============================================================================
// ROOM CONFIG
// =============================================================================

/// The durable host-setup input a game can be regenerated from.
///
/// Created once by the host and never mutated by gameplay. Together with
/// the room code (which doubles as the seed root) this is the sole source
/// of truth for deterministic regeneration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    /// Public room code players join with.
    pub room_number: String,
    /// Raw player names as entered by the host.
    pub player_names: Vec<String>,
    /// Candidate rooms. May be empty; the builder substitutes a placeholder.
    pub rooms: Vec<String>,
    /// Candidate objects. May be empty; the builder substitutes a placeholder.
    pub objects: Vec<String>,
    /// Optional 4-digit host PIN, compared for equality only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_pin: Option<String>,
    /// Wall-clock seconds between room rotations; `None` disables rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_interval_secs: Option<i64>,
    /// When the host created the game.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// ELIMINATION RECORD
// =============================================================================

/// What ended a player's game.
///
/// A tagged variant rather than a sentinel-prefixed killer string: the two
/// event kinds stay distinguishable no matter what players call themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EliminationCause {
    /// A hunter completed their mission.
    Kill {
        /// Normalized identity of the killer.
        killer: String,
    },
    /// The player declared themselves dead; nobody inherits anything.
    SelfReport,
}

/// One entry in the additive-only elimination audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationRecord {
    /// Normalized identity of the eliminated player.
    pub victim: String,
    /// How the elimination happened.
    #[serde(flatten)]
    pub cause: EliminationCause,
    /// When the event was recorded.
    pub at: DateTime<Utc>,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game, as persisted and polled by every client.
///
/// Maps are `BTreeMap` so serialization order is deterministic: two
/// documents built from the same `RoomConfig` are byte-identical JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateV1 {
    /// Schema tag, always [`SCHEMA_VERSION`] for this type.
    pub version: String,
    /// Stable game identifier, derived from the seed so regeneration
    /// reproduces it.
    pub game_id: Uuid,
    /// Room code this document belongs to.
    pub room_number: String,
    /// When the game was created; anchor for the rotation clock.
    pub created_at: DateTime<Utc>,
    /// Optional host PIN, equality-compared by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_pin: Option<String>,
    /// Wall-clock seconds between room rotations; `None` disables rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_interval_secs: Option<i64>,
    /// Unique players in first-seen order. Always at least 3.
    pub players: Vec<Player>,
    /// Shuffled room list assignments index into.
    pub rooms: Vec<String>,
    /// Shuffled object list assignments index into.
    pub objects: Vec<String>,
    /// Current mission per normalized identity.
    pub assignments_by_name: BTreeMap<String, Assignment>,
    /// Monotonic "has viewed their mission" flag per normalized identity.
    /// Once true, never reset within a game's life.
    #[serde(default)]
    pub claimed_by_name: BTreeMap<String, bool>,
    /// Additive-only elimination history. Older documents may lack the
    /// field entirely; it defaults to empty on load.
    #[serde(default)]
    pub eliminations: Vec<EliminationRecord>,
}

impl GameStateV1 {
    /// Look up a player by identity (accepts raw or normalized form).
    pub fn player(&self, identity: &str) -> Option<&Player> {
        let key = normalize(identity);
        self.players.iter().find(|p| p.name_normalized == key)
    }

    /// Index of a player in the setup order; feeds the rotation schedule.
    pub fn player_index(&self, identity: &str) -> Option<usize> {
        let key = normalize(identity);
        self.players.iter().position(|p| p.name_normalized == key)
    }

    /// Current assignment for an identity, without rotation applied.
    pub fn assignment(&self, identity: &str) -> Option<&Assignment> {
        self.assignments_by_name.get(&normalize(identity))
    }

    /// Has this identity been eliminated (as a victim, by any cause)?
    pub fn is_eliminated(&self, identity: &str) -> bool {
        let key = normalize(identity);
        self.eliminations.iter().any(|r| r.victim == key)
    }

    /// Players whose identity does not yet appear as a victim.
    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(|p| !self.is_eliminated(&p.name_normalized))
    }

    /// Record that a player has viewed their mission.
    ///
    /// Idempotent and monotonic: claiming twice is a no-op, and nothing
    /// ever resets the flag. Returns `false` when the identity is not a
    /// player in this game (nothing is recorded).
    pub fn claim(&mut self, identity: &str) -> bool {
        let key = normalize(identity);
        if !self.players.iter().any(|p| p.name_normalized == key) {
            return false;
        }
        self.claimed_by_name.insert(key, true);
        true
    }

    /// Fold another document's claim flags into this one, union-of-true.
    ///
    /// Polling clients call this when a fetched document races a local
    /// mutation: a flag observed `true` anywhere stays `true`, which keeps
    /// claims eventually consistent even under last-writer-wins overwrites
    /// of the rest of the document.
    pub fn merge_claims(&mut self, other: &BTreeMap<String, bool>) {
        for (key, claimed) in other {
            if *claimed {
                self.claimed_by_name.insert(key.clone(), true);
            }
        }
    }

    /// Equality-compare a supplied PIN against the host PIN.
    ///
    /// A game without a PIN accepts any attempt.
    pub fn verify_host_pin(&self, attempt: &str) -> bool {
        match &self.host_pin {
            Some(pin) => pin == attempt,
            None => true,
        }
    }
}
