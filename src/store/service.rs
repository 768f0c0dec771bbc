//! Game Service
//!
//! Composes the assignment builder, the elimination state machine, and the
//! document store into the operations UI collaborators actually call.
//! Every mutation is an optimistic-concurrency read-modify-write: read a
//! versioned document, mutate the decoded state, write back with
//! compare-and-swap, retry on conflict.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::game::build::{build_game, regenerate_from_config, BuildError, BuildOptions};
use crate::game::eliminate::{eliminate, mark_self_eliminated, EliminationError};
use crate::game::state::{GameStateV1, RoomConfig, SCHEMA_VERSION};
use crate::store::memory::{MemoryStore, StoreError, DEFAULT_TTL_SECONDS};

/// Store key of the device's active-game pointer.
///
/// One browsing context participates in at most one game; the pointer
/// lives in the store rather than in ambient process state so it follows
/// the same expiry rules as everything else.
const SESSION_KEY: &str = "session:active";

/// Bounded retries for a conflicted read-modify-write before giving up.
const MAX_WRITE_RETRIES: u32 = 8;

/// Failures surfaced by service operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// Setup-time validation failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// An elimination precondition failed.
    #[error(transparent)]
    Elimination(#[from] EliminationError),

    /// The persistence layer failed or lost a race past all retries.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The stored document belongs to a different room code than the
    /// request path named.
    #[error("room code mismatch: requested {requested}, stored {stored}")]
    RoomMismatch {
        /// Room code from the request path.
        requested: String,
        /// Room code inside the stored document.
        stored: String,
    },

    /// The stored document carries a schema version this build cannot read.
    #[error("unsupported document version {found:?}")]
    UnsupportedVersion {
        /// The version tag that was found.
        found: String,
    },

    /// The stored document failed to decode.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The engine's store-facing facade.
///
/// Cheap to clone per client actor; all clones share one store.
#[derive(Clone)]
pub struct GameService {
    store: Arc<MemoryStore>,
    ttl_secs: i64,
}

impl GameService {
    /// Create a service over a shared store with the default 24 h TTL.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            ttl_secs: DEFAULT_TTL_SECONDS,
        }
    }

    /// Override the document TTL (tests mostly).
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Build a fresh game, persist it and its durable config, and mark it
    /// as this device's active game.
    pub async fn create_game(
        &self,
        player_names: &[String],
        rooms: &[String],
        objects: &[String],
        options: BuildOptions,
    ) -> Result<GameStateV1, GameError> {
        let (config, state) = build_game(player_names, rooms, objects, options)?;
        let code = state.room_number.clone();

        self.store
            .put(&config_key(&code), serde_json::to_value(&config)?, self.ttl_secs)
            .await;
        self.store
            .put(&game_key(&code), serde_json::to_value(&state)?, self.ttl_secs)
            .await;
        self.set_active_room(&code).await;

        info!(
            room = %code,
            players = state.players.len(),
            "created game"
        );
        Ok(state)
    }

    /// Fetch and decode the live document for a room code.
    pub async fn load_game(&self, room_code: &str) -> Result<GameStateV1, GameError> {
        let read = self.store.get(&game_key(room_code)).await?;
        let state = decode_document(&read.value)?;
        check_room(room_code, &state)?;
        Ok(state)
    }

    /// Rebuild the document from its durable config, discarding elimination
    /// progress.
    ///
    /// Deterministic: the rebuilt document is identical to the one
    /// `create_game` originally produced from the same config.
    pub async fn regenerate(&self, room_code: &str) -> Result<GameStateV1, GameError> {
        let read = self.store.get(&config_key(room_code)).await?;
        let config: RoomConfig = serde_json::from_value(read.value)?;
        let state = regenerate_from_config(&config, room_code)?;

        self.store
            .put(&game_key(room_code), serde_json::to_value(&state)?, self.ttl_secs)
            .await;
        info!(room = %room_code, "regenerated game from config");
        Ok(state)
    }

    /// Record that `identity` has viewed their mission. Idempotent.
    pub async fn claim(&self, room_code: &str, identity: &str) -> Result<GameStateV1, GameError> {
        self.mutate(room_code, |state| {
            if !state.claim(identity) {
                warn!(room = %state.room_number, identity, "claim by unknown identity ignored");
            }
            Ok(())
        })
        .await
    }

    /// Apply a kill: `killer` eliminates `target` and inherits the mission.
    pub async fn eliminate(
        &self,
        room_code: &str,
        killer: &str,
        target: &str,
    ) -> Result<GameStateV1, GameError> {
        let state = self
            .mutate(room_code, |state| {
                eliminate(state, killer, target, Utc::now())?;
                Ok(())
            })
            .await?;
        info!(room = %room_code, killer, target, "elimination recorded");
        Ok(state)
    }

    /// Record a voluntary self-elimination; no mission is transferred.
    pub async fn self_report(
        &self,
        room_code: &str,
        player: &str,
    ) -> Result<GameStateV1, GameError> {
        let state = self
            .mutate(room_code, |state| {
                mark_self_eliminated(state, player, Utc::now())?;
                Ok(())
            })
            .await?;
        info!(room = %room_code, player, "self-elimination recorded");
        Ok(state)
    }

    /// Host reset: discard the document, its config, and the active-game
    /// pointer if it referenced this room.
    pub async fn flush(&self, room_code: &str) -> Result<(), GameError> {
        self.store.remove(&game_key(room_code)).await;
        self.store.remove(&config_key(room_code)).await;
        if self.active_room().await.as_deref() == Some(room_code) {
            self.store.remove(SESSION_KEY).await;
        }
        info!(room = %room_code, "flushed game");
        Ok(())
    }

    /// Room code of this device's active game, if any.
    pub async fn active_room(&self) -> Option<String> {
        let read = self.store.get(SESSION_KEY).await.ok()?;
        read.value
            .get("room")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Point this device at a room as its active game.
    pub async fn set_active_room(&self, room_code: &str) {
        self.store
            .put(SESSION_KEY, json!({ "room": room_code }), self.ttl_secs)
            .await;
    }

    /// Optimistic read-modify-write with bounded retries.
    ///
    /// Each attempt re-reads the latest document, re-applies the mutation,
    /// and writes back through compare-and-swap. Claim flags observed true
    /// in the read are never written back false.
    async fn mutate<F>(&self, room_code: &str, mut apply: F) -> Result<GameStateV1, GameError>
    where
        F: FnMut(&mut GameStateV1) -> Result<(), GameError>,
    {
        let key = game_key(room_code);
        let mut last_conflict = None;

        for attempt in 0..MAX_WRITE_RETRIES {
            let read = self.store.get(&key).await?;
            let mut state = decode_document(&read.value)?;
            check_room(room_code, &state)?;

            let claims_seen = state.claimed_by_name.clone();
            apply(&mut state)?;
            state.merge_claims(&claims_seen);

            let value = serde_json::to_value(&state)?;
            match self
                .store
                .compare_and_swap(&key, read.version, value, self.ttl_secs)
                .await
            {
                Ok(_) => return Ok(state),
                Err(conflict @ StoreError::Conflict { .. }) => {
                    debug!(room = %room_code, attempt, "write conflict, retrying");
                    last_conflict = Some(conflict);
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(last_conflict
            .unwrap_or(StoreError::NotFound { key })
            .into())
    }
}

/// Store key for a room's game document.
fn game_key(room_code: &str) -> String {
    format!("game:{room_code}")
}

/// Store key for a room's durable config.
fn config_key(room_code: &str) -> String {
    format!("config:{room_code}")
}

/// Decode a stored document, rejecting unknown schema versions.
///
/// Fields added after a document was written (`eliminations`,
/// `claimedByName`, rotation interval) default to empty rather than
/// failing the parse.
fn decode_document(value: &Value) -> Result<GameStateV1, GameError> {
    let found = value
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if found != SCHEMA_VERSION {
        return Err(GameError::UnsupportedVersion {
            found: found.to_string(),
        });
    }
    Ok(serde_json::from_value(value.clone())?)
}

/// Reject a document whose room code disagrees with the request path.
fn check_room(requested: &str, state: &GameStateV1) -> Result<(), GameError> {
    if state.room_number != requested {
        return Err(GameError::RoomMismatch {
            requested: requested.to_string(),
            stored: state.room_number.clone(),
        });
    }
    Ok(())
}
