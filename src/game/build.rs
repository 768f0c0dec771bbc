//! Room Assignment Builder
//!
//! Composes the normalized player list, the derangement, and the shuffled
//! rooms/objects into a fresh game document. Every random draw is seeded
//! from the room code, so any device holding the same `RoomConfig` rebuilds
//! a byte-identical document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::core::rng::SeededRng;
use crate::core::shuffle::{derangement, shuffled, DerangementError};
use crate::game::state::{Assignment, GameStateV1, Player, RoomConfig, SCHEMA_VERSION};

/// Room used when the host supplied no rooms.
pub const FALLBACK_ROOM: &str = "somewhere";

/// Object used when the host supplied no objects.
pub const FALLBACK_OBJECT: &str = "anything";

/// Setup-time failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Fewer than 3 unique identities remain after normalization.
    #[error("need at least 3 unique players after normalization, got {unique}")]
    InsufficientPlayers {
        /// Count of unique normalized identities found.
        unique: usize,
    },

    /// Derangement layer refused the input. Unreachable through the public
    /// builders, which validate the player count first.
    #[error(transparent)]
    Derangement(#[from] DerangementError),
}

/// Optional knobs for [`build_game`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Room code to use; a random 4-digit code is drawn when absent.
    pub room_code: Option<String>,
    /// Optional host PIN.
    pub host_pin: Option<String>,
    /// Wall-clock seconds between room rotations; `None` keeps rooms static.
    pub rotation_interval_secs: Option<i64>,
    /// Creation instant; defaults to now. Regeneration always reuses the
    /// instant captured in the config.
    pub created_at: Option<DateTime<Utc>>,
}

/// Build a fresh game from raw host input.
///
/// Returns the durable [`RoomConfig`] (raw lists, exactly as entered)
/// alongside the built document. Persist the config: it is the only input
/// [`regenerate_from_config`] needs to rebuild the identical document later.
///
/// # Errors
///
/// [`BuildError::InsufficientPlayers`] when fewer than 3 unique normalized
/// identities remain, e.g. `["Al", "al ", "AL"]` collapses to one.
pub fn build_game(
    player_names: &[String],
    rooms: &[String],
    objects: &[String],
    options: BuildOptions,
) -> Result<(RoomConfig, GameStateV1), BuildError> {
    let room_code = options.room_code.unwrap_or_else(random_room_code);
    let config = RoomConfig {
        room_number: room_code.clone(),
        player_names: player_names.to_vec(),
        rooms: rooms.to_vec(),
        objects: objects.to_vec(),
        host_pin: options.host_pin,
        rotation_interval_secs: options.rotation_interval_secs,
        created_at: options.created_at.unwrap_or_else(Utc::now),
    };
    let state = regenerate_from_config(&config, &room_code)?;
    Ok((config, state))
}

/// Deterministically rebuild a game document from its durable config.
///
/// `room_code` is the seed root; same config + same code always yields the
/// same document, byte for byte. Rebuilding discards elimination progress:
/// the config predates every kill.
pub fn regenerate_from_config(
    config: &RoomConfig,
    room_code: &str,
) -> Result<GameStateV1, BuildError> {
    let players = dedup_players(&config.player_names);
    if players.len() < crate::MIN_PLAYERS {
        return Err(BuildError::InsufficientPlayers {
            unique: players.len(),
        });
    }

    let seed = format!("room-{room_code}");

    let display_names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();
    let target_names = derangement(&display_names, Some(&seed))?;

    let rooms = shuffled(&with_fallback(&config.rooms, FALLBACK_ROOM), Some(&format!("{seed}-rooms")));
    let objects = shuffled(
        &with_fallback(&config.objects, FALLBACK_OBJECT),
        Some(&format!("{seed}-objects")),
    );

    let mut assignments_by_name = BTreeMap::new();
    for (i, player) in players.iter().enumerate() {
        assignments_by_name.insert(
            player.name_normalized.clone(),
            Assignment {
                target_name: target_names[i].clone(),
                // Rooms and objects wrap cyclically when outnumbered by
                // players; per-assignment plausibility is all that matters.
                room: rooms[i % rooms.len()].clone(),
                object: objects[i % objects.len()].clone(),
            },
        );
    }

    Ok(GameStateV1 {
        version: SCHEMA_VERSION.to_string(),
        game_id: derive_game_id(&seed),
        room_number: room_code.to_string(),
        created_at: config.created_at,
        host_pin: config.host_pin.clone(),
        rotation_interval_secs: config.rotation_interval_secs,
        players,
        rooms,
        objects,
        assignments_by_name,
        claimed_by_name: BTreeMap::new(),
        eliminations: Vec::new(),
    })
}

/// Normalize and de-duplicate raw names, first occurrence wins.
///
/// Names that normalize to the empty string are dropped outright.
fn dedup_players(names: &[String]) -> Vec<Player> {
    let mut players: Vec<Player> = Vec::new();
    for name in names {
        let player = Player::new(name);
        if player.name_normalized.is_empty() {
            continue;
        }
        if players
            .iter()
            .any(|p| p.name_normalized == player.name_normalized)
        {
            continue;
        }
        players.push(player);
    }
    players
}

/// Substitute a singleton placeholder for an empty distractor list.
fn with_fallback(list: &[String], fallback: &str) -> Vec<String> {
    if list.is_empty() {
        vec![fallback.to_string()]
    } else {
        list.to_vec()
    }
}

/// Derive the stable game id from the seed root.
fn derive_game_id(seed: &str) -> Uuid {
    let mut rng = SeededRng::from_seed(&format!("{seed}-id"));
    let mut bytes = [0u8; 16];
    for b in bytes.iter_mut() {
        *b = rng.next_index(256) as u8;
    }
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Draw a random 4-digit room code for ungoverned casual play.
fn random_room_code() -> String {
    format!("{:04}", rand::rng().random_range(0..10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn options(code: &str) -> BuildOptions {
        BuildOptions {
            room_code: Some(code.to_string()),
            created_at: DateTime::from_timestamp(1_700_000_000, 0),
            ..BuildOptions::default()
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri"]);
        let rooms = strings(&["kitchen", "attic"]);
        let objects = strings(&["spoon", "candle", "rope"]);

        let (_, one) = build_game(&names, &rooms, &objects, options("4217")).unwrap();
        let (_, two) = build_game(&names, &rooms, &objects, options("4217")).unwrap();

        assert_eq!(one, two);
        // Byte-identical serialized assignments, not just structural equality
        assert_eq!(
            serde_json::to_string(&one.assignments_by_name).unwrap(),
            serde_json::to_string(&two.assignments_by_name).unwrap()
        );
    }

    #[test]
    fn test_different_codes_differ() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri", "Elena"]);
        let (_, one) = build_game(&names, &[], &[], options("1111")).unwrap();
        let (_, two) = build_game(&names, &[], &[], options("2222")).unwrap();
        assert_ne!(one.assignments_by_name, two.assignments_by_name);
        assert_ne!(one.game_id, two.game_id);
    }

    #[test]
    fn test_duplicate_names_collapse() {
        // One unique identity: must fail, not limp along
        let err = build_game(
            &strings(&["Al", "al ", "AL"]),
            &[],
            &[],
            options("4217"),
        )
        .unwrap_err();
        assert_eq!(err, BuildError::InsufficientPlayers { unique: 1 });
    }

    #[test]
    fn test_dedup_keeps_first_spelling() {
        let (_, state) = build_game(
            &strings(&["Ava", "AVA", "Ben", "Cleo"]),
            &[],
            &[],
            options("4217"),
        )
        .unwrap();
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.players[0].name, "Ava");
    }

    #[test]
    fn test_blank_names_dropped() {
        let err = build_game(
            &strings(&["  ", "", "Ava", "Ben"]),
            &[],
            &[],
            options("4217"),
        )
        .unwrap_err();
        assert_eq!(err, BuildError::InsufficientPlayers { unique: 2 });
    }

    #[test]
    fn test_no_self_targets() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri", "Elena", "Farid"]);
        for code in ["0001", "0002", "0003", "9999"] {
            let (_, state) = build_game(&names, &[], &[], options(code)).unwrap();
            for player in &state.players {
                let assignment = state.assignment(&player.name_normalized).unwrap();
                assert_ne!(assignment.target_name, player.name, "code {code}");
            }
        }
    }

    #[test]
    fn test_targets_resolve_to_players() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri"]);
        let (_, state) = build_game(&names, &[], &[], options("4217")).unwrap();
        for assignment in state.assignments_by_name.values() {
            assert!(state.player(&assignment.target_name).is_some());
        }
    }

    #[test]
    fn test_empty_distractors_use_placeholders() {
        let names = strings(&["Ava", "Ben", "Cleo"]);
        let (_, state) = build_game(&names, &[], &[], options("4217")).unwrap();
        for assignment in state.assignments_by_name.values() {
            assert_eq!(assignment.room, FALLBACK_ROOM);
            assert_eq!(assignment.object, FALLBACK_OBJECT);
        }
    }

    #[test]
    fn test_rooms_wrap_when_outnumbered() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri", "Elena"]);
        let rooms = strings(&["kitchen", "attic"]);
        let (_, state) = build_game(&names, &rooms, &[], options("4217")).unwrap();
        for assignment in state.assignments_by_name.values() {
            assert!(rooms.contains(&assignment.room));
        }
    }

    #[test]
    fn test_regeneration_round_trip() {
        let names = strings(&["Ava", "Ben", "Cleo", "Dmitri"]);
        let rooms = strings(&["kitchen", "attic", "garden"]);
        let objects = strings(&["spoon", "candle"]);

        let (config, built) = build_game(&names, &rooms, &objects, options("4217")).unwrap();
        let regenerated = regenerate_from_config(&config, "4217").unwrap();

        // Full document equality, game id and timestamps included
        assert_eq!(built, regenerated);
    }

    #[test]
    fn test_fresh_document_is_clean() {
        let names = strings(&["Ava", "Ben", "Cleo"]);
        let (_, state) = build_game(&names, &[], &[], options("4217")).unwrap();
        assert!(state.claimed_by_name.is_empty());
        assert!(state.eliminations.is_empty());
        assert_eq!(state.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_random_code_when_absent() {
        let names = strings(&["Ava", "Ben", "Cleo"]);
        let (config, state) = build_game(&names, &[], &[], BuildOptions::default()).unwrap();
        assert_eq!(config.room_number, state.room_number);
        assert_eq!(state.room_number.len(), 4);
        assert!(state.room_number.chars().all(|c| c.is_ascii_digit()));
    }
}
