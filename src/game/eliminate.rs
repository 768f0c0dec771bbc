//! Elimination State Machine
//!
//! Validates and applies kill events against a game document. A valid kill
//! hands the victim's mission to the killer; a self-report just marks the
//! player dead. Every precondition failure is a distinct error and leaves
//! the document untouched.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::name::normalize;
use crate::game::state::{EliminationCause, EliminationRecord, GameStateV1};

/// Elimination-time validation failures, in precondition order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EliminationError {
    /// The named killer has no assignment in this game.
    #[error("unknown killer: {identity}")]
    UnknownKiller {
        /// Normalized identity that failed to resolve.
        identity: String,
    },

    /// The named target has no assignment in this game.
    #[error("unknown target: {identity}")]
    UnknownTarget {
        /// Normalized identity that failed to resolve.
        identity: String,
    },

    /// The named target is not the killer's current target.
    #[error("{target} is not the current target of {killer}")]
    WrongTarget {
        /// Normalized killer identity.
        killer: String,
        /// Normalized identity that was claimed as the target.
        target: String,
    },

    /// The target already appears as a victim in the elimination record.
    #[error("{identity} has already been eliminated")]
    AlreadyEliminated {
        /// Normalized identity of the already-dead player.
        identity: String,
    },
}

/// An elimination event, tagged by kind.
///
/// The kind is an explicit variant instead of a sentinel-prefixed killer
/// identity: no player name can ever be mistaken for a self-report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EliminationEvent {
    /// `killer` claims to have taken out `target`.
    Kill {
        /// Identity of the killer (raw or normalized).
        killer: String,
        /// Identity of the victim (raw or normalized).
        target: String,
    },
    /// `player` voluntarily declares themselves dead.
    SelfReport {
        /// Identity of the self-reporting player.
        player: String,
    },
}

/// Apply a kill: `killer` eliminates `target` and inherits their mission.
///
/// Preconditions, checked in order:
/// 1. killer has an assignment, else [`EliminationError::UnknownKiller`];
/// 2. target has an assignment, else [`EliminationError::UnknownTarget`];
/// 3. target is the killer's current target, else
///    [`EliminationError::WrongTarget`];
/// 4. target is not already a victim, else
///    [`EliminationError::AlreadyEliminated`].
///
/// On success the killer's assignment becomes the victim's former
/// assignment verbatim, and the appended record is returned.
pub fn eliminate(
    state: &mut GameStateV1,
    killer: &str,
    target: &str,
    at: DateTime<Utc>,
) -> Result<EliminationRecord, EliminationError> {
    apply(
        state,
        EliminationEvent::Kill {
            killer: killer.to_string(),
            target: target.to_string(),
        },
        at,
    )
}

/// Apply a self-report: `player` declares themselves eliminated.
///
/// The killer-match check is bypassed and no mission is transferred; the
/// player's own assignment stays in the document for the audit trail.
pub fn mark_self_eliminated(
    state: &mut GameStateV1,
    player: &str,
    at: DateTime<Utc>,
) -> Result<EliminationRecord, EliminationError> {
    apply(
        state,
        EliminationEvent::SelfReport {
            player: player.to_string(),
        },
        at,
    )
}

/// Validate and apply one elimination event.
///
/// All checks run before any mutation, so a failed event leaves the
/// document exactly as it was.
pub fn apply(
    state: &mut GameStateV1,
    event: EliminationEvent,
    at: DateTime<Utc>,
) -> Result<EliminationRecord, EliminationError> {
    let (killer_key, victim_key) = match &event {
        EliminationEvent::Kill { killer, target } => {
            (Some(normalize(killer)), normalize(target))
        }
        EliminationEvent::SelfReport { player } => (None, normalize(player)),
    };

    if let Some(killer_key) = &killer_key {
        if !state.assignments_by_name.contains_key(killer_key) {
            return Err(EliminationError::UnknownKiller {
                identity: killer_key.clone(),
            });
        }
    }

    if !state.assignments_by_name.contains_key(&victim_key) {
        return Err(EliminationError::UnknownTarget {
            identity: victim_key.clone(),
        });
    }

    if let Some(killer_key) = &killer_key {
        let current = &state.assignments_by_name[killer_key];
        if normalize(&current.target_name) != victim_key {
            return Err(EliminationError::WrongTarget {
                killer: killer_key.clone(),
                target: victim_key.clone(),
            });
        }
    }

    if state.is_eliminated(&victim_key) {
        return Err(EliminationError::AlreadyEliminated {
            identity: victim_key,
        });
    }

    // Checks passed; mutate. Mission inheritance only on a real kill.
    if let Some(killer_key) = &killer_key {
        let inherited = state.assignments_by_name[&victim_key].clone();
        state
            .assignments_by_name
            .insert(killer_key.clone(), inherited);
    }

    let record = EliminationRecord {
        victim: victim_key,
        cause: match killer_key {
            Some(killer) => EliminationCause::Kill { killer },
            None => EliminationCause::SelfReport,
        },
        at,
    };
    state.eliminations.push(record.clone());
    Ok(record)
}
