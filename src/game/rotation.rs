//! Room Rotation Scheduler
//!
//! Optional refinement over a static mission: the room component rotates on
//! a fixed wall-clock interval. Each client computes the current room
//! independently from the document's creation instant and its own clock, so
//! every device converges on the same answer without a server push. The
//! target and object never rotate.

use chrono::{DateTime, Duration, Utc};

use crate::game::state::{Assignment, GameStateV1};

/// Current mission for an identity at `now`, rotation applied.
///
/// Returns `None` when the identity has no assignment in this game.
/// Eliminated players still resolve; filtering them out of target lists is
/// the caller's concern.
pub fn current_assignment_for(
    state: &GameStateV1,
    identity: &str,
    now: DateTime<Utc>,
) -> Option<Assignment> {
    let assignment = state.assignment(identity)?.clone();
    let Some(index) = state.player_index(identity) else {
        // Assignment without a player row should not happen; fall back to
        // the static mission rather than inventing a rotation slot.
        return Some(assignment);
    };

    match rotation_slot(state, now) {
        Some(slot) if state.rooms.len() > 1 => {
            let len = state.rooms.len();
            let room = state.rooms[(index + slot as usize) % len].clone();
            Some(Assignment { room, ..assignment })
        }
        _ => Some(assignment),
    }
}

/// Time remaining until the room next rotates, for countdown UIs.
///
/// `None` when this game does not rotate rooms at all.
pub fn time_until_rotation(state: &GameStateV1, now: DateTime<Utc>) -> Option<Duration> {
    let interval = effective_interval(state)?;
    let elapsed = elapsed_secs(state, now);
    Some(Duration::seconds(interval - elapsed % interval))
}

/// Completed whole rotation intervals since game creation.
///
/// `None` when rotation is disabled for this game.
pub fn rotation_slot(state: &GameStateV1, now: DateTime<Utc>) -> Option<i64> {
    let interval = effective_interval(state)?;
    Some(elapsed_secs(state, now) / interval)
}

/// The game's rotation interval, if rotation is enabled and sane.
fn effective_interval(state: &GameStateV1) -> Option<i64> {
    state.rotation_interval_secs.filter(|&secs| secs > 0)
}

/// Seconds since game creation, clamped at zero for skewed clocks.
fn elapsed_secs(state: &GameStateV1, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(state.created_at)
        .num_seconds()
        .max(0)
}
