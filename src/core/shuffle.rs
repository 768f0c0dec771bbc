//! Shuffle and Derangement
//!
//! Order-randomizing transforms over sequences. Both come in a seeded
//! (reproducible) flavor used for governed games and an unseeded flavor
//! backed by OS entropy for casual play.
//!
//! The derangement is the heart of mission assignment: a permutation of the
//! player list in which nobody ends up hunting themselves.

use rand::Rng;
use thiserror::Error;

use super::rng::SeededRng;

/// Derangement failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerangementError {
    /// Fewer than 3 items: no useful hunt cycle exists.
    #[error("derangement requires at least 3 items, got {found}")]
    InsufficientInput {
        /// Number of items that were supplied.
        found: usize,
    },
}

/// Return a new vector with the same elements in uniformly random order.
///
/// Fisher–Yates walking the index down from `len - 1` to `1`, swapping with
/// a uniform partner in `[0, i]`. The input is never mutated. With a seed
/// the output is reproducible; without one it draws from OS entropy.
pub fn shuffled<T: Clone>(items: &[T], seed: Option<&str>) -> Vec<T> {
    let mut out = items.to_vec();
    match seed {
        Some(seed) => {
            let mut rng = SeededRng::from_seed(seed);
            fisher_yates(&mut out, |bound| rng.next_index(bound));
        }
        None => {
            let mut rng = rand::rng();
            fisher_yates(&mut out, |bound| rng.random_range(0..bound));
        }
    }
    out
}

/// Produce a cyclic permutation of `names` with no fixed point.
///
/// Runs Sattolo's algorithm: like Fisher–Yates, but the swap partner is
/// drawn from `[0, i)`. The exclusive bound forces a single N-cycle, so no
/// element can stay at its own index. A post-pass then
/// re-swaps any index that still equals its original value until none
/// remain.
///
/// `output[i]` is the target of the player at index `i`.
///
/// # Errors
///
/// `DerangementError::InsufficientInput` when fewer than 3 names are given;
/// a 2-cycle would pair players against each other and a 1-cycle is a
/// self-target.
pub fn derangement(names: &[String], seed: Option<&str>) -> Result<Vec<String>, DerangementError> {
    if names.len() < 3 {
        return Err(DerangementError::InsufficientInput { found: names.len() });
    }

    let mut out = names.to_vec();
    match seed {
        Some(seed) => {
            let mut rng = SeededRng::from_seed(seed);
            sattolo(&mut out, |bound| rng.next_index(bound));
            repair_fixed_points(names, &mut out, |bound| rng.next_index(bound));
        }
        None => {
            let mut rng = rand::rng();
            sattolo(&mut out, |bound| rng.random_range(0..bound));
            repair_fixed_points(names, &mut out, |bound| rng.random_range(0..bound));
        }
    }
    Ok(out)
}

/// Fisher–Yates in place. `draw(bound)` must return a uniform index in
/// `[0, bound)`; it is called with `bound = i + 1` so the partner range is
/// inclusive of `i`.
fn fisher_yates<T>(items: &mut [T], mut draw: impl FnMut(usize) -> usize) {
    for i in (1..items.len()).rev() {
        let j = draw(i + 1);
        items.swap(i, j);
    }
}

/// Sattolo's algorithm in place: partner strictly below `i`.
fn sattolo<T>(items: &mut [T], mut draw: impl FnMut(usize) -> usize) {
    for i in (1..items.len()).rev() {
        let j = draw(i);
        items.swap(i, j);
    }
}

/// Swap away any residual fixed point (`out[i] == original[i]`).
///
/// Each offender is swapped with a uniformly drawn partner other than
/// itself; the scan restarts until the output is clean. With distinct
/// names Sattolo already guarantees a clean cycle, so this pass normally
/// runs zero swaps.
fn repair_fixed_points(
    original: &[String],
    out: &mut [String],
    mut draw: impl FnMut(usize) -> usize,
) {
    let len = out.len();
    loop {
        let Some(i) = (0..len).find(|&i| out[i] == original[i]) else {
            return;
        };
        // Uniform over the len-1 non-self indices
        let mut j = draw(len - 1);
        if j >= i {
            j += 1;
        }
        out.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn is_permutation(a: &[String], b: &[String]) -> bool {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        a.sort();
        b.sort();
        a == b
    }

    #[test]
    fn test_shuffle_does_not_mutate_input() {
        let input = names(&["a", "b", "c", "d"]);
        let copy = input.clone();
        let _ = shuffled(&input, Some("seed"));
        assert_eq!(input, copy);
    }

    #[test]
    fn test_shuffle_seeded_reproducible() {
        let input = names(&["a", "b", "c", "d", "e", "f"]);
        let one = shuffled(&input, Some("room-7777"));
        let two = shuffled(&input, Some("room-7777"));
        assert_eq!(one, two);
        assert!(is_permutation(&input, &one));
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        assert!(shuffled::<String>(&[], Some("s")).is_empty());
        let one = names(&["only"]);
        assert_eq!(shuffled(&one, Some("s")), one);
    }

    #[test]
    fn test_derangement_rejects_small_input() {
        let err = derangement(&names(&["a", "b"]), Some("s")).unwrap_err();
        assert_eq!(err, DerangementError::InsufficientInput { found: 2 });

        let err = derangement(&[], None).unwrap_err();
        assert_eq!(err, DerangementError::InsufficientInput { found: 0 });
    }

    #[test]
    fn test_derangement_no_fixed_points() {
        let input = names(&["Ava", "Ben", "Cleo", "Dmitri", "Elena"]);
        for seed in ["room-0001", "room-0002", "x", "", "room-9999-rooms"] {
            let out = derangement(&input, Some(seed)).unwrap();
            assert!(is_permutation(&input, &out), "seed {seed}");
            for (i, name) in out.iter().enumerate() {
                assert_ne!(name, &input[i], "fixed point at {i} for seed {seed}");
            }
        }
    }

    #[test]
    fn test_derangement_seeded_reproducible() {
        let input = names(&["Ava", "Ben", "Cleo", "Dmitri"]);
        let one = derangement(&input, Some("room-4217")).unwrap();
        let two = derangement(&input, Some("room-4217")).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_derangement_minimum_size() {
        let input = names(&["a", "b", "c"]);
        let out = derangement(&input, Some("tiny")).unwrap();
        for (i, name) in out.iter().enumerate() {
            assert_ne!(name, &input[i]);
        }
    }

    #[test]
    fn test_repair_clears_worst_case() {
        // Feed the repair pass an identity permutation: every index is a
        // fixed point, the worst input it can see.
        let original = names(&["a", "b", "c", "d", "e"]);
        let mut out = original.clone();
        let mut rng = SeededRng::from_seed("repair");
        repair_fixed_points(&original, &mut out, |bound| rng.next_index(bound));

        assert!(is_permutation(&original, &out));
        for (i, name) in out.iter().enumerate() {
            assert_ne!(name, &original[i]);
        }
    }

    proptest! {
        #[test]
        fn prop_derangement_holds_for_any_seed(
            seed in ".{0,24}",
            n in 3usize..12,
        ) {
            let input: Vec<String> = (0..n).map(|i| format!("player-{i}")).collect();
            let out = derangement(&input, Some(&seed)).unwrap();

            prop_assert!(is_permutation(&input, &out));
            for (i, name) in out.iter().enumerate() {
                prop_assert_ne!(name, &input[i]);
            }
        }

        #[test]
        fn prop_shuffle_is_permutation(seed in ".{0,24}", n in 0usize..16) {
            let input: Vec<String> = (0..n).map(|i| format!("item-{i}")).collect();
            let out = shuffled(&input, Some(&seed));
            prop_assert!(is_permutation(&input, &out));
        }
    }
}
