//! Seeded Fisher–Yates shuffling.
//!
//! String seeds are hashed with SHA-256 into a ChaCha8 key, so the same
//! `(items, seed)` pair yields the same permutation on every platform and
//! across restarts.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::model::{QuestionId, SessionId};

/// Build a reproducible generator from an arbitrary string seed.
#[must_use]
pub fn seeded_rng(seed: &str) -> ChaCha8Rng {
    let key: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
    ChaCha8Rng::from_seed(key)
}

/// Return a permutation of `items` that depends only on `items` and `seed`.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    shuffle_with(items, &mut seeded_rng(seed))
}

/// Fisher–Yates over a copy of `items`, driven by `rng`.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen index in `[0, i]`.
#[must_use]
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Conventional seed for ordering a question's answers within a session.
#[must_use]
pub fn answer_seed(question_id: &QuestionId, session_id: &SessionId) -> String {
    format!("{question_id}:{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<char> {
        ('a'..='t').collect()
    }

    #[test]
    fn same_seed_same_order() {
        let items = letters();
        assert_eq!(shuffle(&items, "seed-A"), shuffle(&items, "seed-A"));
    }

    #[test]
    fn different_seeds_differ() {
        let items = letters();
        assert_ne!(shuffle(&items, "seed-A"), shuffle(&items, "seed-B"));
    }

    #[test]
    fn shuffle_preserves_elements() {
        let items = letters();
        let mut shuffled = shuffle(&items, "anything");
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn empty_and_singleton_are_noops() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffle(&empty, "x").is_empty());
        assert_eq!(shuffle(&[7], "x"), vec![7]);
    }

    #[test]
    fn input_is_left_untouched() {
        let items = letters();
        let before = items.clone();
        let _ = shuffle(&items, "seed");
        assert_eq!(items, before);
    }

    #[test]
    fn shuffle_with_matches_string_seeded_shuffle() {
        let items = letters();
        let mut rng = seeded_rng("seed-A");
        assert_eq!(shuffle_with(&items, &mut rng), shuffle(&items, "seed-A"));
    }

    #[test]
    fn answer_seed_combines_question_and_session() {
        let seed = answer_seed(&QuestionId::new("q1"), &SessionId::new("s9"));
        assert_eq!(seed, "q1:s9");
    }
}
