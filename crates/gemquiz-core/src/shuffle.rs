//! Random permutation and sampling helpers.
//!
//! Every function takes the random source explicitly so callers can seed it
//! (`StdRng::seed_from_u64`) and get reproducible question sets.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Return a uniformly shuffled copy of `items` (Fisher–Yates).
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Draw up to `n` distinct positions from `items`, in random order.
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    let mut out = shuffle(items, rng);
    out.truncate(n);
    out
}

/// Pick one element at random.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Draw up to `n` distractors from `pool` for a question whose answer is `correct`.
///
/// Candidates equal to `correct`, blank candidates, and repeated candidates are
/// dropped first (all comparisons trimmed and case-insensitive), so the result
/// never contains the correct answer and never offers the same text twice.
pub fn generate_wrong_answers<R: Rng + ?Sized>(
    pool: &[String],
    correct: &str,
    n: usize,
    rng: &mut R,
) -> Vec<String> {
    let correct_key = normalize(correct);
    let mut seen = HashSet::new();
    let candidates: Vec<String> = pool
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let key = normalize(s);
            key != correct_key && seen.insert(key)
        })
        .map(str::to_string)
        .collect();

    sample(&candidates, n, rng)
}

/// Normalized comparison key: trimmed and lowercased.
pub(crate) fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffle_is_a_permutation() {
        let input: Vec<u32> = (0..50).collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut out = shuffle(&input, &mut rng);
            assert_eq!(out.len(), input.len());
            out.sort_unstable();
            assert_eq!(out, input);
        }
    }

    #[test]
    fn shuffle_keeps_duplicates() {
        let input = vec!["a", "a", "b"];
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = shuffle(&input, &mut rng);
        out.sort_unstable();
        assert_eq!(out, vec!["a", "a", "b"]);
    }

    #[test]
    fn shuffle_is_reproducible_for_a_seed() {
        let input: Vec<u32> = (0..20).collect();
        let a = shuffle(&input, &mut StdRng::seed_from_u64(42));
        let b = shuffle(&input, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_empty() {
        let input: Vec<u32> = vec![];
        assert!(shuffle(&input, &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn sample_truncates() {
        let input: Vec<u32> = (0..10).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let out = sample(&input, 4, &mut rng);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|x| input.contains(x)));

        let all = sample(&input, 50, &mut rng);
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn pick_from_empty_is_none() {
        let empty: [u8; 0] = [];
        assert!(pick(&empty, &mut StdRng::seed_from_u64(0)).is_none());
    }

    #[test]
    fn wrong_answers_never_include_correct() {
        let pool: Vec<String> = ["Diamond", "Ruby", "Sapphire", "Emerald", " diamond "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let wrong = generate_wrong_answers(&pool, "Diamond", 3, &mut rng);
            assert_eq!(wrong.len(), 3);
            assert!(wrong.iter().all(|w| w.to_lowercase() != "diamond"));
        }
    }

    #[test]
    fn wrong_answers_are_distinct_and_non_blank() {
        let pool: Vec<String> = ["10", "10", "", "  ", "7.5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut wrong = generate_wrong_answers(&pool, "9", 5, &mut rng);
        wrong.sort();
        assert_eq!(wrong, vec!["10".to_string(), "7.5".to_string()]);
    }
}
