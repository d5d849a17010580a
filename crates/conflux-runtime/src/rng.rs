//! Seeded pseudo-random helpers.
//!
//! The runtime never depends on the `rand` crate: all stochastic choices go
//! through a linear-congruential generator so that a fixed seed reproduces
//! an identical simulation.

/// Advance the LCG state and return a value in [0, 1).
pub(crate) fn next_unit(state: &mut u64) -> f64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    (*state >> 33) as f64 / (1u64 << 31) as f64
}

/// Deterministic Fisher-Yates shuffle.
pub(crate) fn shuffle<T>(items: &mut [T], state: &mut u64) {
    for i in (1..items.len()).rev() {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (*state >> 33) as usize % (i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_unit_is_in_range_and_deterministic() {
        let mut a = 42u64;
        let mut b = 42u64;
        for _ in 0..1000 {
            let va = next_unit(&mut a);
            let vb = next_unit(&mut b);
            assert_eq!(va, vb);
            assert!((0.0..1.0).contains(&va));
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..20).collect();
        let mut state = 7u64;
        shuffle(&mut items, &mut state);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
