//! Weighted roulette selection over an ordered pool.

use rand::Rng;

/// Pick an index from `weights` given a uniform roll in `[0, 1)`.
///
/// The roll is scaled by the total weight and each candidate's weight is
/// subtracted in table order; the first candidate that brings the roll to
/// `<= 0` wins. A roll landing exactly on a boundary therefore resolves to the
/// earlier entry. Entries with a non-positive weight are never chosen.
pub fn pick_weighted_index(weights: &[f32], unit_roll: f32) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = unit_roll.clamp(0.0, 1.0) * total;
    let mut last_valid = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_valid = Some(i);
        roll -= w;
        if roll <= 0.0 {
            return Some(i);
        }
    }

    // Float drift can leave a sliver of roll after the last entry.
    last_valid
}

/// Roll once and pick an item from `items` using `weight_of`.
pub fn pick_weighted<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weight_of: impl Fn(&T) -> f32,
    rng: &mut R,
) -> Option<&'a T> {
    let weights: Vec<f32> = items.iter().map(&weight_of).collect();
    let roll: f32 = rng.gen();
    pick_weighted_index(&weights, roll).map(|i| &items[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_pool_picks_nothing() {
        assert_eq!(pick_weighted_index(&[], 0.5), None);
        assert_eq!(pick_weighted_index(&[0.0, 0.0], 0.5), None);
    }

    #[test]
    fn zero_roll_picks_first() {
        assert_eq!(pick_weighted_index(&[2.5, 2.0, 1.0], 0.0), Some(0));
    }

    #[test]
    fn boundary_roll_picks_earlier_entry() {
        // total = 4.0, roll = 0.5 * 4.0 = 2.0 lands exactly on the end of entry 0
        assert_eq!(pick_weighted_index(&[2.0, 2.0], 0.5), Some(0));
    }

    #[test]
    fn top_roll_picks_last() {
        assert_eq!(pick_weighted_index(&[1.0, 1.0, 1.0], 0.9999), Some(2));
        assert_eq!(pick_weighted_index(&[1.0, 1.0, 1.0], 1.0), Some(2));
    }

    #[test]
    fn zero_weight_entries_are_skipped() {
        assert_eq!(pick_weighted_index(&[0.0, 1.0], 0.0), Some(1));
        assert_eq!(pick_weighted_index(&[1.0, 0.0], 1.0), Some(0));
    }

    #[test]
    fn frequencies_converge_to_weights() {
        let weights = [2.5_f32, 2.0, 1.0];
        let mut rng = StdRng::seed_from_u64(0xB055);
        let mut counts = [0usize; 3];
        let trials = 200_000;
        for _ in 0..trials {
            let idx = pick_weighted(&weights, |w| *w, &mut rng).unwrap();
            let i = weights.iter().position(|w| std::ptr::eq(w, idx)).unwrap();
            counts[i] += 1;
        }
        let expected = [0.4545, 0.3636, 0.1818];
        for (c, e) in counts.iter().zip(expected) {
            let observed = *c as f32 / trials as f32;
            assert!(
                (observed - e).abs() < 0.01,
                "observed {observed:.4}, expected {e:.4}"
            );
        }
    }
}
