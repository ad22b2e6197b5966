//! Weighted categorical sampling.
//!
//! Everything here is a pure function of its inputs plus the RNG handed
//! in by the caller. No table caches state between calls.

use crate::rng::StageRng;

/// Cumulative weight table for repeated draws over the same weights.
#[derive(Debug, Clone)]
pub struct WeightedTable {
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedTable {
    /// Build from raw weights. Returns None when there is nothing to
    /// draw: no weights, a negative or non-finite weight, or a zero total.
    pub fn new(weights: &[f64]) -> Option<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for w in weights {
            total += w;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return None;
        }
        Some(Self { cumulative, total })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Probability of each index after normalization.
    pub fn probabilities(&self) -> Vec<f64> {
        let mut prev = 0.0;
        self.cumulative
            .iter()
            .map(|c| {
                let p = (c - prev) / self.total;
                prev = *c;
                p
            })
            .collect()
    }

    /// Draw one index.
    pub fn draw(&self, rng: &mut StageRng) -> usize {
        let target = rng.next_f64() * self.total;
        let idx = self.cumulative.partition_point(|c| *c <= target);
        // Rounding can push target onto the final boundary.
        idx.min(self.cumulative.len() - 1)
    }
}

/// Draw `k` indices independently (with replacement) according to `weights`.
/// Returns an empty vec when the weights admit no draw.
pub fn sample_with_replacement(weights: &[f64], k: usize, rng: &mut StageRng) -> Vec<usize> {
    match WeightedTable::new(weights) {
        Some(table) => (0..k).map(|_| table.draw(rng)).collect(),
        None => Vec::new(),
    }
}

/// Pick one item from `(item, weight)` pairs.
pub fn pick<'a, T>(items: &'a [(T, f64)], rng: &mut StageRng) -> Option<&'a T> {
    let weights: Vec<f64> = items.iter().map(|(_, w)| *w).collect();
    let table = WeightedTable::new(&weights)?;
    items.get(table.draw(rng)).map(|(item, _)| item)
}

/// Pick `k` distinct indices from `0..n` in selection order.
/// `k` larger than `n` yields a full permutation.
pub fn sample_distinct(n: usize, k: usize, rng: &mut StageRng) -> Vec<usize> {
    let k = k.min(n);
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + rng.next_u64_below((n - i) as u64) as usize;
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    fn rng() -> StageRng {
        RngBank::new(2024).for_stage(StageSlot::Transaction)
    }

    #[test]
    fn rejects_degenerate_weights() {
        assert!(WeightedTable::new(&[]).is_none());
        assert!(WeightedTable::new(&[0.0, 0.0]).is_none());
        assert!(WeightedTable::new(&[1.0, -0.5]).is_none());
        assert!(WeightedTable::new(&[1.0, f64::NAN]).is_none());
    }

    #[test]
    fn probabilities_are_normalized() {
        let table = WeightedTable::new(&[1.0, 3.0, 0.0, 4.0]).unwrap();
        let p = table.probabilities();
        assert_eq!(p.len(), 4);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((p[1] - 0.375).abs() < 1e-12);
        assert_eq!(p[2], 0.0);
    }

    #[test]
    fn zero_weight_index_is_never_drawn() {
        let mut rng = rng();
        let draws = sample_with_replacement(&[1.0, 0.0, 1.0], 2_000, &mut rng);
        assert_eq!(draws.len(), 2_000);
        assert!(draws.iter().all(|i| *i != 1));
    }

    #[test]
    fn draw_frequencies_follow_weights() {
        let mut rng = rng();
        let n = 20_000;
        let draws = sample_with_replacement(&[0.7, 0.2, 0.1], n, &mut rng);
        let mut counts = [0usize; 3];
        for d in draws {
            counts[d] += 1;
        }
        let share = counts[0] as f64 / n as f64;
        assert!((share - 0.7).abs() < 0.02, "share of first index {share:.3}");
    }

    #[test]
    fn with_replacement_repeats_items() {
        let mut rng = rng();
        let draws = sample_with_replacement(&[1.0, 1.0], 50, &mut rng);
        let firsts = draws.iter().filter(|d| **d == 0).count();
        assert!(firsts > 0 && firsts < 50);
    }

    #[test]
    fn pick_returns_the_item_not_the_index() {
        let mut rng = rng();
        let items = [("only", 0.0), ("chosen", 2.5)];
        for _ in 0..20 {
            assert_eq!(pick(&items, &mut rng), Some(&"chosen"));
        }
        let none: [(&str, f64); 0] = [];
        assert_eq!(pick(&none, &mut rng), None);
    }

    #[test]
    fn sample_distinct_has_no_duplicates() {
        let mut rng = rng();
        let picked = sample_distinct(8, 2, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
        assert!(picked.iter().all(|i| *i < 8));

        let all = sample_distinct(3, 10, &mut rng);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }
}
