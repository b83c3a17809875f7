//! Swing point detection
//!
//! A direct local-extremum scan with greedy minimum-distance suppression:
//! candidates are visited from the most extreme value down, and anything
//! closer than `min_distance` bars to an already kept point is dropped.

use crate::domain::market::Bar;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

/// Indices of local maxima of `values`, at least `min_distance` apart.
///
/// Flat tops resolve to the middle of the plateau. The first and last
/// samples are never peaks. Output is sorted by index.
pub fn find_peaks(values: &[f64], min_distance: usize) -> Vec<usize> {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                candidates.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    // Most prominent first; ties keep the earlier bar
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        values[candidates[b]]
            .partial_cmp(&values[candidates[a]])
            .unwrap_or(Ordering::Equal)
            .then(candidates[a].cmp(&candidates[b]))
    });

    let mut keep = vec![true; candidates.len()];
    for &pos in &order {
        if !keep[pos] {
            continue;
        }
        let peak = candidates[pos];

        let mut left = pos;
        while left > 0 && peak - candidates[left - 1] < min_distance {
            left -= 1;
            keep[left] = false;
        }
        let mut right = pos + 1;
        while right < candidates.len() && candidates[right] - peak < min_distance {
            keep[right] = false;
            right += 1;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(idx, kept)| kept.then_some(idx))
        .collect()
}

pub fn swing_highs(bars: &[Bar], min_distance: usize) -> Vec<SwingPoint> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    find_peaks(&highs, min_distance)
        .into_iter()
        .map(|index| SwingPoint {
            index,
            price: bars[index].high,
            kind: SwingKind::High,
        })
        .collect()
}

/// Swing lows are the peaks of the negated lows.
pub fn swing_lows(bars: &[Bar], min_distance: usize) -> Vec<SwingPoint> {
    let inverted: Vec<f64> = bars.iter().map(|b| -b.low).collect();
    find_peaks(&inverted, min_distance)
        .into_iter()
        .map(|index| SwingPoint {
            index,
            price: bars[index].low,
            kind: SwingKind::Low,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_peaks() {
        let values = [1.0, 3.0, 1.0, 2.0, 5.0, 2.0, 1.0];
        assert_eq!(find_peaks(&values, 1), vec![1, 4]);
    }

    #[test]
    fn test_edges_are_not_peaks() {
        let values = [5.0, 1.0, 2.0, 1.0, 6.0];
        assert_eq!(find_peaks(&values, 1), vec![2]);
    }

    #[test]
    fn test_plateau_resolves_to_middle() {
        let values = [1.0, 4.0, 4.0, 4.0, 1.0];
        assert_eq!(find_peaks(&values, 1), vec![2]);

        // A plateau that runs into the last sample is not a peak
        let rising = [1.0, 4.0, 4.0, 4.0];
        assert!(find_peaks(&rising, 1).is_empty());
    }

    #[test]
    fn test_distance_keeps_most_prominent() {
        // Peaks at 1 (3.0), 3 (5.0), 7 (4.0)
        let values = [0.0, 3.0, 0.0, 5.0, 0.0, 0.0, 0.0, 4.0, 0.0];
        assert_eq!(find_peaks(&values, 3), vec![3, 7]);
        assert_eq!(find_peaks(&values, 5), vec![3]);
    }

    #[test]
    fn test_swing_lows_use_bar_lows() {
        let bars: Vec<Bar> = [10.0, 8.0, 6.0, 9.0, 11.0]
            .iter()
            .enumerate()
            .map(|(i, &low)| Bar::new(i as i64, low + 1.0, low + 2.0, low, low + 1.0, 100.0))
            .collect();

        let lows = swing_lows(&bars, 1);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].index, 2);
        assert_eq!(lows[0].price, 6.0);
        assert_eq!(lows[0].kind, SwingKind::Low);
    }
}
