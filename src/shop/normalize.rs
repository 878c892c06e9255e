//! Percentage normalization for type weights.

use indexmap::IndexMap;

/// Round half towards positive infinity
fn round_half_up(x: f64) -> i128 {
    (x + 0.5).floor() as i128
}

/// Equal shares of 100; the last key absorbs the remainder
fn even_split(weights: &IndexMap<String, i64>) -> IndexMap<String, i64> {
    let n = weights.len() as i64;
    let base = 100 / n;
    let last = 100 - base * (n - 1);
    weights
        .keys()
        .enumerate()
        .map(|(i, key)| (key.clone(), if i as i64 + 1 == n { last } else { base }))
        .collect()
}

/// Rescale weights so they total exactly 100.
///
/// - Empty input is returned as-is.
/// - Input already totalling 100 is returned as-is.
/// - Input totalling zero or less (all-zero, or negatives cancelling the
///   positives) is split evenly; the last key absorbs the remainder.
/// - Otherwise values are scaled proportionally and rounded, and the rounding
///   error is added to the last key. That key is not clamped, so an
///   adversarial input can push it below zero.
///
/// Sums are taken in `i128`, so no `i64` input overflows. Should a scaled
/// value still not fit back into `i64` (only possible when large negative
/// weights nearly cancel the positive ones), the even split is used.
pub fn normalize_percentages(weights: &IndexMap<String, i64>) -> IndexMap<String, i64> {
    if weights.is_empty() {
        return weights.clone();
    }

    let total: i128 = weights.values().map(|v| i128::from(*v)).sum();
    if total == 100 {
        return weights.clone();
    }
    if total <= 0 {
        return even_split(weights);
    }

    let factor = 100.0 / total as f64;
    let mut scaled: Vec<i128> = weights
        .values()
        .map(|value| round_half_up(*value as f64 * factor))
        .collect();

    let new_total: i128 = scaled.iter().sum();
    if let Some(last) = scaled.last_mut() {
        *last += 100 - new_total;
    }

    let mut normalized = IndexMap::with_capacity(weights.len());
    for (key, value) in weights.keys().zip(scaled) {
        match i64::try_from(value) {
            Ok(value) => {
                normalized.insert(key.clone(), value);
            }
            Err(_) => return even_split(weights),
        }
    }

    normalized
}
