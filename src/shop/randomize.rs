//! Random distributions for the "randomize" actions of the shop form.

use rand::Rng;

use super::config::{RarityCounts, TypeWeights};
use crate::catalog::rarity::{CountRoll, FALLBACK_ROLL, RarityTier};

/// Inclusive bounds of the raw weight drawn per type before scaling
pub const TYPE_WEIGHT_MIN: i64 = 5;
pub const TYPE_WEIGHT_MAX: i64 = 34;

/// Random type percentages totalling exactly 100.
///
/// Each type gets a raw weight in `TYPE_WEIGHT_MIN..=TYPE_WEIGHT_MAX`, the
/// weights are scaled down to percentages and the rounding shortfall is
/// given to the first type.
pub fn randomize_type_chances<R: Rng + ?Sized>(types: &[String], rng: &mut R) -> TypeWeights {
    if types.is_empty() {
        return TypeWeights::new();
    }

    let raw: Vec<i64> = types
        .iter()
        .map(|_| rng.gen_range(TYPE_WEIGHT_MIN..=TYPE_WEIGHT_MAX))
        .collect();
    let total: i64 = raw.iter().sum();

    let mut chances: TypeWeights = types
        .iter()
        .zip(&raw)
        .map(|(label, weight)| (label.clone(), weight * 100 / total))
        .collect();

    let assigned: i64 = chances.values().sum();
    if let Some((_, first)) = chances.first_mut() {
        *first += 100 - assigned;
    }

    chances
}

/// Draw a count from a tier roll
pub fn roll_count<R: Rng + ?Sized>(roll: CountRoll, rng: &mut R) -> i64 {
    match roll {
        CountRoll::Uniform { min, max } => rng.gen_range(min..=max),
        CountRoll::Chance(p) => {
            if rng.gen_bool(p) {
                1
            } else {
                0
            }
        }
    }
}

/// Random item counts for each rarity label.
///
/// Starts from `existing` so counts for tiers not listed in `rarities` are
/// kept; listed tiers get a fresh count from their tier's roll.
pub fn randomize_rarities<R: Rng + ?Sized>(
    rarities: &[String],
    existing: &RarityCounts,
    rng: &mut R,
) -> RarityCounts {
    let mut counts = existing.clone();

    for label in rarities {
        let roll = RarityTier::from_label(label)
            .map(|tier| tier.count_roll())
            .unwrap_or(FALLBACK_ROLL);
        counts.insert(label.clone(), roll_count(roll, rng));
    }

    counts
}
