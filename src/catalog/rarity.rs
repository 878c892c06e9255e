//! Rarity tiers
//!
//! The catalog stores rarity as a free-text label ("3 - Rare"). The tier enum
//! gives those labels a canonical identity so that per-tier rules (such as the
//! count ranges used when randomizing a shop) live in a table instead of in
//! substring checks.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    Neutral,
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
    Artifact,
    /// Items whose rarity depends on the variant (e.g. "+1 / +2 / +3").
    Variable,
}

/// How many items of a tier a randomized shop receives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountRoll {
    /// Uniform integer in `min..=max`
    Uniform { min: i64, max: i64 },
    /// `1` with the given probability, `0` otherwise
    Chance(f64),
}

/// Roll used for labels that don't map to a known tier
pub const FALLBACK_ROLL: CountRoll = CountRoll::Uniform { min: 0, max: 2 };

impl RarityTier {
    pub const ALL: [RarityTier; 8] = [
        RarityTier::Neutral,
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::VeryRare,
        RarityTier::Legendary,
        RarityTier::Artifact,
        RarityTier::Variable,
    ];

    /// Canonical catalog label
    pub fn label(&self) -> &'static str {
        match self {
            RarityTier::Neutral => "0 - Neutre",
            RarityTier::Common => "1 - Commun",
            RarityTier::Uncommon => "2 - Peu commun",
            RarityTier::Rare => "3 - Rare",
            RarityTier::VeryRare => "4 - Très rare",
            RarityTier::Legendary => "5 - Légendaire",
            RarityTier::Artifact => "6 - Artéfact",
            RarityTier::Variable => "Variable",
        }
    }

    fn rank(&self) -> Option<u8> {
        match self {
            RarityTier::Neutral => Some(0),
            RarityTier::Common => Some(1),
            RarityTier::Uncommon => Some(2),
            RarityTier::Rare => Some(3),
            RarityTier::VeryRare => Some(4),
            RarityTier::Legendary => Some(5),
            RarityTier::Artifact => Some(6),
            RarityTier::Variable => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "neutre" => Some(RarityTier::Neutral),
            "commun" => Some(RarityTier::Common),
            "peu commun" => Some(RarityTier::Uncommon),
            "rare" => Some(RarityTier::Rare),
            "très rare" | "tres rare" => Some(RarityTier::VeryRare),
            "légendaire" | "legendaire" => Some(RarityTier::Legendary),
            "artéfact" | "artefact" => Some(RarityTier::Artifact),
            "variable" => Some(RarityTier::Variable),
            _ => None,
        }
    }

    /// Resolve a catalog label to its tier.
    ///
    /// Accepts the canonical label, the bare tier name, or the numeric rank,
    /// ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();

        if let Some((prefix, name)) = normalized.split_once(" - ") {
            if let Some(tier) = Self::from_name(name.trim()) {
                return Some(tier);
            }
            return Self::from_rank_str(prefix.trim());
        }

        Self::from_name(&normalized).or_else(|| Self::from_rank_str(&normalized))
    }

    fn from_rank_str(s: &str) -> Option<Self> {
        let rank: u8 = s.parse().ok()?;
        Self::ALL.iter().copied().find(|t| t.rank() == Some(rank))
    }

    /// Count distribution used when randomizing a shop's rarity counts
    pub fn count_roll(&self) -> CountRoll {
        match self {
            RarityTier::Neutral | RarityTier::Common | RarityTier::Variable => {
                CountRoll::Uniform { min: 3, max: 8 }
            }
            RarityTier::Uncommon => CountRoll::Uniform { min: 1, max: 4 },
            RarityTier::Rare => CountRoll::Uniform { min: 0, max: 2 },
            RarityTier::VeryRare => CountRoll::Uniform { min: 0, max: 1 },
            RarityTier::Legendary => CountRoll::Chance(0.2),
            RarityTier::Artifact => FALLBACK_ROLL,
        }
    }
}
