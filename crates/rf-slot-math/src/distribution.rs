//! Reel distribution builder
//!
//! Converts per-reel symbol percentages (0–100 scale) into integer weights on a
//! 0–1000 scale. Every reel sums to exactly [`STRIP_LENGTH`]; rounding drift is
//! absorbed by the filler symbol.

use serde::Serialize;

use crate::error::ConfigError;
use crate::symbols::{SymbolId, SymbolTable, SymbolTier};

/// Number of stops on every weighted reel strip
pub const STRIP_LENGTH: u32 = 1000;

/// Largest accepted per-reel percentage
pub const MAX_PERCENTAGE: f64 = 100.0;

const WEIGHT_PER_PERCENT: f64 = STRIP_LENGTH as f64 / 100.0;

/// Convert a 0–100 percentage into a 0–1000 weight
pub fn percentage_to_weight(percentage: f64) -> i64 {
    (percentage * WEIGHT_PER_PERCENT).round() as i64
}

/// Integer symbol weights for one reel, indexed by [`SymbolId`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReelWeights {
    weights: Vec<u32>,
}

impl ReelWeights {
    pub fn from_weights(weights: Vec<u32>) -> Self {
        Self { weights }
    }

    pub fn weight(&self, id: SymbolId) -> u32 {
        self.weights.get(id.index()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.weights.iter().sum()
    }

    /// Appearance probability of a symbol on this reel (0.0–1.0)
    pub fn probability(&self, id: SymbolId) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.weight(id) as f64 / total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, u32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, &w)| (SymbolId(i as u16), w))
    }

    /// Copy of these weights with the wild suppressed to `nerf_weight`.
    ///
    /// The removed weight moves onto the filler, so the total is unchanged.
    /// A reel whose wild weight is already at or below `nerf_weight` is returned as is.
    pub fn with_wild_nerf(&self, wild: SymbolId, filler: SymbolId, nerf_weight: u32) -> Self {
        let mut nerfed = self.clone();
        let base = self.weight(wild);
        if base > nerf_weight {
            let moved = base - nerf_weight;
            nerfed.weights[wild.index()] = nerf_weight;
            nerfed.weights[filler.index()] += moved;
        }
        nerfed
    }
}

/// Per-reel weight maps for a weighted slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReelDistribution {
    reels: Vec<ReelWeights>,
    filler: SymbolId,
}

impl ReelDistribution {
    /// Build the distribution from a percentage table.
    ///
    /// `percentages[symbol][reel]` is indexed by [`SymbolId`] and must cover every symbol in
    /// `symbols` and every reel in `0..reel_count`.
    pub fn build(
        symbols: &SymbolTable,
        percentages: &[Vec<f64>],
        filler: SymbolId,
        reel_count: usize,
    ) -> Result<Self, ConfigError> {
        if percentages.len() != symbols.len() {
            return Err(ConfigError::MixedWeighting);
        }
        if symbols.get(filler).is_none() {
            return Err(ConfigError::UnknownFiller(filler.to_string()));
        }

        for (id, def) in symbols.iter() {
            let row = &percentages[id.index()];
            if row.len() != reel_count {
                return Err(ConfigError::ReelCountMismatch {
                    symbol: def.name.clone(),
                    expected: reel_count,
                    found: row.len(),
                });
            }
            if let Some((reel, &value)) = row
                .iter()
                .enumerate()
                .find(|(_, v)| !(0.0..=MAX_PERCENTAGE).contains(*v))
            {
                return Err(ConfigError::InvalidPercentage {
                    symbol: def.name.clone(),
                    reel,
                    value,
                });
            }
        }

        let mut reels = Vec::with_capacity(reel_count);
        for reel in 0..reel_count {
            let mut weights: Vec<i64> = percentages
                .iter()
                .map(|row| percentage_to_weight(row[reel]))
                .collect();

            let total: i64 = weights.iter().sum();
            let shortfall = STRIP_LENGTH as i64 - total;
            let filler_weight = weights[filler.index()] + shortfall;
            if filler_weight < 0 {
                return Err(ConfigError::Unnormalizable {
                    reel,
                    target: STRIP_LENGTH,
                    weight: filler_weight,
                });
            }
            if shortfall != 0 {
                log::debug!(
                    "reel {}: filler '{}' adjusted by {:+} to reach {}",
                    reel,
                    symbols.name(filler),
                    shortfall,
                    STRIP_LENGTH
                );
            }
            weights[filler.index()] = filler_weight;

            // every entry is non-negative and the sum is STRIP_LENGTH, so the casts are lossless
            reels.push(ReelWeights::from_weights(
                weights.into_iter().map(|w| w as u32).collect(),
            ));
        }

        Ok(Self { reels, filler })
    }

    pub fn reel(&self, index: usize) -> &ReelWeights {
        &self.reels[index]
    }

    pub fn reels(&self) -> &[ReelWeights] {
        &self.reels
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// Symbol that absorbs normalization and nerf adjustments
    pub fn filler(&self) -> SymbolId {
        self.filler
    }

    /// Mean appearance probability of a symbol across all reels (0.0–1.0)
    pub fn average_probability(&self, id: SymbolId) -> f64 {
        if self.reels.is_empty() {
            return 0.0;
        }
        self.reels.iter().map(|r| r.probability(id)).sum::<f64>() / self.reels.len() as f64
    }
}

/// Pick the filler when none is designated: the common-tier, non-wild symbol with the
/// highest summed percentage. Ties go to the earlier declaration.
pub fn default_filler(
    symbols: &SymbolTable,
    percentages: &[Vec<f64>],
) -> Result<SymbolId, ConfigError> {
    let mut best: Option<(SymbolId, f64)> = None;
    for id in symbols.ids_in_tier(SymbolTier::Common) {
        if symbols.is_wild(id) {
            continue;
        }
        let total: f64 = percentages
            .get(id.index())
            .map(|row| row.iter().sum())
            .unwrap_or(0.0);
        match best {
            Some((_, best_total)) if best_total >= total => {}
            _ => best = Some((id, total)),
        }
    }
    best.map(|(id, _)| id).ok_or(ConfigError::MissingFiller)
}
