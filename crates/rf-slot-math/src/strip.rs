//! Reel strips and the per-spin strip generator
//!
//! A strip is the circular stop sequence of one physical reel. Strips are built
//! fresh for every spin from the immutable base distribution, so nothing carries
//! over between spins.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::distribution::{ReelDistribution, ReelWeights};
use crate::symbols::SymbolId;

/// A reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Symbol IDs in stop order
    pub symbols: Vec<SymbolId>,
    /// Reel index
    pub reel_index: u8,
}

impl ReelStrip {
    /// Create a new reel strip
    pub fn new(reel_index: u8, symbols: Vec<SymbolId>) -> Self {
        Self {
            symbols,
            reel_index,
        }
    }

    /// Expand weights into a strip (each symbol repeated `weight` times) and shuffle it
    pub fn from_weights<R: Rng + ?Sized>(
        reel_index: u8,
        weights: &ReelWeights,
        rng: &mut R,
    ) -> Self {
        let mut symbols = Vec::with_capacity(weights.total() as usize);
        for (id, weight) in weights.iter() {
            symbols.extend(std::iter::repeat_n(id, weight as usize));
        }
        symbols.shuffle(rng);
        Self::new(reel_index, symbols)
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> SymbolId {
        self.symbols[position % self.symbols.len()]
    }

    /// Contiguous window of `rows` stops starting at `stop`, with wraparound
    pub fn window(&self, stop: usize, rows: usize) -> Vec<SymbolId> {
        (0..rows).map(|row| self.symbol_at(stop + row)).collect()
    }

    /// Get total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of stops holding a symbol
    pub fn count(&self, id: SymbolId) -> usize {
        self.symbols.iter().filter(|&&s| s == id).count()
    }
}

/// Wild suppression applied to one randomly chosen reel per spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildNerf {
    pub wild: SymbolId,
    /// Weight the wild drops to on the nerfed reel
    pub weight: u32,
}

/// Strips for one spin
#[derive(Debug, Clone)]
pub struct SpinStrips {
    pub strips: Vec<ReelStrip>,
    /// Reel whose wild was suppressed, if nerfing is active
    pub nerfed_reel: Option<usize>,
}

/// Builds fresh strips per spin from a shared base distribution
#[derive(Debug, Clone, Copy)]
pub struct StripGenerator<'a> {
    distribution: &'a ReelDistribution,
    nerf: Option<WildNerf>,
}

impl<'a> StripGenerator<'a> {
    pub fn new(distribution: &'a ReelDistribution, nerf: Option<WildNerf>) -> Self {
        Self { distribution, nerf }
    }

    /// Generate one strip per reel.
    ///
    /// With nerfing enabled, one reel index is chosen uniformly and its wild weight is
    /// replaced on a copy of the base weights; other reels use their base weights.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SpinStrips {
        let reel_count = self.distribution.reel_count();
        let nerfed_reel = self.nerf.map(|_| rng.random_range(0..reel_count));

        let strips = (0..reel_count)
            .map(|reel| {
                let base = self.distribution.reel(reel);
                let index = reel as u8;
                match self.nerf {
                    Some(nerf) if nerfed_reel == Some(reel) => {
                        let weights =
                            base.with_wild_nerf(nerf.wild, self.distribution.filler(), nerf.weight);
                        ReelStrip::from_weights(index, &weights, rng)
                    }
                    _ => ReelStrip::from_weights(index, base, rng),
                }
            })
            .collect();

        SpinStrips {
            strips,
            nerfed_reel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::STRIP_LENGTH;
    use crate::symbols::{SymbolDefinition, SymbolTable, SymbolTier};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn distribution() -> ReelDistribution {
        let symbols = SymbolTable::new(vec![
            SymbolDefinition::regular("orange", 11.5, SymbolTier::Common),
            SymbolDefinition::regular("cherry", 57.0, SymbolTier::Uncommon),
            SymbolDefinition::wild("wild", 200.0),
        ])
        .unwrap();
        let pct = vec![
            vec![80.0, 80.0, 80.0, 80.0],
            vec![17.0, 17.0, 17.0, 17.0],
            vec![3.0, 3.0, 3.0, 3.0],
        ];
        ReelDistribution::build(&symbols, &pct, SymbolId(0), 4).unwrap()
    }

    #[test]
    fn test_reel_strip_wrap() {
        let strip = ReelStrip::new(0, vec![SymbolId(1), SymbolId(2), SymbolId(3)]);
        assert_eq!(strip.symbol_at(0), SymbolId(1));
        assert_eq!(strip.symbol_at(3), SymbolId(1)); // Wraps
        assert_eq!(strip.symbol_at(5), SymbolId(3));
        assert_eq!(
            strip.window(2, 3),
            vec![SymbolId(3), SymbolId(1), SymbolId(2)]
        );
    }

    #[test]
    fn test_strip_matches_weights() {
        let dist = distribution();
        let mut rng = StdRng::seed_from_u64(7);
        let strip = ReelStrip::from_weights(0, dist.reel(0), &mut rng);

        assert_eq!(strip.len(), STRIP_LENGTH as usize);
        assert_eq!(strip.count(SymbolId(0)), 800);
        assert_eq!(strip.count(SymbolId(1)), 170);
        assert_eq!(strip.count(SymbolId(2)), 30);
    }

    #[test]
    fn test_strip_is_shuffled() {
        let dist = distribution();
        let mut rng = StdRng::seed_from_u64(99);
        let strip = ReelStrip::from_weights(0, dist.reel(0), &mut rng);
        // unshuffled expansion would start with 800 oranges
        assert!(strip.symbols[..800].iter().any(|&s| s != SymbolId(0)));
    }

    #[test]
    fn test_generator_nerfs_exactly_one_reel() {
        let dist = distribution();
        let nerf = WildNerf {
            wild: SymbolId(2),
            weight: 1,
        };
        let generator = StripGenerator::new(&dist, Some(nerf));
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..50 {
            let spin = generator.generate(&mut rng);
            let nerfed = spin.nerfed_reel.unwrap();
            assert!(nerfed < 4);
            for strip in &spin.strips {
                assert_eq!(strip.len(), STRIP_LENGTH as usize);
                let wilds = strip.count(SymbolId(2));
                if strip.reel_index as usize == nerfed {
                    assert_eq!(wilds, 1);
                    assert_eq!(strip.count(SymbolId(0)), 829);
                } else {
                    assert_eq!(wilds, 30);
                }
            }
        }
        // base distribution is never mutated
        assert_eq!(dist.reel(0).weight(SymbolId(2)), 30);
    }

    #[test]
    fn test_generator_without_nerf() {
        let dist = distribution();
        let generator = StripGenerator::new(&dist, None);
        let mut rng = StdRng::seed_from_u64(1);
        let spin = generator.generate(&mut rng);
        assert!(spin.nerfed_reel.is_none());
        assert!(spin.strips.iter().all(|s| s.count(SymbolId(2)) == 30));
    }
}
