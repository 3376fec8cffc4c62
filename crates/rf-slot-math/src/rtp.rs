//! Analytic return-to-player
//!
//! Exact expected line return per unit bet. Cells on different reels are independent;
//! cells sharing a reel are distinct stops of one shuffled strip, so they are draws without
//! replacement. The nerfed reel is averaged over uniformly.
//!
//! [`theoretical_rtp_for_lines`] uses the raw multipliers. [`theoretical_rtp_for_bet`]
//! uses the cent-rounded line payouts a spin at that bet actually pays.

use crate::config::SlotConfiguration;
use crate::distribution::ReelWeights;
use crate::paytable::PaylineDefinition;
use crate::spin::round_currency;
use crate::symbols::{SymbolId, SymbolTable};

/// Expected RTP with every configured payline active
pub fn theoretical_rtp(config: &SlotConfiguration) -> f64 {
    let lines: Vec<u8> = config.paytable().ids().collect();
    theoretical_rtp_for_lines(config, &lines)
}

/// Expected RTP for a set of active lines (unknown IDs are skipped)
pub fn theoretical_rtp_for_lines(config: &SlotConfiguration, active_lines: &[u8]) -> f64 {
    let symbols = config.symbols();
    let pays: Vec<f64> = symbols.ids().map(|id| symbols.multiplier(id)).collect();
    expected_return(config, active_lines, &pays)
}

/// Expected RTP at a fixed bet per line, with every line payout rounded to cents
pub fn theoretical_rtp_for_bet(
    config: &SlotConfiguration,
    active_lines: &[u8],
    bet_per_line: f64,
) -> f64 {
    if !bet_per_line.is_finite() || bet_per_line <= 0.0 {
        return 0.0;
    }
    let symbols = config.symbols();
    let pays: Vec<f64> = symbols
        .ids()
        .map(|id| round_currency(bet_per_line * symbols.multiplier(id)) / bet_per_line)
        .collect();
    expected_return(config, active_lines, &pays)
}

/// `pays[id]` is the line payout per unit line bet for a full line of `id`
fn expected_return(config: &SlotConfiguration, active_lines: &[u8], pays: &[f64]) -> f64 {
    let lines: Vec<&PaylineDefinition> = active_lines
        .iter()
        .filter_map(|&id| config.paytable().get(id))
        .collect();
    if lines.is_empty() {
        return 0.0;
    }

    let mean_over_lines = |cells: &dyn CellModel| -> f64 {
        lines
            .iter()
            .map(|line| line_return(config.symbols(), pays, cells, line))
            .sum::<f64>()
            / lines.len() as f64
    };

    let Some(distribution) = config.distribution() else {
        return mean_over_lines(&UniformCells {
            symbols: config.symbols().len(),
        });
    };

    let Some(nerf) = config.nerf() else {
        return mean_over_lines(&WeightedCells {
            reels: distribution.reels().to_vec(),
        });
    };

    let reel_count = distribution.reel_count();
    (0..reel_count)
        .map(|nerfed| {
            let reels = distribution
                .reels()
                .iter()
                .enumerate()
                .map(|(reel, weights)| {
                    if reel == nerfed {
                        weights.with_wild_nerf(nerf.wild, distribution.filler(), nerf.weight)
                    } else {
                        weights.clone()
                    }
                })
                .collect();
            mean_over_lines(&WeightedCells { reels })
        })
        .sum::<f64>()
        / reel_count as f64
}

/// Probability that `count` distinct cells on one reel all hold a symbol from `accepted`
trait CellModel {
    fn all_in(&self, reel: usize, count: usize, accepted: &[SymbolId]) -> f64;
}

struct WeightedCells {
    reels: Vec<ReelWeights>,
}

impl CellModel for WeightedCells {
    fn all_in(&self, reel: usize, count: usize, accepted: &[SymbolId]) -> f64 {
        let weights = &self.reels[reel];
        let hits: u32 = accepted.iter().map(|&id| weights.weight(id)).sum();
        falling_ratio(hits as f64, weights.total() as f64, count)
    }
}

struct UniformCells {
    symbols: usize,
}

impl CellModel for UniformCells {
    fn all_in(&self, _reel: usize, count: usize, accepted: &[SymbolId]) -> f64 {
        (accepted.len() as f64 / self.symbols as f64).powi(count as i32)
    }
}

/// `hits·(hits−1)···(hits−k+1) / total·(total−1)···(total−k+1)`
fn falling_ratio(hits: f64, total: f64, k: usize) -> f64 {
    let mut p = 1.0;
    for i in 0..k {
        let num = hits - i as f64;
        if num <= 0.0 {
            return 0.0;
        }
        p *= num / (total - i as f64);
    }
    p
}

fn line_return(
    symbols: &SymbolTable,
    pays: &[f64],
    cells: &dyn CellModel,
    line: &PaylineDefinition,
) -> f64 {
    // cells per reel
    let mut per_reel: Vec<(usize, usize)> = Vec::new();
    for &(_, col) in &line.positions {
        match per_reel.iter_mut().find(|(reel, _)| *reel == col) {
            Some((_, count)) => *count += 1,
            None => per_reel.push((col, 1)),
        }
    }
    let all = |accepted: &[SymbolId]| -> f64 {
        per_reel
            .iter()
            .map(|&(reel, count)| cells.all_in(reel, count, accepted))
            .product()
    };

    let wild = symbols.wild_id();
    let all_wild = wild.map_or(0.0, |w| all(&[w]));
    let mut expected = wild.map_or(0.0, |w| all_wild * pays[w.index()]);

    for id in symbols.ids().filter(|&id| Some(id) != wild) {
        let p = match wild {
            Some(w) => all(&[id, w]) - all_wild,
            None => all(&[id]),
        };
        expected += p * pays[id.index()];
    }
    expected
}
