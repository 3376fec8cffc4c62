//! Aggregated spin statistics
//!
//! Each work chunk fills its own [`SpinStats`]; chunks are merged in chunk order.

use serde::{Deserialize, Serialize};

use rf_slot_math::{SpinResult, SpinTrace, SymbolTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinStats {
    pub spins: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub winning_spins: u64,
    pub jackpot_spins: u64,
    pub max_win: f64,
    /// Lines made entirely of wilds
    pub all_wild_line_wins: u64,
    /// Winning lines per base symbol, indexed by symbol ID
    pub symbol_wins: Vec<u64>,
    pub symbol_payouts: Vec<f64>,
    /// `[reel][symbol]` visible-cell counts
    pub reel_appearances: Vec<Vec<u64>>,
    /// Spins in which each reel was nerfed
    pub nerfed_reel_counts: Vec<u64>,
}

impl SpinStats {
    pub fn new(symbols: usize, reels: usize) -> Self {
        Self {
            spins: 0,
            total_wagered: 0.0,
            total_won: 0.0,
            winning_spins: 0,
            jackpot_spins: 0,
            max_win: 0.0,
            all_wild_line_wins: 0,
            symbol_wins: vec![0; symbols],
            symbol_payouts: vec![0.0; symbols],
            reel_appearances: vec![vec![0; symbols]; reels],
            nerfed_reel_counts: vec![0; reels],
        }
    }

    /// Fold one spin in
    pub fn record(&mut self, result: &SpinResult, trace: &SpinTrace, symbols: &SymbolTable) {
        self.spins += 1;
        self.total_wagered += result.total_bet;
        self.total_won += result.win_amount;
        if result.is_win {
            self.winning_spins += 1;
        }
        if result.is_jackpot {
            self.jackpot_spins += 1;
        }
        self.max_win = self.max_win.max(result.win_amount);

        for win in &result.winning_paylines {
            let Some(id) = symbols.id_of(&win.symbol) else {
                continue;
            };
            self.symbol_wins[id.index()] += 1;
            self.symbol_payouts[id.index()] += win.payout;
            if symbols.is_wild(id) {
                self.all_wild_line_wins += 1;
            }
        }

        for (reel, counts) in self.reel_appearances.iter_mut().enumerate() {
            for id in trace.grid.column(reel) {
                counts[id.index()] += 1;
            }
        }

        if let Some(reel) = trace.nerfed_reel {
            self.nerfed_reel_counts[reel] += 1;
        }
    }

    /// Combine with the stats of a later chunk
    pub fn merge(mut self, other: &SpinStats) -> Self {
        self.spins += other.spins;
        self.total_wagered += other.total_wagered;
        self.total_won += other.total_won;
        self.winning_spins += other.winning_spins;
        self.jackpot_spins += other.jackpot_spins;
        self.max_win = self.max_win.max(other.max_win);
        self.all_wild_line_wins += other.all_wild_line_wins;
        add_into(&mut self.symbol_wins, &other.symbol_wins);
        for (a, b) in self.symbol_payouts.iter_mut().zip(&other.symbol_payouts) {
            *a += b;
        }
        for (a, b) in self.reel_appearances.iter_mut().zip(&other.reel_appearances) {
            add_into(a, b);
        }
        add_into(&mut self.nerfed_reel_counts, &other.nerfed_reel_counts);
        self
    }

    /// Visible cells counted per reel
    pub fn cells_per_reel(&self, reel: usize) -> u64 {
        self.reel_appearances
            .get(reel)
            .map_or(0, |counts| counts.iter().sum())
    }

    /// Share of a reel's visible cells holding a symbol (0.0–1.0)
    pub fn appearance_rate(&self, reel: usize, symbol: usize) -> f64 {
        let cells = self.cells_per_reel(reel);
        if cells == 0 {
            return 0.0;
        }
        self.reel_appearances[reel][symbol] as f64 / cells as f64
    }

    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.total_won / self.total_wagered
        } else {
            0.0
        }
    }

    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            self.winning_spins as f64 / self.spins as f64
        } else {
            0.0
        }
    }
}

fn add_into(target: &mut [u64], source: &[u64]) {
    for (a, b) in target.iter_mut().zip(source) {
        *a += b;
    }
}
