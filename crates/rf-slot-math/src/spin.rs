//! Spin result and outcome totals

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::paytable::WinningPayline;
use crate::symbols::SymbolTable;

/// A spin is a jackpot when it returns at least this many times the total bet
pub const JACKPOT_FACTOR: f64 = 20.0;

/// Round to whole cents
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Complete result of one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Visible grid, row-major symbol names
    pub grid: Vec<Vec<String>>,
    pub total_bet: f64,
    pub win_amount: f64,
    pub is_win: bool,
    pub winning_paylines: Vec<WinningPayline>,
    pub is_jackpot: bool,
}

impl SpinResult {
    /// Compute totals for an evaluated grid
    pub fn settle(
        grid: &Grid,
        symbols: &SymbolTable,
        bet_per_line: f64,
        line_count: usize,
        winning_paylines: Vec<WinningPayline>,
    ) -> Self {
        let total_bet = round_currency(bet_per_line * line_count as f64);
        let win_amount = round_currency(winning_paylines.iter().map(|w| w.payout).sum());

        Self {
            grid: grid.to_names(symbols),
            total_bet,
            win_amount,
            is_win: win_amount > 0.0,
            winning_paylines,
            is_jackpot: win_amount >= JACKPOT_FACTOR * total_bet,
        }
    }

    /// Win-to-bet ratio
    pub fn win_ratio(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.win_amount / self.total_bet
        } else {
            0.0
        }
    }
}

/// Internal sampling data for one spin.
///
/// Kept out of [`SpinResult`] so the nerfed reel never reaches a player-facing payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinTrace {
    pub nerfed_reel: Option<usize>,
    /// Stop per reel; `None` for uniform-fallback slots
    pub stops: Option<Vec<usize>>,
    pub grid: Grid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SymbolDefinition, SymbolTier};

    fn win(payout: f64) -> WinningPayline {
        WinningPayline {
            line_number: 1,
            line_path: vec![(0, 0), (0, 1), (0, 2), (0, 3)],
            symbol: "diamond".into(),
            match_count: 4,
            multiplier: 1000.0,
            payout,
        }
    }

    fn setup() -> (SymbolTable, Grid) {
        let symbols = SymbolTable::new(vec![SymbolDefinition::regular(
            "diamond",
            1000.0,
            SymbolTier::Jackpot,
        )])
        .unwrap();
        let row: &[&str] = &["diamond"; 4];
        let grid = Grid::from_names(&symbols, &[row, row, row, row]).unwrap();
        (symbols, grid)
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(0.05 * 1000.0), 50.0);
        assert_eq!(round_currency(0.05 * 8.0), 0.4);
        assert_eq!(round_currency(0.05 * 11.5), 0.58);
        assert_eq!(round_currency(0.1 * 3.0), 0.3);
    }

    #[test]
    fn test_settle_jackpot_threshold() {
        let (symbols, grid) = setup();
        let result = SpinResult::settle(&grid, &symbols, 0.05, 8, vec![win(50.0)]);
        assert_eq!(result.total_bet, 0.4);
        assert_eq!(result.win_amount, 50.0);
        assert!(result.is_win);
        assert!(result.is_jackpot);
        assert_eq!(result.grid[0], vec!["diamond"; 4]);
    }

    #[test]
    fn test_settle_exact_threshold_is_jackpot() {
        let (symbols, grid) = setup();
        let result = SpinResult::settle(&grid, &symbols, 1.0, 2, vec![win(40.0)]);
        assert!(result.is_jackpot);
        let result = SpinResult::settle(&grid, &symbols, 1.0, 2, vec![win(39.99)]);
        assert!(!result.is_jackpot);
    }

    #[test]
    fn test_settle_loss() {
        let (symbols, grid) = setup();
        let result = SpinResult::settle(&grid, &symbols, 0.25, 4, vec![]);
        assert_eq!(result.total_bet, 1.0);
        assert_eq!(result.win_amount, 0.0);
        assert!(!result.is_win);
        assert!(!result.is_jackpot);
        assert_eq!(result.win_ratio(), 0.0);
    }

    #[test]
    fn test_trace_not_in_serialized_result() {
        let (symbols, grid) = setup();
        let result = SpinResult::settle(&grid, &symbols, 0.05, 8, vec![]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("nerf"));
        assert!(!json.contains("stops"));
    }
}
