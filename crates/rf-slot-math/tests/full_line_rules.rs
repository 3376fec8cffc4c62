//! Full-line payline rules and spin totals
//!
//! Literal grid scenarios for the evaluator, plus properties checked over many
//! seeded spins of the classic machine.

use std::sync::Arc;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rf_slot_math::{
    ConfigError, Grid, JACKPOT_FACTOR, ReelDistribution, STRIP_LENGTH, SlotCatalog,
    SlotConfiguration, SlotDefinition, SlotEngine, SpinRequest, SpinResult, SymbolDefinition,
    SymbolId, SymbolTable, SymbolTier, full_line_base, round_currency,
};

const ALL_LINES: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

fn classic() -> SlotConfiguration {
    SlotConfiguration::classic().unwrap()
}

/// Row 0 is given; rows 1–3 are a Latin square of low symbols so no other line pays
fn grid_with_top_row(config: &SlotConfiguration, top: [&str; 4]) -> Grid {
    Grid::from_names(
        config.symbols(),
        &[
            &top,
            &["orange", "lemon", "cherry", "bar"],
            &["lemon", "cherry", "bar", "orange"],
            &["cherry", "bar", "orange", "lemon"],
        ],
    )
    .unwrap()
}

fn settle(config: &SlotConfiguration, grid: &Grid, bet: f64, lines: &[u8]) -> SpinResult {
    let wins = config
        .paytable()
        .evaluate(grid, lines, config.symbols(), bet);
    SpinResult::settle(grid, config.symbols(), bet, lines.len(), wins)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERAL SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_four_cherries_pay_on_top_row() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["cherry", "cherry", "cherry", "cherry"]);
    let result = settle(&config, &grid, 0.1, &[1]);

    assert_eq!(result.winning_paylines.len(), 1);
    let win = &result.winning_paylines[0];
    assert_eq!(win.line_number, 1);
    assert_eq!(win.symbol, "cherry");
    assert_eq!(win.match_count, 4);
    assert_eq!(win.multiplier, 57.0);
    assert_eq!(win.payout, round_currency(0.1 * 57.0));
    assert_eq!(win.line_path, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
}

#[test]
fn test_wilds_substitute_for_base_symbol() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["wild", "cherry", "wild", "cherry"]);
    let result = settle(&config, &grid, 0.1, &[1]);

    assert_eq!(result.winning_paylines.len(), 1);
    assert_eq!(result.winning_paylines[0].symbol, "cherry");
    assert_eq!(result.winning_paylines[0].multiplier, 57.0);
}

#[test]
fn test_single_mismatch_voids_line() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["cherry", "cherry", "cherry", "lemon"]);
    let result = settle(&config, &grid, 0.1, &[1]);

    assert!(result.winning_paylines.is_empty());
    assert_eq!(result.win_amount, 0.0);
    assert!(!result.is_win);
}

#[test]
fn test_all_wild_line_pays_as_wild() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["wild", "wild", "wild", "wild"]);
    let result = settle(&config, &grid, 0.1, &[1]);

    assert_eq!(result.winning_paylines.len(), 1);
    assert_eq!(result.winning_paylines[0].symbol, "wild");
    assert_eq!(result.winning_paylines[0].multiplier, 200.0);
    assert_eq!(result.win_amount, 20.0);
}

#[test]
fn test_diamond_line_is_jackpot() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["diamond", "diamond", "diamond", "diamond"]);
    let result = settle(&config, &grid, 0.05, &ALL_LINES);

    assert_eq!(result.winning_paylines.len(), 1);
    assert_eq!(result.total_bet, 0.4);
    assert_eq!(result.win_amount, 50.0);
    assert!(result.is_win);
    assert!(result.is_jackpot);
}

#[test]
fn test_inactive_winning_line_does_not_pay() {
    let config = classic();
    let grid = grid_with_top_row(&config, ["bar", "bar", "bar", "bar"]);
    let result = settle(&config, &grid, 1.0, &[2, 3, 4, 5, 6, 7, 8]);
    assert!(!result.is_win);
    assert_eq!(result.total_bet, 7.0);
}

#[test]
fn test_row_and_column_win_together() {
    let config = classic();
    let grid = Grid::from_names(
        config.symbols(),
        &[
            &["seven", "seven", "seven", "wild"],
            &["lemon", "cherry", "bar", "seven"],
            &["cherry", "bar", "orange", "seven"],
            &["bar", "orange", "lemon", "seven"],
        ],
    )
    .unwrap();
    let result = settle(&config, &grid, 0.02, &ALL_LINES);

    let lines: Vec<u8> = result.winning_paylines.iter().map(|w| w.line_number).collect();
    assert_eq!(lines, vec![1, 8]);
    assert!(result.winning_paylines.iter().all(|w| w.symbol == "seven"));
    assert_eq!(result.win_amount, 20.0);
    assert!(result.is_jackpot);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES OVER SEEDED SPINS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_winning_lines_obey_full_line_rule() {
    let engine = SlotEngine::new(Arc::new(classic()));
    let symbols = engine.config().symbols().clone();
    let mut rng = StdRng::seed_from_u64(0x5107);
    let mut wins_seen = 0;

    for i in 0..20_000 {
        let bet = [0.01, 0.05, 0.1, 0.25, 1.0][i % 5];
        let request = SpinRequest::new(bet, ALL_LINES.to_vec());
        let (result, trace) = engine.spin_traced(&request, &mut rng).unwrap();

        for win in &result.winning_paylines {
            wins_seen += 1;
            let base = symbols.id_of(&win.symbol).unwrap();
            for &(row, col) in &win.line_path {
                let cell = trace.grid.get(row, col).unwrap();
                assert!(cell == base || symbols.is_wild(cell));
            }
            assert_eq!(win.payout, round_currency(bet * symbols.multiplier(base)));
        }

        // every line the evaluator skipped really is broken
        for id in ALL_LINES {
            if result.winning_paylines.iter().any(|w| w.line_number == id) {
                continue;
            }
            let line = engine.config().paytable().get(id).unwrap();
            let cells: Vec<SymbolId> = line
                .positions
                .iter()
                .map(|&(r, c)| trace.grid.get(r, c).unwrap())
                .collect();
            assert!(full_line_base(&symbols, &cells).is_none());
        }

        assert_eq!(result.total_bet, round_currency(bet * 8.0));
        let sum: f64 = result.winning_paylines.iter().map(|w| w.payout).sum();
        assert_eq!(result.win_amount, round_currency(sum));
        assert_eq!(
            result.is_jackpot,
            result.win_amount >= JACKPOT_FACTOR * result.total_bet
        );
    }
    assert!(wins_seen > 100);
}

#[test]
fn test_breaking_one_position_never_wins() {
    let config = classic();
    let symbols = config.symbols();
    let regular: Vec<&str> = ["orange", "lemon", "cherry", "bar", "seven", "diamond"].into();

    for &base in &regular {
        for &breaker in regular.iter().filter(|&&s| s != base) {
            for pos in 0..4 {
                let mut top = [base; 4];
                top[pos] = breaker;
                let grid = grid_with_top_row(&config, top);
                let result = settle(&config, &grid, 1.0, &[1]);
                assert!(result.winning_paylines.is_empty(), "{top:?} paid");

                // wilds elsewhere on the line do not rescue it
                let mut wild_top = top;
                wild_top[(pos + 1) % 4] = "wild";
                let grid = grid_with_top_row(&config, wild_top);
                assert!(settle(&config, &grid, 1.0, &[1]).winning_paylines.is_empty());
            }
        }
    }
    assert!(symbols.wild_id().is_some());
}

#[test]
fn test_weight_invariant_for_random_tables() {
    let mut rng = StdRng::seed_from_u64(1000);
    let symbols = SymbolTable::new(vec![
        SymbolDefinition::regular("a", 2.0, SymbolTier::Common),
        SymbolDefinition::regular("b", 5.0, SymbolTier::Uncommon),
        SymbolDefinition::regular("c", 20.0, SymbolTier::Rare),
        SymbolDefinition::wild("w", 50.0),
    ])
    .unwrap();

    let mut built = 0;
    for _ in 0..500 {
        let pct: Vec<Vec<f64>> = (0..4)
            .map(|_| (0..5).map(|_| rng.random_range(0.0..40.0)).collect())
            .collect();
        match ReelDistribution::build(&symbols, &pct, SymbolId(0), 5) {
            Ok(dist) => {
                built += 1;
                for reel in dist.reels() {
                    assert_eq!(reel.total(), STRIP_LENGTH);
                }
            }
            Err(err) => assert!(matches!(err, ConfigError::Unnormalizable { .. })),
        }
    }
    assert!(built > 100);
}

#[test]
fn test_weight_invariant_for_presets() {
    let catalog = SlotCatalog::standard().unwrap();
    let harness =
        SlotConfiguration::from_definition(SlotDefinition::calibration_harness()).unwrap();
    let classic = catalog.get("classic").unwrap();

    for config in [classic.as_ref(), &harness] {
        let dist = config.distribution().unwrap();
        for reel in dist.reels() {
            assert_eq!(reel.total(), STRIP_LENGTH);
        }
        assert_relative_eq!(
            config.symbols().ids().map(|id| dist.reel(0).probability(id)).sum::<f64>(),
            1.0,
            epsilon = 1e-12
        );
    }
}
