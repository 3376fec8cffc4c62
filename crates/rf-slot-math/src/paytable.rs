//! Paylines and full-line win evaluation
//!
//! A line pays only when every one of its positions holds the same base symbol or the
//! wild. There is no partial credit for a matching prefix.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::spin::round_currency;
use crate::symbols::{SymbolId, SymbolTable};

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylineDefinition {
    /// Line ID as seen by players (1-based)
    pub id: u8,
    /// Ordered `(row, col)` coordinates
    pub positions: Vec<(usize, usize)>,
}

impl PaylineDefinition {
    pub fn new(id: u8, positions: Vec<(usize, usize)>) -> Self {
        Self { id, positions }
    }

    /// Full row, left to right
    pub fn horizontal(id: u8, row: usize, length: usize) -> Self {
        Self::new(id, (0..length).map(|col| (row, col)).collect())
    }

    /// Full column, top to bottom
    pub fn vertical(id: u8, col: usize, length: usize) -> Self {
        Self::new(id, (0..length).map(|row| (row, col)).collect())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The eight straight lines of a 4×4 window.
///
/// Lines 1–4 are rows 0–3, lines 5–8 are columns 0–3.
pub fn standard_4x4_paylines() -> Vec<PaylineDefinition> {
    let rows = (0..4).map(|row| PaylineDefinition::horizontal(row as u8 + 1, row, 4));
    let cols = (0..4).map(|col| PaylineDefinition::vertical(col as u8 + 5, col, 4));
    rows.chain(cols).collect()
}

/// A line that paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningPayline {
    pub line_number: u8,
    pub line_path: Vec<(usize, usize)>,
    /// Base symbol name
    pub symbol: String,
    pub match_count: u8,
    pub multiplier: f64,
    pub payout: f64,
}

/// Base symbol of a full-line match, or `None` if the line does not pay.
///
/// The base is the first non-wild symbol; a line made only of wilds pays as the wild.
pub fn full_line_base(symbols: &SymbolTable, line: &[SymbolId]) -> Option<SymbolId> {
    let first = *line.first()?;
    let base = line
        .iter()
        .copied()
        .find(|&id| !symbols.is_wild(id))
        .unwrap_or(first);

    line.iter()
        .all(|&id| id == base || symbols.is_wild(id))
        .then_some(base)
}

/// Validated payline set for one grid shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayTable {
    paylines: Vec<PaylineDefinition>,
}

impl PayTable {
    /// Validate lines against a `rows × cols` grid.
    ///
    /// Every line must have `min(rows, cols)` positions inside the grid, and IDs must be unique.
    pub fn new(
        paylines: Vec<PaylineDefinition>,
        rows: usize,
        cols: usize,
    ) -> Result<Self, ConfigError> {
        if paylines.is_empty() {
            return Err(ConfigError::NoPaylines);
        }
        let expected = rows.min(cols);

        for (i, line) in paylines.iter().enumerate() {
            if paylines[..i].iter().any(|l| l.id == line.id) {
                return Err(ConfigError::DuplicatePayline(line.id));
            }
            if line.len() != expected {
                return Err(ConfigError::PaylineLength {
                    line: line.id,
                    expected,
                    found: line.len(),
                });
            }
            if let Some(&(row, col)) = line.positions.iter().find(|(r, c)| *r >= rows || *c >= cols)
            {
                return Err(ConfigError::PaylineOutOfBounds {
                    line: line.id,
                    row,
                    col,
                });
            }
        }

        Ok(Self { paylines })
    }

    pub fn get(&self, id: u8) -> Option<&PaylineDefinition> {
        self.paylines.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.paylines.iter().map(|l| l.id)
    }

    pub fn paylines(&self) -> &[PaylineDefinition] {
        &self.paylines
    }

    pub fn len(&self) -> usize {
        self.paylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paylines.is_empty()
    }

    /// Evaluate a single line
    pub fn evaluate_line(
        &self,
        grid: &Grid,
        line: &PaylineDefinition,
        symbols: &SymbolTable,
        bet_per_line: f64,
    ) -> Option<WinningPayline> {
        let cells: Vec<SymbolId> = line
            .positions
            .iter()
            .map(|&(row, col)| grid.get(row, col))
            .collect::<Option<_>>()?;
        let base = full_line_base(symbols, &cells)?;
        let multiplier = symbols.multiplier(base);

        Some(WinningPayline {
            line_number: line.id,
            line_path: line.positions.clone(),
            symbol: symbols.name(base).to_string(),
            match_count: cells.len() as u8,
            multiplier,
            payout: round_currency(bet_per_line * multiplier),
        })
    }

    /// Evaluate every active line independently.
    ///
    /// Line IDs are validated by the caller; an unknown ID here is a programming error.
    pub fn evaluate(
        &self,
        grid: &Grid,
        active_lines: &[u8],
        symbols: &SymbolTable,
        bet_per_line: f64,
    ) -> Vec<WinningPayline> {
        active_lines
            .iter()
            .filter_map(|&id| {
                let line = self.get(id);
                debug_assert!(line.is_some(), "unvalidated payline id {id}");
                self.evaluate_line(grid, line?, symbols, bet_per_line)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SymbolDefinition, SymbolTier};

    fn symbols() -> SymbolTable {
        SymbolTable::new(vec![
            SymbolDefinition::regular("orange", 11.5, SymbolTier::Common),
            SymbolDefinition::regular("lemon", 24.0, SymbolTier::Common),
            SymbolDefinition::regular("cherry", 57.0, SymbolTier::Uncommon),
            SymbolDefinition::wild("wild", 200.0),
        ])
        .unwrap()
    }

    fn line(symbols: &SymbolTable, names: &[&str]) -> Vec<SymbolId> {
        names.iter().map(|n| symbols.id_of(n).unwrap()).collect()
    }

    #[test]
    fn test_standard_paylines() {
        let lines = standard_4x4_paylines();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0].positions, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(lines[3].id, 4);
        assert_eq!(lines[4].id, 5);
        assert_eq!(lines[4].positions, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(lines[7].positions, vec![(0, 3), (1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_full_line_base() {
        let s = symbols();
        let cherry = s.id_of("cherry").unwrap();
        let wild = s.id_of("wild").unwrap();

        assert_eq!(full_line_base(&s, &line(&s, &["cherry"; 4])), Some(cherry));
        assert_eq!(
            full_line_base(&s, &line(&s, &["wild", "cherry", "wild", "cherry"])),
            Some(cherry)
        );
        assert_eq!(full_line_base(&s, &line(&s, &["wild"; 4])), Some(wild));
        assert_eq!(
            full_line_base(&s, &line(&s, &["cherry", "cherry", "cherry", "lemon"])),
            None
        );
        // no partial credit for a wild-backed prefix
        assert_eq!(
            full_line_base(&s, &line(&s, &["wild", "wild", "wild", "lemon", "orange"])),
            None
        );
    }

    #[test]
    fn test_paytable_validation() {
        assert_eq!(
            PayTable::new(vec![], 4, 4).unwrap_err(),
            ConfigError::NoPaylines
        );

        let dup = vec![
            PaylineDefinition::horizontal(1, 0, 4),
            PaylineDefinition::horizontal(1, 1, 4),
        ];
        assert_eq!(
            PayTable::new(dup, 4, 4).unwrap_err(),
            ConfigError::DuplicatePayline(1)
        );

        let short = vec![PaylineDefinition::horizontal(1, 0, 3)];
        assert!(matches!(
            PayTable::new(short, 4, 4).unwrap_err(),
            ConfigError::PaylineLength { found: 3, .. }
        ));

        let outside = vec![PaylineDefinition::horizontal(1, 4, 4)];
        assert!(matches!(
            PayTable::new(outside, 4, 4).unwrap_err(),
            ConfigError::PaylineOutOfBounds { row: 4, .. }
        ));
    }

    #[test]
    fn test_straight_lines_fit_wide_grid() {
        // 4 rows × 5 reels keeps 4-position lines
        let table = PayTable::new(standard_4x4_paylines(), 4, 5).unwrap();
        assert_eq!(table.len(), 8);
        assert!(table.contains(8));
        assert!(!table.contains(9));
    }

    #[test]
    fn test_evaluate_only_active_lines() {
        let s = symbols();
        let table = PayTable::new(standard_4x4_paylines(), 4, 4).unwrap();
        let grid = Grid::from_names(
            &s,
            &[
                &["cherry", "cherry", "cherry", "cherry"],
                &["cherry", "lemon", "orange", "lemon"],
                &["cherry", "orange", "lemon", "orange"],
                &["wild", "lemon", "orange", "lemon"],
            ],
        )
        .unwrap();

        let wins = table.evaluate(&grid, &[1, 5], &s, 0.5);
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].line_number, 1);
        assert_eq!(wins[1].line_number, 5);
        assert!(wins.iter().all(|w| w.symbol == "cherry" && w.match_count == 4));
        assert_eq!(wins[0].payout, 28.5);

        let only_rows = table.evaluate(&grid, &[2, 3, 4], &s, 0.5);
        assert!(only_rows.is_empty());
    }
}
