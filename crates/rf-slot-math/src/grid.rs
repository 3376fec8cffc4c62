//! Visible symbol grid and the samplers that fill it

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::strip::ReelStrip;
use crate::symbols::{SymbolId, SymbolTable};

/// Row-major `rows × cols` matrix of symbols produced by one spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<SymbolId>,
}

impl Grid {
    /// Build from row vectors. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> Result<Self, ConfigError> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        if row_count == 0 || cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return Err(ConfigError::InvalidGrid {
                rows: row_count,
                reels: cols,
            });
        }
        Ok(Self {
            rows: row_count,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build from symbol names, resolving each against the table
    pub fn from_names(symbols: &SymbolTable, rows: &[&[&str]]) -> Result<Self, ConfigError> {
        let resolved = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|name| {
                        symbols
                            .id_of(name)
                            .ok_or_else(|| ConfigError::UnknownSymbol((*name).to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(resolved)
    }

    /// Assemble a grid from reel columns (`columns[reel][row]`)
    fn from_columns(columns: &[Vec<SymbolId>], rows: usize) -> Self {
        let cols = columns.len();
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            cells.extend(columns.iter().map(|column| column[row]));
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Symbol at `(row, col)`, `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<SymbolId> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[SymbolId] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<SymbolId> {
        (0..self.rows).map(|row| self.cells[row * self.cols + col]).collect()
    }

    pub fn cells(&self) -> &[SymbolId] {
        &self.cells
    }

    /// Render as row-major symbol names
    pub fn to_names(&self, symbols: &SymbolTable) -> Vec<Vec<String>> {
        (0..self.rows)
            .map(|row| {
                self.row(row)
                    .iter()
                    .map(|&id| symbols.name(id).to_string())
                    .collect()
            })
            .collect()
    }
}

/// Sample a grid from one strip per reel.
///
/// Each reel gets an independent uniform stop; its visible column is the `rows`-long window
/// starting at that stop. Returns the grid and the stops.
pub fn sample_from_strips<R: Rng + ?Sized>(
    strips: &[ReelStrip],
    rows: usize,
    rng: &mut R,
) -> (Grid, Vec<usize>) {
    let stops: Vec<usize> = strips
        .iter()
        .map(|strip| rng.random_range(0..strip.len()))
        .collect();
    let columns: Vec<Vec<SymbolId>> = strips
        .iter()
        .zip(&stops)
        .map(|(strip, &stop)| strip.window(stop, rows))
        .collect();
    (Grid::from_columns(&columns, rows), stops)
}

/// Degraded mode for slots without reel distributions: every cell is drawn
/// independently and uniformly from the symbol table.
pub fn sample_uniform<R: Rng + ?Sized>(
    symbols: &SymbolTable,
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Grid {
    let count = symbols.len();
    let cells = (0..rows * cols)
        .map(|_| SymbolId(rng.random_range(0..count) as u16))
        .collect();
    Grid { rows, cols, cells }
}
