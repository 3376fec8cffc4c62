//! Calibration consistency check between two symbol tables
//!
//! Two tables that describe the same machine should agree on every number. The report
//! lists each disagreement instead of picking a winner.

use serde::{Deserialize, Serialize};

use crate::config::SlotDefinition;
use crate::symbols::SymbolTier;

/// One disagreement between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationDrift {
    MissingSymbol {
        symbol: String,
        /// ID of the table that lacks it
        missing_from: String,
    },
    Multiplier {
        symbol: String,
        left: f64,
        right: f64,
    },
    Percentage {
        symbol: String,
        reel: usize,
        left: Option<f64>,
        right: Option<f64>,
    },
    Tier {
        symbol: String,
        left: SymbolTier,
        right: SymbolTier,
    },
    Wild {
        symbol: String,
        left: bool,
        right: bool,
    },
}

impl std::fmt::Display for CalibrationDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationDrift::MissingSymbol {
                symbol,
                missing_from,
            } => write!(f, "{symbol}: missing from '{missing_from}'"),
            CalibrationDrift::Multiplier {
                symbol,
                left,
                right,
            } => write!(f, "{symbol}: multiplier {left} vs {right}"),
            CalibrationDrift::Percentage {
                symbol,
                reel,
                left,
                right,
            } => write!(
                f,
                "{symbol}: reel {reel} percentage {} vs {}",
                fmt_opt(*left),
                fmt_opt(*right)
            ),
            CalibrationDrift::Tier {
                symbol,
                left,
                right,
            } => write!(f, "{symbol}: tier {} vs {}", left.as_str(), right.as_str()),
            CalibrationDrift::Wild {
                symbol,
                left,
                right,
            } => write!(f, "{symbol}: wild flag {left} vs {right}"),
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub left: String,
    pub right: String,
    pub drifts: Vec<CalibrationDrift>,
}

impl CalibrationReport {
    /// Diff two slot tables symbol by symbol. Left-table order comes first, then symbols
    /// only the right table has.
    pub fn compare(left: &SlotDefinition, right: &SlotDefinition) -> Self {
        let mut drifts = Vec::new();

        for (name, l) in &left.symbols {
            let Some(r) = right.symbols.get(name) else {
                drifts.push(CalibrationDrift::MissingSymbol {
                    symbol: name.clone(),
                    missing_from: right.id.clone(),
                });
                continue;
            };
            if l.multiplier != r.multiplier {
                drifts.push(CalibrationDrift::Multiplier {
                    symbol: name.clone(),
                    left: l.multiplier,
                    right: r.multiplier,
                });
            }
            if l.tier != r.tier {
                drifts.push(CalibrationDrift::Tier {
                    symbol: name.clone(),
                    left: l.tier,
                    right: r.tier,
                });
            }
            if l.is_wild != r.is_wild {
                drifts.push(CalibrationDrift::Wild {
                    symbol: name.clone(),
                    left: l.is_wild,
                    right: r.is_wild,
                });
            }
            let reels = l.percentages.len().max(r.percentages.len());
            for reel in 0..reels {
                let lp = l.percentages.get(reel).copied();
                let rp = r.percentages.get(reel).copied();
                if lp != rp {
                    drifts.push(CalibrationDrift::Percentage {
                        symbol: name.clone(),
                        reel,
                        left: lp,
                        right: rp,
                    });
                }
            }
        }

        for name in right.symbols.keys().filter(|n| !left.symbols.contains_key(*n)) {
            drifts.push(CalibrationDrift::MissingSymbol {
                symbol: name.clone(),
                missing_from: left.id.clone(),
            });
        }

        Self {
            left: left.id.clone(),
            right: right.id.clone(),
            drifts,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.drifts.is_empty()
    }

    /// Emit every drift as a warning
    pub fn log(&self) {
        if self.is_consistent() {
            log::info!("Calibration '{}' matches '{}'", self.left, self.right);
            return;
        }
        log::warn!(
            "Calibration drift between '{}' and '{}': {} differences",
            self.left,
            self.right,
            self.drifts.len()
        );
        for drift in &self.drifts {
            log::warn!("  {drift}");
        }
    }

    /// Drifts that touch one symbol
    pub fn for_symbol<'a>(
        &'a self,
        symbol: &'a str,
    ) -> impl Iterator<Item = &'a CalibrationDrift> + 'a {
        self.drifts.iter().filter(move |d| d.symbol() == symbol)
    }
}

impl CalibrationDrift {
    pub fn symbol(&self) -> &str {
        match self {
            CalibrationDrift::MissingSymbol { symbol, .. }
            | CalibrationDrift::Multiplier { symbol, .. }
            | CalibrationDrift::Percentage { symbol, .. }
            | CalibrationDrift::Tier { symbol, .. }
            | CalibrationDrift::Wild { symbol, .. } => symbol,
        }
    }
}
