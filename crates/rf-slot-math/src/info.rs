//! Player-facing slot info and payout table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{SlotConfiguration, Volatility};
use crate::paytable::PaylineDefinition;
use crate::spin::round_currency;
use crate::symbols::SymbolTier;

/// Smallest accepted bet per line
pub const MIN_BET_PER_LINE: f64 = 0.01;

/// Payout table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub multiplier: f64,
    pub is_wild: bool,
    pub tier: SymbolTier,
    /// Average appearance chance across reels, in percent
    pub probability: f64,
    /// Appearance chance per reel, in percent
    pub reel_probabilities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub id: String,
    pub name: String,
    pub reels: u8,
    pub rows: u8,
    pub volatility: Volatility,
    pub rtp: f64,
    pub symbols: Vec<SymbolInfo>,
    pub paylines: Vec<PaylineDefinition>,
    /// Line count → active line IDs
    pub line_presets: BTreeMap<usize, Vec<u8>>,
    pub min_bet_per_line: f64,
    pub rules: Vec<String>,
}

impl SlotInfo {
    pub fn from_config(config: &SlotConfiguration) -> Self {
        let symbols = config.symbols();
        let reels = config.reels();

        let symbol_rows = symbols
            .iter()
            .map(|(id, def)| {
                let reel_probabilities: Vec<f64> = match config.distribution() {
                    Some(dist) => dist
                        .reels()
                        .iter()
                        .map(|r| round_currency(r.probability(id) * 100.0))
                        .collect(),
                    None => vec![round_currency(100.0 / symbols.len() as f64); reels],
                };
                let probability = match config.distribution() {
                    Some(dist) => round_currency(dist.average_probability(id) * 100.0),
                    None => round_currency(100.0 / symbols.len() as f64),
                };
                SymbolInfo {
                    name: def.name.clone(),
                    multiplier: def.multiplier,
                    is_wild: def.is_wild,
                    tier: def.tier,
                    probability,
                    reel_probabilities,
                }
            })
            .collect();

        let ids: Vec<u8> = config.paytable().ids().collect();
        let mut line_presets = BTreeMap::new();
        line_presets.insert(ids.len().min(4), ids.iter().copied().take(4).collect());
        line_presets.insert(ids.len(), ids.clone());

        let line_len = config.rows().min(reels);
        let mut rules = vec![format!("Match ALL {line_len} symbols on an active payline")];
        if let Some(wild) = symbols.wild_id() {
            rules.push(format!(
                "{} symbols substitute for any regular symbol",
                capitalize(symbols.name(wild))
            ));
        }
        rules.push("Total Bet = Bet Per Line × Number of Active Lines".to_string());

        Self {
            id: config.id().to_string(),
            name: config.name().to_string(),
            reels: config.grid().reels,
            rows: config.grid().rows,
            volatility: config.volatility(),
            rtp: config.target_rtp(),
            symbols: symbol_rows,
            paylines: config.paytable().paylines().to_vec(),
            line_presets,
            min_bet_per_line: MIN_BET_PER_LINE,
            rules,
        }
    }

    pub fn symbol(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.name == name)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
