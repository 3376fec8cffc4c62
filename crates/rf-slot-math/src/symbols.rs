//! Symbol definitions and the per-slot symbol table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Index of a symbol inside its [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u16);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Symbol tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SymbolTier {
    /// High-frequency, low-multiplier symbol
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    /// Support symbols such as the wild
    Special = 3,
    /// Rarest, highest-paying symbols
    Jackpot = 4,
}

impl SymbolTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolTier::Common => "common",
            SymbolTier::Uncommon => "uncommon",
            SymbolTier::Rare => "rare",
            SymbolTier::Special => "special",
            SymbolTier::Jackpot => "jackpot",
        }
    }
}

impl Default for SymbolTier {
    fn default() -> Self {
        SymbolTier::Common
    }
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// Symbol name (e.g. "cherry", "wild")
    pub name: String,
    /// Line pay as a multiple of the bet per line
    pub multiplier: f64,
    pub tier: SymbolTier,
    /// Substitutes for any symbol on a line
    pub is_wild: bool,
}

impl SymbolDefinition {
    /// Create a regular (non-wild) symbol
    pub fn regular(name: impl Into<String>, multiplier: f64, tier: SymbolTier) -> Self {
        Self {
            name: name.into(),
            multiplier,
            tier,
            is_wild: false,
        }
    }

    /// Create a wild symbol
    pub fn wild(name: impl Into<String>, multiplier: f64) -> Self {
        Self {
            name: name.into(),
            multiplier,
            tier: SymbolTier::Special,
            is_wild: true,
        }
    }
}

/// Immutable, validated set of symbols for one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTable {
    symbols: Vec<SymbolDefinition>,
    wild: Option<SymbolId>,
}

impl SymbolTable {
    /// Validate and index a list of symbols. Declaration order is kept.
    pub fn new(symbols: Vec<SymbolDefinition>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptySymbolTable);
        }
        if symbols.len() > u16::MAX as usize {
            return Err(ConfigError::TooManySymbols(symbols.len()));
        }

        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].iter().any(|s| s.name == symbol.name) {
                return Err(ConfigError::DuplicateSymbol(symbol.name.clone()));
            }
            if !symbol.multiplier.is_finite() || symbol.multiplier <= 0.0 {
                return Err(ConfigError::InvalidMultiplier {
                    symbol: symbol.name.clone(),
                    multiplier: symbol.multiplier,
                });
            }
        }

        let wilds: Vec<&SymbolDefinition> = symbols.iter().filter(|s| s.is_wild).collect();
        if wilds.len() > 1 {
            return Err(ConfigError::MultipleWilds(
                wilds.iter().map(|s| s.name.clone()).collect(),
            ));
        }
        let wild = symbols
            .iter()
            .position(|s| s.is_wild)
            .map(|i| SymbolId(i as u16));

        Ok(Self { symbols, wild })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDefinition> {
        self.symbols.get(id.index())
    }

    /// Look up a symbol ID by name
    pub fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s.name == name)
            .map(|i| SymbolId(i as u16))
    }

    /// Symbol name; IDs always come from this table so the lookup cannot miss
    pub fn name(&self, id: SymbolId) -> &str {
        self.symbols[id.index()].name.as_str()
    }

    pub fn multiplier(&self, id: SymbolId) -> f64 {
        self.symbols[id.index()].multiplier
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.wild == Some(id)
    }

    /// Get wild symbol ID
    pub fn wild_id(&self) -> Option<SymbolId> {
        self.wild
    }

    /// All IDs in declaration order
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbols.len()).map(|i| SymbolId(i as u16))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolDefinition)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u16), s))
    }

    /// IDs of all symbols in a tier
    pub fn ids_in_tier(&self, tier: SymbolTier) -> Vec<SymbolId> {
        self.iter()
            .filter(|(_, s)| s.tier == tier)
            .map(|(id, _)| id)
            .collect()
    }
}
