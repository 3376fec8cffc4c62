//! Catalog of playable slots
//!
//! Besides the weighted classic machine, the standard catalog carries 5×4 themed slots
//! without reel data. Those spin in uniform-fallback mode.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{GridSpec, SlotConfiguration, SlotDefinition, SymbolConfigEntry, Volatility};
use crate::engine::SlotEngine;
use crate::error::{ConfigError, SlotError, SlotResult};
use crate::paytable::standard_4x4_paylines;
use crate::symbols::SymbolTier;

/// Summary row for slot listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSummary {
    pub id: String,
    pub name: String,
    pub reels: u8,
    pub rows: u8,
    pub max_paylines: usize,
    pub volatility: Volatility,
    /// Advertised RTP in percent
    pub rtp: f64,
}

/// Validated slots by ID, in insertion order
#[derive(Debug, Clone, Default)]
pub struct SlotCatalog {
    slots: IndexMap<String, Arc<SlotConfiguration>>,
}

impl SlotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classic plus the five themed uniform slots
    pub fn standard() -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for definition in [
            SlotDefinition::classic(),
            book_of_pharaohs(),
            diamond_empire(),
            cyber_reels(),
            viking_storm(),
            asian_fortune(),
        ] {
            catalog.insert(SlotConfiguration::from_definition(definition)?)?;
        }
        log::info!("Slot catalog ready: {} slots", catalog.len());
        Ok(catalog)
    }

    pub fn insert(&mut self, config: SlotConfiguration) -> Result<(), ConfigError> {
        if self.slots.contains_key(config.id()) {
            return Err(ConfigError::DuplicateSlot(config.id().to_string()));
        }
        self.slots.insert(config.id().to_string(), Arc::new(config));
        Ok(())
    }

    pub fn get(&self, id: &str) -> SlotResult<Arc<SlotConfiguration>> {
        self.slots
            .get(id)
            .cloned()
            .ok_or_else(|| SlotError::UnknownSlot(id.to_string()))
    }

    /// Engine bound to one slot
    pub fn engine(&self, id: &str) -> SlotResult<SlotEngine> {
        self.get(id).map(SlotEngine::new)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.keys().map(String::as_str)
    }

    pub fn summaries(&self) -> Vec<SlotSummary> {
        self.slots
            .values()
            .map(|config| SlotSummary {
                id: config.id().to_string(),
                name: config.name().to_string(),
                reels: config.grid().reels,
                rows: config.grid().rows,
                max_paylines: config.paytable().len(),
                volatility: config.volatility(),
                rtp: config.target_rtp(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Themed 5×4 slot without reel data: regular symbols plus one wild
fn themed_slot(
    id: &str,
    name: &str,
    volatility: Volatility,
    target_rtp: f64,
    regular: &[(&str, f64, SymbolTier)],
    wild: (&str, f64),
) -> SlotDefinition {
    let mut symbols: IndexMap<String, SymbolConfigEntry> = regular
        .iter()
        .map(|&(name, mult, tier)| (name.to_string(), SymbolConfigEntry::unweighted(mult, tier)))
        .collect();
    symbols.insert(
        wild.0.to_string(),
        SymbolConfigEntry::unweighted(wild.1, SymbolTier::Special).as_wild(),
    );

    SlotDefinition {
        id: id.into(),
        name: name.into(),
        volatility,
        target_rtp,
        rtp_band: None,
        grid: GridSpec::standard_5x4(),
        symbols,
        filler: None,
        wild_nerf: None,
        paylines: standard_4x4_paylines(),
    }
}

/// Five regular symbols at 2/3/5/10/25×
fn five_tier(names: [&str; 5]) -> [(&str, f64, SymbolTier); 5] {
    use SymbolTier::*;
    [
        (names[0], 2.0, Common),
        (names[1], 3.0, Common),
        (names[2], 5.0, Uncommon),
        (names[3], 10.0, Rare),
        (names[4], 25.0, Jackpot),
    ]
}

pub fn book_of_pharaohs() -> SlotDefinition {
    themed_slot(
        "book",
        "Book of Pharaohs",
        Volatility::High,
        96.2,
        &five_tier(["ankh", "scarab", "eye", "anubis", "pharaoh"]),
        ("book", 100.0),
    )
}

pub fn diamond_empire() -> SlotDefinition {
    use SymbolTier::*;
    themed_slot(
        "diamond",
        "Diamond Empire",
        Volatility::High,
        95.8,
        &[
            ("ruby", 2.0, Common),
            ("emerald", 3.0, Common),
            ("sapphire", 5.0, Uncommon),
            ("amethyst", 8.0, Uncommon),
            ("diamond", 20.0, Rare),
            ("crown", 50.0, Jackpot),
        ],
        ("wild_diamond", 100.0),
    )
}

pub fn cyber_reels() -> SlotDefinition {
    themed_slot(
        "cyber",
        "Cyber Reels",
        Volatility::Medium,
        95.5,
        &five_tier(["chip", "circuit", "robot", "ai", "cyber"]),
        ("matrix", 50.0),
    )
}

pub fn viking_storm() -> SlotDefinition {
    themed_slot(
        "viking",
        "Viking Storm",
        Volatility::High,
        96.0,
        &five_tier(["axe", "shield", "helmet", "ship", "thor"]),
        ("odin", 50.0),
    )
}

pub fn asian_fortune() -> SlotDefinition {
    themed_slot(
        "fortune",
        "Asian Fortune",
        Volatility::Medium,
        95.6,
        &five_tier(["fan", "lantern", "koi", "dragon", "lucky"]),
        ("wild", 50.0),
    )
}
