//! Slot configuration: input documents, presets, and the validated runtime form
//!
//! A [`SlotDefinition`] is what gets written in JSON/YAML. [`SlotConfiguration::from_definition`]
//! validates it once into an immutable value that every spin reads by reference.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::distribution::{ReelDistribution, default_filler, percentage_to_weight};
use crate::error::ConfigError;
use crate::paytable::{PayTable, PaylineDefinition, standard_4x4_paylines};
use crate::strip::WildNerf;
use crate::symbols::{SymbolDefinition, SymbolId, SymbolTable, SymbolTier};

const REEL_KEY_PREFIX: &str = "percentage_reel_";

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Primary 4×4 layout
    pub fn standard_4x4() -> Self {
        Self { reels: 4, rows: 4 }
    }

    /// 5 reels × 4 rows
    pub fn standard_5x4() -> Self {
        Self { reels: 5, rows: 4 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_4x4()
    }
}

/// Advertised volatility class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

impl Volatility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Volatility::Low => "low",
            Volatility::Medium => "medium",
            Volatility::High => "high",
        }
    }
}

/// Acceptable long-run RTP range (fractions, e.g. 0.94..=0.97)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtpBand {
    pub min: f64,
    pub max: f64,
}

impl RtpBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rtp: f64) -> bool {
        rtp >= self.min && rtp <= self.max
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.min > 0.0
            && self.min <= self.max;
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidRtpBand {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Wild suppression on one random reel per spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WildNerfConfig {
    /// Wild percentage (0–100) on the nerfed reel
    pub percentage: f64,
}

impl Default for WildNerfConfig {
    fn default() -> Self {
        Self { percentage: 0.1 }
    }
}

/// One symbol record of the input table.
///
/// On the wire the per-reel percentages are flat `percentage_reel_N` keys; records with no
/// such keys describe a symbol of a uniform-fallback slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSymbolEntry", into = "RawSymbolEntry")]
pub struct SymbolConfigEntry {
    pub multiplier: f64,
    pub tier: SymbolTier,
    pub is_wild: bool,
    /// Percentage (0–100) per reel, in reel order
    pub percentages: Vec<f64>,
}

impl SymbolConfigEntry {
    pub fn weighted(multiplier: f64, tier: SymbolTier, percentages: &[f64]) -> Self {
        Self {
            multiplier,
            tier,
            is_wild: false,
            percentages: percentages.to_vec(),
        }
    }

    pub fn unweighted(multiplier: f64, tier: SymbolTier) -> Self {
        Self {
            multiplier,
            tier,
            is_wild: false,
            percentages: Vec::new(),
        }
    }

    /// Mark as the wild symbol
    pub fn as_wild(mut self) -> Self {
        self.is_wild = true;
        self
    }

    pub fn is_weighted(&self) -> bool {
        !self.percentages.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct RawSymbolEntry {
    multiplier: f64,
    #[serde(default)]
    tier: SymbolTier,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_wild: bool,
    #[serde(flatten)]
    reels: IndexMap<String, f64>,
}

impl TryFrom<RawSymbolEntry> for SymbolConfigEntry {
    type Error = ConfigError;

    fn try_from(raw: RawSymbolEntry) -> Result<Self, Self::Error> {
        let mut indexed = Vec::with_capacity(raw.reels.len());
        for (key, value) in raw.reels {
            let reel = key
                .strip_prefix(REEL_KEY_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ConfigError::InvalidReelKey(key.clone()))?;
            indexed.push((reel, value));
        }
        indexed.sort_by_key(|&(reel, _)| reel);

        // keys must be exactly percentage_reel_0..N-1
        if let Some(gap) = indexed.iter().enumerate().position(|(i, &(reel, _))| i != reel) {
            return Err(ConfigError::InvalidReelKey(format!("{REEL_KEY_PREFIX}{gap}")));
        }

        Ok(Self {
            multiplier: raw.multiplier,
            tier: raw.tier,
            is_wild: raw.is_wild,
            percentages: indexed.into_iter().map(|(_, v)| v).collect(),
        })
    }
}

impl From<SymbolConfigEntry> for RawSymbolEntry {
    fn from(entry: SymbolConfigEntry) -> Self {
        Self {
            multiplier: entry.multiplier,
            tier: entry.tier,
            is_wild: entry.is_wild,
            reels: entry
                .percentages
                .into_iter()
                .enumerate()
                .map(|(reel, v)| (format!("{REEL_KEY_PREFIX}{reel}"), v))
                .collect(),
        }
    }
}

/// Symbol table in declaration order
pub type SymbolConfigTable = IndexMap<String, SymbolConfigEntry>;

/// Input document for one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub volatility: Volatility,
    /// Advertised RTP in percent
    pub target_rtp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtp_band: Option<RtpBand>,
    #[serde(default)]
    pub grid: GridSpec,
    pub symbols: SymbolConfigTable,
    /// Symbol absorbing normalization drift; defaults to the most frequent common symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wild_nerf: Option<WildNerfConfig>,
    #[serde(default = "standard_4x4_paylines")]
    pub paylines: Vec<PaylineDefinition>,
}

impl SlotDefinition {
    /// Primary 4×4 production table
    pub fn classic() -> Self {
        use SymbolTier::*;
        let symbols: SymbolConfigTable = [
            ("orange", SymbolConfigEntry::weighted(11.5, Common, &[35.0, 38.0, 41.0, 44.0])),
            ("lemon", SymbolConfigEntry::weighted(24.0, Common, &[28.0, 26.0, 24.0, 22.0])),
            ("cherry", SymbolConfigEntry::weighted(57.0, Uncommon, &[18.0, 16.0, 14.0, 12.0])),
            ("bar", SymbolConfigEntry::weighted(140.0, Rare, &[10.0, 9.0, 8.0, 7.0])),
            ("wild", SymbolConfigEntry::weighted(200.0, Special, &[3.0, 3.0, 3.0, 3.0]).as_wild()),
            ("seven", SymbolConfigEntry::weighted(500.0, Jackpot, &[1.2, 0.9, 0.6, 0.4])),
            ("diamond", SymbolConfigEntry::weighted(1000.0, Jackpot, &[0.8, 0.6, 0.4, 0.2])),
        ]
        .into_iter()
        .map(|(name, entry)| (name.to_string(), entry))
        .collect();

        Self {
            id: "classic".into(),
            name: "Classic Fruits Deluxe".into(),
            volatility: Volatility::Medium,
            target_rtp: 95.5,
            rtp_band: Some(RtpBand::new(0.94, 0.97)),
            grid: GridSpec::standard_4x4(),
            symbols,
            filler: Some("orange".into()),
            wild_nerf: Some(WildNerfConfig::default()),
            paylines: standard_4x4_paylines(),
        }
    }

    /// Separately calibrated table used by the statistical verification harness.
    ///
    /// Shares the classic symbol set but not its numbers; see
    /// [`CalibrationReport`](crate::calibration::CalibrationReport).
    pub fn calibration_harness() -> Self {
        use SymbolTier::*;
        let symbols: SymbolConfigTable = [
            ("orange", SymbolConfigEntry::weighted(8.0, Common, &[18.0, 20.0, 22.0, 24.0])),
            ("lemon", SymbolConfigEntry::weighted(18.0, Common, &[20.0, 19.0, 18.0, 17.0])),
            ("cherry", SymbolConfigEntry::weighted(32.0, Uncommon, &[16.0, 15.5, 15.0, 14.5])),
            ("bar", SymbolConfigEntry::weighted(100.0, Rare, &[14.0, 13.5, 13.0, 12.5])),
            ("wild", SymbolConfigEntry::weighted(140.0, Special, &[8.0, 8.0, 8.0, 8.0]).as_wild()),
            ("diamond", SymbolConfigEntry::weighted(260.0, Jackpot, &[12.0, 11.5, 11.0, 10.5])),
            ("seven", SymbolConfigEntry::weighted(300.0, Jackpot, &[12.0, 11.5, 11.0, 10.5])),
        ]
        .into_iter()
        .map(|(name, entry)| (name.to_string(), entry))
        .collect();

        Self {
            id: "calibration_harness".into(),
            name: "Classic Fruits (harness calibration)".into(),
            volatility: Volatility::Medium,
            target_rtp: 95.0,
            rtp_band: Some(RtpBand::new(0.94, 0.97)),
            grid: GridSpec::standard_4x4(),
            symbols,
            filler: Some("orange".into()),
            wild_nerf: Some(WildNerfConfig::default()),
            paylines: standard_4x4_paylines(),
        }
    }

    /// Parse from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Read a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yml::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// True when every symbol carries reel percentages
    pub fn is_weighted(&self) -> bool {
        !self.symbols.is_empty() && self.symbols.values().all(SymbolConfigEntry::is_weighted)
    }
}

/// Validated, immutable configuration for one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotConfiguration {
    id: String,
    name: String,
    volatility: Volatility,
    target_rtp: f64,
    rtp_band: Option<RtpBand>,
    grid: GridSpec,
    symbols: SymbolTable,
    /// `None` means uniform-fallback sampling
    distribution: Option<ReelDistribution>,
    nerf: Option<WildNerf>,
    paytable: PayTable,
    #[serde(skip)]
    definition: SlotDefinition,
}

impl SlotConfiguration {
    /// Validate a definition. Any error here means the slot must not serve spins.
    pub fn from_definition(definition: SlotDefinition) -> Result<Self, ConfigError> {
        let grid = definition.grid;
        if grid.reels == 0 || grid.rows == 0 {
            return Err(ConfigError::InvalidGrid {
                rows: grid.rows as usize,
                reels: grid.reels as usize,
            });
        }
        if let Some(band) = &definition.rtp_band {
            band.validate()?;
        }

        let symbols = SymbolTable::new(
            definition
                .symbols
                .iter()
                .map(|(name, entry)| SymbolDefinition {
                    name: name.clone(),
                    multiplier: entry.multiplier,
                    tier: entry.tier,
                    is_wild: entry.is_wild,
                })
                .collect(),
        )?;

        let weighted = definition.symbols.values().filter(|e| e.is_weighted()).count();
        let (distribution, nerf) = if weighted == 0 {
            if definition.wild_nerf.is_some() {
                log::debug!("slot '{}': wild nerf ignored for uniform sampling", definition.id);
            }
            (None, None)
        } else if weighted == symbols.len() {
            let distribution = build_distribution(&definition, &symbols)?;
            let nerf = build_nerf(&definition, &symbols, &distribution)?;
            (Some(distribution), nerf)
        } else {
            return Err(ConfigError::MixedWeighting);
        };

        let paytable = PayTable::new(
            definition.paylines.clone(),
            grid.rows as usize,
            grid.reels as usize,
        )?;

        log::info!(
            "Loaded slot '{}' ({}): {} symbols, {}x{} grid, {} paylines, {} sampling",
            definition.id,
            definition.name,
            symbols.len(),
            grid.reels,
            grid.rows,
            paytable.len(),
            if distribution.is_some() { "weighted" } else { "uniform" }
        );

        Ok(Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            volatility: definition.volatility,
            target_rtp: definition.target_rtp,
            rtp_band: definition.rtp_band,
            grid,
            symbols,
            distribution,
            nerf,
            paytable,
            definition,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_definition(SlotDefinition::from_json_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_definition(SlotDefinition::from_yaml_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_definition(SlotDefinition::load(path)?)
    }

    /// Validated classic preset
    pub fn classic() -> Result<Self, ConfigError> {
        Self::from_definition(SlotDefinition::classic())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    pub fn target_rtp(&self) -> f64 {
        self.target_rtp
    }

    pub fn rtp_band(&self) -> Option<RtpBand> {
        self.rtp_band
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows as usize
    }

    pub fn reels(&self) -> usize {
        self.grid.reels as usize
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn distribution(&self) -> Option<&ReelDistribution> {
        self.distribution.as_ref()
    }

    pub fn nerf(&self) -> Option<WildNerf> {
        self.nerf
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    /// True when spins sample weighted reel strips
    pub fn is_weighted(&self) -> bool {
        self.distribution.is_some()
    }

    /// The document this configuration was validated from
    pub fn definition(&self) -> &SlotDefinition {
        &self.definition
    }
}

fn build_distribution(
    definition: &SlotDefinition,
    symbols: &SymbolTable,
) -> Result<ReelDistribution, ConfigError> {
    let reels = definition.grid.reels as usize;
    for (name, entry) in &definition.symbols {
        if entry.percentages.len() != reels {
            return Err(ConfigError::ReelCountMismatch {
                symbol: name.clone(),
                expected: reels,
                found: entry.percentages.len(),
            });
        }
    }
    let percentages: Vec<Vec<f64>> = definition
        .symbols
        .values()
        .map(|e| e.percentages.clone())
        .collect();

    let filler = match &definition.filler {
        Some(name) => {
            let id = symbols
                .id_of(name)
                .ok_or_else(|| ConfigError::UnknownFiller(name.clone()))?;
            if symbols.is_wild(id) {
                return Err(ConfigError::WildFiller(name.clone()));
            }
            id
        }
        None => default_filler(symbols, &percentages)?,
    };

    ReelDistribution::build(symbols, &percentages, filler, reels)
}

fn build_nerf(
    definition: &SlotDefinition,
    symbols: &SymbolTable,
    distribution: &ReelDistribution,
) -> Result<Option<WildNerf>, ConfigError> {
    let (Some(config), Some(wild)) = (definition.wild_nerf, symbols.wild_id()) else {
        return Ok(None);
    };
    if !config.percentage.is_finite() || config.percentage < 0.0 {
        return Err(ConfigError::InvalidNerf(config.percentage));
    }
    let weight = percentage_to_weight(config.percentage) as u32;

    // a nerf that cannot lower the wild on any reel is a misconfiguration
    if distribution.reels().iter().all(|r| r.weight(wild) <= weight) {
        return Err(ConfigError::InvalidNerf(config.percentage));
    }
    Ok(Some(WildNerf { wild, weight }))
}

/// Resolve a symbol name against a validated configuration
pub fn symbol_id(config: &SlotConfiguration, name: &str) -> Result<SymbolId, ConfigError> {
    config
        .symbols()
        .id_of(name)
        .ok_or_else(|| ConfigError::UnknownSymbol(name.to_string()))
}
