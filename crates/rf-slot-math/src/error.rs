//! Error types for the slot math engine

use thiserror::Error;

/// Configuration-time failure.
///
/// Any of these is fatal at startup: a slot with a broken table must not serve spins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Symbol table is empty")]
    EmptySymbolTable,

    #[error("Too many symbols: {0}")]
    TooManySymbols(usize),

    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Symbol '{symbol}' has invalid multiplier {multiplier}")]
    InvalidMultiplier { symbol: String, multiplier: f64 },

    #[error("Symbol '{symbol}' has invalid percentage {value} on reel {reel}")]
    InvalidPercentage { symbol: String, reel: usize, value: f64 },

    #[error("Malformed or missing reel key '{0}'")]
    InvalidReelKey(String),

    #[error("Symbol '{symbol}' defines {found} reel percentages, expected {expected}")]
    ReelCountMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("Symbol table mixes weighted and unweighted symbols")]
    MixedWeighting,

    #[error("More than one wild symbol: {0:?}")]
    MultipleWilds(Vec<String>),

    #[error("No filler symbol available (no common-tier symbol)")]
    MissingFiller,

    #[error("Filler symbol '{0}' is not defined")]
    UnknownFiller(String),

    #[error("Filler symbol '{0}' cannot be wild")]
    WildFiller(String),

    #[error("Reel {reel} cannot be normalized to {target}: filler weight would be {weight}")]
    Unnormalizable { reel: usize, target: u32, weight: i64 },

    #[error("Wild nerf percentage {0} is invalid")]
    InvalidNerf(f64),

    #[error("Invalid grid: {rows} rows x {reels} reels")]
    InvalidGrid { rows: usize, reels: usize },

    #[error("Payline {line} has {found} positions, expected {expected}")]
    PaylineLength {
        line: u8,
        expected: usize,
        found: usize,
    },

    #[error("Payline {line} position ({row}, {col}) is outside the grid")]
    PaylineOutOfBounds { line: u8, row: usize, col: usize },

    #[error("Duplicate payline id: {0}")]
    DuplicatePayline(u8),

    #[error("No paylines configured")]
    NoPaylines,

    #[error("Invalid RTP band: {min}..{max}")]
    InvalidRtpBand { min: f64, max: f64 },

    #[error("Duplicate slot id: {0}")]
    DuplicateSlot(String),
}

/// Engine-facing error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    /// Caller-side precondition violation (bet, line set)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
