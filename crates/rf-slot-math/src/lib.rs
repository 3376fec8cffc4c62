//! # rf-slot-math: Reel Slot Outcome Engine
//!
//! Turns a bet and a set of active paylines into a symbol grid, winning lines and totals.
//! Correctness is statistical: long-run RTP must land in a calibrated band while every
//! spin stays independent of the last.
//!
//! ## Features
//!
//! - **Weighted Reels**: per-reel percentages normalized to exactly 1000 stops
//! - **Physical Strips**: each spin shuffles fresh strips and reads a contiguous window
//! - **Wild Nerf**: one random reel per spin has its wild suppressed
//! - **Full-Line Paylines**: every position must match the base symbol or be wild
//! - **Uniform Fallback**: slots without reel data draw each cell uniformly
//! - **Analytics**: exact theoretical RTP and calibration drift reports
//!
//! ## Architecture
//!
//! ```text
//! SlotDefinition (JSON / YAML / preset)
//!     │  validate once
//!     v
//! SlotConfiguration ──── Arc ────> SlotEngine::spin(SpinRequest)
//!     │                                  │
//!     ├── SymbolTable                    ├── StripGenerator (nerf one reel, shuffle)
//!     ├── ReelDistribution               ├── sample_from_strips / sample_uniform
//!     └── PayTable                       ├── PayTable::evaluate (full-line rule)
//!                                        v
//!                                   SpinResult
//! ```

pub mod calibration;
pub mod catalog;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod grid;
pub mod info;
pub mod paytable;
pub mod rtp;
pub mod spin;
pub mod strip;
pub mod symbols;

pub use calibration::*;
pub use catalog::*;
pub use config::*;
pub use distribution::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use info::*;
pub use paytable::*;
pub use rtp::*;
pub use spin::*;
pub use strip::*;
pub use symbols::*;
