//! # rf-slot-sim: Statistical Verification Harness
//!
//! Runs large batches of spins through `rf-slot-math` and checks that the long-run
//! numbers match the calibration: RTP inside its band, nerf spread evenly over reels,
//! symbol appearance converging to the configured weights.
//!
//! ## Architecture
//!
//! ```text
//! SimulationConfig ──> Simulator::run()
//!                          │
//!                          ├── chunk 0: ChaCha8Rng(seed, stream 0) ─> SpinStats
//!                          ├── chunk 1: ChaCha8Rng(seed, stream 1) ─> SpinStats
//!                          └── ...            (rayon thread pool)
//!                                   │ merge in chunk order
//!                                   v
//!                          SimulationReport (text / JSON)
//! ```
//!
//! A run is reproducible for a fixed seed regardless of the thread count.

pub mod report;
pub mod stats;

pub use report::*;
pub use stats::*;

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rf_slot_math::{
    CalibrationReport, SlotConfiguration, SlotDefinition, SlotError, SpinRequest,
    compute_spin_traced, theoretical_rtp_for_bet,
};

/// Simulation error type
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Slot error: {0}")]
    Slot(#[from] SlotError),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Simulation result type
pub type SimResult<T> = Result<T, SimError>;

/// Batch parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub spins: u64,
    pub bet_per_line: f64,
    pub active_lines: Vec<u8>,
    pub seed: u64,
    /// Worker threads (0 = one per CPU)
    pub threads: usize,
    /// Spins per work chunk; each chunk owns one generator stream
    pub chunk_size: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spins: 1_000_000,
            bet_per_line: 0.05,
            active_lines: vec![1, 2, 3, 4, 5, 6, 7, 8],
            seed: 0x5EED,
            threads: 0,
            chunk_size: 10_000,
        }
    }
}

impl SimulationConfig {
    pub fn with_spins(mut self, spins: u64) -> Self {
        self.spins = spins;
        self
    }

    pub fn with_bet_per_line(mut self, bet: f64) -> Self {
        self.bet_per_line = bet;
        self
    }

    pub fn with_lines(mut self, lines: Vec<u8>) -> Self {
        self.active_lines = lines;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Parallel batch simulator for one slot
pub struct Simulator {
    slot: Arc<SlotConfiguration>,
    config: SimulationConfig,
    reference: Option<SlotDefinition>,
}

impl Simulator {
    pub fn new(slot: Arc<SlotConfiguration>, config: SimulationConfig) -> Self {
        Self {
            slot,
            config,
            reference: None,
        }
    }

    /// Table to diff the simulated slot against in the report
    pub fn with_reference(mut self, reference: SlotDefinition) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every spin and aggregate
    pub fn run(&self) -> SimResult<SimulationReport> {
        let stats = self.run_stats()?;

        let calibration = self.reference.as_ref().map(|reference| {
            let report = CalibrationReport::compare(self.slot.definition(), reference);
            report.log();
            report
        });

        let report = SimulationReport::build(
            &self.slot,
            &stats,
            self.config.bet_per_line,
            &self.config.active_lines,
            self.config.seed,
            theoretical_rtp_for_bet(
                &self.slot,
                &self.config.active_lines,
                self.config.bet_per_line,
            ),
            calibration,
        );
        log::info!(
            "Simulated {} spins of '{}': RTP {:.2}% (theoretical {:.2}%)",
            report.spins,
            report.slot_id,
            report.rtp,
            report.theoretical_rtp
        );
        Ok(report)
    }

    /// Run every spin and return the raw merged statistics
    pub fn run_stats(&self) -> SimResult<SpinStats> {
        self.validate()?;

        let chunk_size = self.config.chunk_size;
        let chunks = self.config.spins.div_ceil(chunk_size);
        let threads = self.config.thread_count();
        log::info!(
            "Simulating {} spins of '{}' in {} chunks on {} threads (seed {})",
            self.config.spins,
            self.slot.id(),
            chunks,
            threads,
            self.config.seed
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let per_chunk: Vec<SpinStats> = pool.install(|| {
            (0..chunks)
                .into_par_iter()
                .map(|chunk| {
                    let start = chunk * chunk_size;
                    let count = chunk_size.min(self.config.spins - start);
                    self.run_chunk(chunk, count)
                })
                .collect()
        });

        let symbols = self.slot.symbols().len();
        let reels = self.slot.reels();
        Ok(per_chunk
            .iter()
            .fold(SpinStats::new(symbols, reels), |acc, chunk| acc.merge(chunk)))
    }

    fn run_chunk(&self, chunk: u64, count: u64) -> SpinStats {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(chunk);

        let symbols = self.slot.symbols();
        let mut stats = SpinStats::new(symbols.len(), self.slot.reels());
        for _ in 0..count {
            let (result, trace) = compute_spin_traced(
                self.config.bet_per_line,
                &self.config.active_lines,
                &self.slot,
                &mut rng,
            );
            stats.record(&result, &trace, symbols);
        }
        log::debug!("chunk {chunk}: {count} spins, RTP {:.4}", stats.rtp());
        stats
    }

    fn validate(&self) -> SimResult<()> {
        if self.config.spins == 0 {
            return Err(SimError::InvalidConfig("spins must be > 0".into()));
        }
        if self.config.chunk_size == 0 {
            return Err(SimError::InvalidConfig("chunk size must be > 0".into()));
        }
        SpinRequest::new(self.config.bet_per_line, self.config.active_lines.clone())
            .validate(&self.slot)?;
        Ok(())
    }
}
