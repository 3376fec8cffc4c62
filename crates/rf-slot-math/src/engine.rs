//! Spin outcome calculator
//!
//! `compute_spin*` are the pure core: they trust their inputs. [`SlotEngine`] is the
//! caller-facing wrapper that validates a [`SpinRequest`] first.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SlotConfiguration;
use crate::error::{SlotError, SlotResult};
use crate::grid::{sample_from_strips, sample_uniform};
use crate::info::MIN_BET_PER_LINE;
use crate::spin::{SpinResult, SpinTrace};
use crate::strip::StripGenerator;

/// Bet and active lines for one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    pub bet_per_line: f64,
    pub active_lines: Vec<u8>,
}

impl SpinRequest {
    pub fn new(bet_per_line: f64, active_lines: impl Into<Vec<u8>>) -> Self {
        Self {
            bet_per_line,
            active_lines: active_lines.into(),
        }
    }

    /// Check the caller-side preconditions of a spin
    pub fn validate(&self, config: &SlotConfiguration) -> SlotResult<()> {
        if !self.bet_per_line.is_finite() || self.bet_per_line <= 0.0 {
            return Err(SlotError::InvalidArgument(format!(
                "bet per line must be positive, got {}",
                self.bet_per_line
            )));
        }
        if self.bet_per_line < MIN_BET_PER_LINE {
            return Err(SlotError::InvalidArgument(format!(
                "bet per line {} is below the minimum {MIN_BET_PER_LINE}",
                self.bet_per_line
            )));
        }
        if self.active_lines.is_empty() {
            return Err(SlotError::InvalidArgument("no active paylines".into()));
        }
        for (i, &id) in self.active_lines.iter().enumerate() {
            if self.active_lines[..i].contains(&id) {
                return Err(SlotError::InvalidArgument(format!("payline {id} listed twice")));
            }
            if !config.paytable().contains(id) {
                return Err(SlotError::InvalidArgument(format!(
                    "payline {id} is not defined for slot '{}'",
                    config.id()
                )));
            }
        }
        Ok(())
    }
}

/// Compute one spin. Inputs must already satisfy [`SpinRequest::validate`].
pub fn compute_spin<R: Rng + ?Sized>(
    bet_per_line: f64,
    active_lines: &[u8],
    config: &SlotConfiguration,
    rng: &mut R,
) -> SpinResult {
    compute_spin_traced(bet_per_line, active_lines, config, rng).0
}

/// Compute one spin and keep the sampling data behind it
pub fn compute_spin_traced<R: Rng + ?Sized>(
    bet_per_line: f64,
    active_lines: &[u8],
    config: &SlotConfiguration,
    rng: &mut R,
) -> (SpinResult, SpinTrace) {
    let (grid, nerfed_reel, stops) = match config.distribution() {
        Some(distribution) => {
            let spin_strips = StripGenerator::new(distribution, config.nerf()).generate(rng);
            let (grid, stops) = sample_from_strips(&spin_strips.strips, config.rows(), rng);
            (grid, spin_strips.nerfed_reel, Some(stops))
        }
        None => (
            sample_uniform(config.symbols(), config.rows(), config.reels(), rng),
            None,
            None,
        ),
    };
    log::trace!("spin: nerfed reel {:?}, stops {:?}", nerfed_reel, stops);

    let wins = config
        .paytable()
        .evaluate(&grid, active_lines, config.symbols(), bet_per_line);
    let result =
        SpinResult::settle(&grid, config.symbols(), bet_per_line, active_lines.len(), wins);

    let trace = SpinTrace {
        nerfed_reel,
        stops,
        grid,
    };
    (result, trace)
}

/// Validated spin entry point over a shared configuration
#[derive(Debug, Clone)]
pub struct SlotEngine {
    config: Arc<SlotConfiguration>,
}

impl SlotEngine {
    pub fn new(config: Arc<SlotConfiguration>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlotConfiguration {
        &self.config
    }

    /// Spin with the thread-local generator
    pub fn spin(&self, request: &SpinRequest) -> SlotResult<SpinResult> {
        self.spin_with_rng(request, &mut rand::rng())
    }

    /// Spin with an injected generator
    pub fn spin_with_rng<R: Rng + ?Sized>(
        &self,
        request: &SpinRequest,
        rng: &mut R,
    ) -> SlotResult<SpinResult> {
        request.validate(&self.config)?;
        Ok(compute_spin(
            request.bet_per_line,
            &request.active_lines,
            &self.config,
            rng,
        ))
    }

    pub fn spin_traced<R: Rng + ?Sized>(
        &self,
        request: &SpinRequest,
        rng: &mut R,
    ) -> SlotResult<(SpinResult, SpinTrace)> {
        request.validate(&self.config)?;
        Ok(compute_spin_traced(
            request.bet_per_line,
            &request.active_lines,
            &self.config,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::full_line_base;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine() -> SlotEngine {
        SlotEngine::new(Arc::new(SlotConfiguration::classic().unwrap()))
    }

    #[test]
    fn test_request_validation() {
        let engine = engine();
        let config = engine.config();

        assert!(SpinRequest::new(0.05, vec![1, 2, 3, 4, 5, 6, 7, 8]).validate(config).is_ok());

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SpinRequest::new(bad, vec![1]).validate(config),
                Err(SlotError::InvalidArgument(_))
            ));
        }
        assert!(SpinRequest::new(MIN_BET_PER_LINE, vec![1]).validate(config).is_ok());
        let err = SpinRequest::new(0.001, vec![1]).validate(config).unwrap_err();
        assert!(err.to_string().contains("below the minimum"));

        assert!(SpinRequest::new(0.05, vec![]).validate(config).is_err());
        assert!(SpinRequest::new(0.05, vec![1, 1]).validate(config).is_err());
        assert!(SpinRequest::new(0.05, vec![9]).validate(config).is_err());
        assert!(SpinRequest::new(0.05, vec![0]).validate(config).is_err());
    }

    #[test]
    fn test_spin_rejects_before_sampling() {
        let engine = engine();
        let err = engine.spin(&SpinRequest::new(0.05, vec![12])).unwrap_err();
        assert!(err.to_string().contains("payline 12"));
    }

    #[test]
    fn test_seeded_spins_are_reproducible() {
        let engine = engine();
        let request = SpinRequest::new(0.05, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let a: Vec<SpinResult> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| engine.spin_with_rng(&request, &mut rng).unwrap()).collect()
        };
        let b: Vec<SpinResult> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..20).map(|_| engine.spin_with_rng(&request, &mut rng).unwrap()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_spin_results_are_consistent() {
        let engine = engine();
        let config = engine.config();
        let request = SpinRequest::new(0.1, vec![1, 3, 5, 8]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2000 {
            let (result, trace) = engine.spin_traced(&request, &mut rng).unwrap();
            assert_eq!(result.grid.len(), 4);
            assert!(result.grid.iter().all(|row| row.len() == 4));
            assert_eq!(result.total_bet, 0.4);
            assert!(trace.nerfed_reel.is_some_and(|r| r < 4));
            assert_eq!(trace.stops.as_ref().map(Vec::len), Some(4));
            assert_eq!(result.grid, trace.grid.to_names(config.symbols()));

            for win in &result.winning_paylines {
                assert!(request.active_lines.contains(&win.line_number));
                let cells: Vec<_> = win
                    .line_path
                    .iter()
                    .map(|&(r, c)| trace.grid.get(r, c).unwrap())
                    .collect();
                let base = full_line_base(config.symbols(), &cells).unwrap();
                assert_eq!(config.symbols().name(base), win.symbol);
            }
            assert_eq!(result.is_win, result.win_amount > 0.0);
            assert_eq!(result.is_jackpot, result.win_amount >= 20.0 * result.total_bet);
        }
    }
}
