//! Simulation report and verification checklist

use serde::{Deserialize, Serialize};

use rf_slot_math::{CalibrationReport, SlotConfiguration, SymbolTier};

use crate::stats::SpinStats;

/// Nerf counts may stray this many binomial standard deviations from an even split
pub const NERF_Z_BOUND: f64 = 4.0;

/// Per-symbol line win statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub symbol: String,
    pub multiplier: f64,
    pub tier: SymbolTier,
    pub wins: u64,
    pub total_payout: f64,
    /// Winning lines per spin, in percent
    pub hit_rate: f64,
    /// Share of total winnings, in percent
    pub contribution: f64,
}

/// Appearance rates for one reel, in percent, in symbol table order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelAppearance {
    pub reel: usize,
    pub rates: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub slot_id: String,
    pub slot_name: String,
    pub spins: u64,
    pub bet_per_line: f64,
    pub active_lines: Vec<u8>,
    pub bet_per_spin: f64,
    pub seed: u64,

    pub total_wagered: f64,
    pub total_won: f64,
    pub net_result: f64,
    /// Percent
    pub rtp: f64,
    pub house_edge: f64,
    /// Analytic RTP for the same lines and cent-rounded bet, percent
    pub theoretical_rtp: f64,

    pub winning_spins: u64,
    /// Percent
    pub hit_rate: f64,
    pub average_win: f64,
    pub max_win: f64,
    pub jackpot_spins: u64,
    pub all_wild_line_wins: u64,

    pub symbols: Vec<SymbolStats>,
    pub reel_appearance: Vec<ReelAppearance>,
    /// Observed wild share of visible cells per reel, percent
    pub wild_rates: Vec<f64>,
    /// Wild share implied by the base weights and nerf, percent
    pub expected_wild_rates: Vec<f64>,
    pub nerfed_reel_counts: Vec<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationReport>,
    pub checks: Vec<VerificationCheck>,
}

impl SimulationReport {
    pub fn build(
        config: &SlotConfiguration,
        stats: &SpinStats,
        bet_per_line: f64,
        active_lines: &[u8],
        seed: u64,
        theoretical_rtp: f64,
        calibration: Option<CalibrationReport>,
    ) -> Self {
        let symbols = config.symbols();
        let spins = stats.spins.max(1) as f64;
        let rtp = stats.rtp() * 100.0;

        let symbol_rows = symbols
            .iter()
            .map(|(id, def)| {
                let wins = stats.symbol_wins[id.index()];
                let payout = stats.symbol_payouts[id.index()];
                SymbolStats {
                    symbol: def.name.clone(),
                    multiplier: def.multiplier,
                    tier: def.tier,
                    wins,
                    total_payout: payout,
                    hit_rate: wins as f64 / spins * 100.0,
                    contribution: if stats.total_won > 0.0 {
                        payout / stats.total_won * 100.0
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        let reel_appearance = (0..config.reels())
            .map(|reel| ReelAppearance {
                reel,
                rates: symbols
                    .iter()
                    .map(|(id, def)| {
                        let rate = stats.appearance_rate(reel, id.index()) * 100.0;
                        (def.name.clone(), rate)
                    })
                    .collect(),
            })
            .collect();

        let (wild_rates, expected_wild_rates) = match symbols.wild_id() {
            Some(wild) => (
                (0..config.reels())
                    .map(|reel| stats.appearance_rate(reel, wild.index()) * 100.0)
                    .collect(),
                expected_wild_rates(config),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let mut report = Self {
            slot_id: config.id().to_string(),
            slot_name: config.name().to_string(),
            spins: stats.spins,
            bet_per_line,
            active_lines: active_lines.to_vec(),
            bet_per_spin: bet_per_line * active_lines.len() as f64,
            seed,
            total_wagered: stats.total_wagered,
            total_won: stats.total_won,
            net_result: stats.total_won - stats.total_wagered,
            rtp,
            house_edge: 100.0 - rtp,
            theoretical_rtp: theoretical_rtp * 100.0,
            winning_spins: stats.winning_spins,
            hit_rate: stats.hit_rate() * 100.0,
            average_win: if stats.winning_spins > 0 {
                stats.total_won / stats.winning_spins as f64
            } else {
                0.0
            },
            max_win: stats.max_win,
            jackpot_spins: stats.jackpot_spins,
            all_wild_line_wins: stats.all_wild_line_wins,
            symbols: symbol_rows,
            reel_appearance,
            wild_rates,
            expected_wild_rates,
            nerfed_reel_counts: stats.nerfed_reel_counts.clone(),
            calibration,
            checks: Vec::new(),
        };
        report.checks = report.verify(config);
        report
    }

    fn verify(&self, config: &SlotConfiguration) -> Vec<VerificationCheck> {
        let mut checks = vec![VerificationCheck::new(
            "RTP < 100%",
            self.rtp < 100.0,
            format!("{:.2}%", self.rtp),
        )];

        if let Some(band) = config.rtp_band() {
            checks.push(VerificationCheck::new(
                "RTP in target band",
                band.contains(self.rtp / 100.0),
                format!(
                    "{:.2}% in {:.1}%..{:.1}%",
                    self.rtp,
                    band.min * 100.0,
                    band.max * 100.0
                ),
            ));
        }

        if config.nerf().is_some() {
            let (even, worst_z) = nerf_evenness(&self.nerfed_reel_counts, self.spins);
            checks.push(VerificationCheck::new(
                "Wild nerf distributed evenly",
                even,
                format!("max |z| = {worst_z:.2} (bound {NERF_Z_BOUND})"),
            ));
        }

        if let Some(wild) = config.symbols().wild_id() {
            let name = config.symbols().name(wild);
            let wins = self
                .symbols
                .iter()
                .find(|s| s.symbol == name)
                .map_or(0, |s| s.wins);
            checks.push(VerificationCheck::new(
                "Wild line wins observed",
                wins > 0,
                format!("{wins} wins"),
            ));
        }

        for symbol in self.symbols.iter().filter(|s| s.tier == SymbolTier::Jackpot) {
            checks.push(VerificationCheck::new(
                &format!("{} wins observed", capitalize(&symbol.symbol)),
                symbol.wins > 0,
                format!("{} wins", symbol.wins),
            ));
        }

        checks.push(VerificationCheck::new(
            "Player loses long-term",
            self.total_won < self.total_wagered,
            format!("net {:.2}", self.net_result),
        ));
        checks
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Generate JSON report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }

    /// Generate text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let title = format!("Slot Simulation Report: {} ({})", self.slot_name, self.slot_id);
        output.push_str(&format!("{title}\n{}\n\n", "=".repeat(title.chars().count())));

        output.push_str("Parameters:\n");
        output.push_str(&format!("  Spins:           {}\n", self.spins));
        output.push_str(&format!("  Bet per line:    {:.2}\n", self.bet_per_line));
        output.push_str(&format!("  Active lines:    {:?}\n", self.active_lines));
        output.push_str(&format!("  Bet per spin:    {:.2}\n", self.bet_per_spin));
        output.push_str(&format!("  Seed:            {}\n\n", self.seed));

        output.push_str("Financial:\n");
        output.push_str(&format!("  Total wagered:   {:.2}\n", self.total_wagered));
        output.push_str(&format!("  Total won:       {:.2}\n", self.total_won));
        output.push_str(&format!("  Net result:      {:.2}\n", self.net_result));
        output.push_str(&format!("  RTP:             {:.2}%\n", self.rtp));
        output.push_str(&format!("  Theoretical RTP: {:.2}%\n", self.theoretical_rtp));
        output.push_str(&format!("  House edge:      {:.2}%\n\n", self.house_edge));

        output.push_str("Wins:\n");
        output.push_str(&format!(
            "  Winning spins:   {} ({:.2}%)\n",
            self.winning_spins, self.hit_rate
        ));
        output.push_str(&format!("  Average win:     {:.2}\n", self.average_win));
        output.push_str(&format!("  Max win:         {:.2}\n", self.max_win));
        output.push_str(&format!("  Jackpot spins:   {}\n", self.jackpot_spins));
        output.push_str(&format!("  All-wild lines:  {}\n\n", self.all_wild_line_wins));

        if !self.nerfed_reel_counts.is_empty() && self.nerfed_reel_counts.iter().any(|&c| c > 0) {
            output.push_str("Wild nerf:\n");
            for (reel, &count) in self.nerfed_reel_counts.iter().enumerate() {
                let share = count as f64 / self.spins.max(1) as f64 * 100.0;
                output.push_str(&format!("  Reel {reel} nerfed:   {count} ({share:.1}%)\n"));
            }
            output.push('\n');
        }

        if !self.wild_rates.is_empty() {
            output.push_str("Wild appearances per reel:\n");
            for (reel, (observed, expected)) in self
                .wild_rates
                .iter()
                .zip(&self.expected_wild_rates)
                .enumerate()
            {
                output.push_str(&format!(
                    "  Reel {reel}: {observed:.3}% (expected {expected:.3}%)\n"
                ));
            }
            output.push('\n');
        }

        output.push_str("Wins by symbol:\n");
        output.push_str(&format!(
            "  {:<12} {:>8} {:>10} {:>14} {:>12}\n",
            "Symbol", "Wins", "Hit rate", "Total payout", "Contribution"
        ));
        output.push_str(&format!("  {}\n", "-".repeat(60)));
        for s in &self.symbols {
            output.push_str(&format!(
                "  {:<12} {:>8} {:>9.4}% {:>14.2} {:>11.1}%\n",
                s.symbol, s.wins, s.hit_rate, s.total_payout, s.contribution
            ));
        }
        output.push('\n');

        output.push_str("Appearance rates per reel:\n");
        output.push_str(&format!("  {:<12}", "Symbol"));
        for reel in &self.reel_appearance {
            output.push_str(&format!(" {:>9}", format!("Reel {}", reel.reel)));
        }
        output.push('\n');
        if let Some(first) = self.reel_appearance.first() {
            for (i, (name, _)) in first.rates.iter().enumerate() {
                output.push_str(&format!("  {name:<12}"));
                for reel in &self.reel_appearance {
                    output.push_str(&format!(" {:>8.2}%", reel.rates[i].1));
                }
                output.push('\n');
            }
        }
        output.push('\n');

        if let Some(calibration) = &self.calibration {
            output.push_str(&format!(
                "Calibration vs '{}': {} differences\n",
                calibration.right,
                calibration.drifts.len()
            ));
            for drift in &calibration.drifts {
                output.push_str(&format!("  {drift}\n"));
            }
            output.push('\n');
        }

        output.push_str("Verification:\n");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            output.push_str(&format!("  [{status}] {:<32} {}\n", check.name, check.detail));
        }

        output
    }
}

/// Largest binomial z-score of the nerf counts against an even split
pub fn nerf_evenness(counts: &[u64], spins: u64) -> (bool, f64) {
    if counts.is_empty() || spins == 0 {
        return (false, f64::INFINITY);
    }
    let p = 1.0 / counts.len() as f64;
    let n = spins as f64;
    let sigma = (p * (1.0 - p) / n).sqrt();
    let worst = counts
        .iter()
        .map(|&c| ((c as f64 / n - p) / sigma).abs())
        .fold(0.0, f64::max);
    (worst <= NERF_Z_BOUND, worst)
}

/// Wild share per reel implied by the configuration, in percent
pub fn expected_wild_rates(config: &SlotConfiguration) -> Vec<f64> {
    let (Some(dist), Some(wild)) = (config.distribution(), config.symbols().wild_id()) else {
        let uniform = 100.0 / config.symbols().len() as f64;
        return vec![uniform; config.reels()];
    };
    let reels = dist.reel_count() as f64;
    dist.reels()
        .iter()
        .map(|weights| {
            let base = weights.probability(wild);
            match config.nerf() {
                Some(nerf) => {
                    let nerfed = weights
                        .with_wild_nerf(nerf.wild, dist.filler(), nerf.weight)
                        .probability(wild);
                    ((reels - 1.0) / reels * base + nerfed / reels) * 100.0
                }
                None => base * 100.0,
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nerf_evenness() {
        let (even, z) = nerf_evenness(&[2500, 2500, 2500, 2500], 10_000);
        assert!(even);
        assert_eq!(z, 0.0);

        // sigma = sqrt(0.25 * 0.75 / 10000) = 0.00433; 0.28 is ~6.9 sigma out
        let (even, z) = nerf_evenness(&[2800, 2400, 2400, 2400], 10_000);
        assert!(!even);
        assert!(z > 6.0);

        assert!(!nerf_evenness(&[], 0).0);
    }

    #[test]
    fn test_expected_wild_rates_classic() {
        let config = SlotConfiguration::classic().unwrap();
        let rates = expected_wild_rates(&config);
        assert_eq!(rates.len(), 4);
        for rate in rates {
            assert_relative_eq!(rate, 0.75 * 3.0 + 0.25 * 0.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_report_checks_and_text() {
        let config = SlotConfiguration::classic().unwrap();
        let mut stats = SpinStats::new(config.symbols().len(), 4);
        stats.spins = 1000;
        stats.total_wagered = 400.0;
        stats.total_won = 380.0;
        stats.winning_spins = 120;
        stats.nerfed_reel_counts = vec![250, 250, 250, 250];
        stats.symbol_wins = vec![80, 30, 8, 1, 1, 0, 0];

        let lines = [1, 2, 3, 4, 5, 6, 7, 8];
        let report = SimulationReport::build(&config, &stats, 0.05, &lines, 7, 0.9576, None);
        assert_relative_eq!(report.rtp, 95.0, epsilon = 1e-9);
        assert_relative_eq!(report.hit_rate, 12.0, epsilon = 1e-9);

        let check = |name: &str| report.checks.iter().find(|c| c.name == name).unwrap().passed;
        assert!(check("RTP < 100%"));
        assert!(check("RTP in target band"));
        assert!(check("Wild nerf distributed evenly"));
        assert!(check("Wild line wins observed"));
        assert!(!check("Seven wins observed"));
        assert!(!check("Diamond wins observed"));
        assert!(check("Player loses long-term"));
        assert!(!report.all_passed());

        let text = report.to_text();
        assert!(text.contains("Classic Fruits Deluxe"));
        assert!(text.contains("[FAIL] Diamond wins observed"));
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["spins"], 1000);
    }
}
