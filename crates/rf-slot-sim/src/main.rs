//! Slot simulation CLI
//!
//! Usage:
//!   rf-slot-sim                                  - 1M spins of the classic slot
//!   rf-slot-sim --spins 100000 --threads 8       - quick run on 8 threads
//!   rf-slot-sim --slot calibration_harness       - simulate the harness table
//!   rf-slot-sim --config my_slot.yaml --json     - simulate a file, JSON report
//!   rf-slot-sim --list                           - list built-in slots

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use rf_slot_math::{SlotCatalog, SlotConfiguration, SlotDefinition, SlotInfo};
use rf_slot_sim::{SimulationConfig, Simulator};

const HARNESS_ID: &str = "calibration_harness";

#[derive(Parser)]
#[command(name = "rf-slot-sim", about = "Statistical verification of slot outcome math")]
struct Cli {
    /// Number of spins
    #[arg(short, long, default_value_t = 1_000_000)]
    spins: u64,

    /// Bet per active line
    #[arg(short, long, default_value_t = 0.05)]
    bet_per_line: f64,

    /// Number of active lines (first N payline IDs)
    #[arg(short, long, default_value_t = 8)]
    lines: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Spins per work chunk
    #[arg(long, default_value_t = 10_000)]
    chunk_size: u64,

    /// Built-in slot ID
    #[arg(long, default_value = "classic", conflicts_with = "config")]
    slot: String,

    /// Slot definition file (.json / .yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// Table to check calibration against (slot ID or file)
    #[arg(long)]
    compare_with: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit with an error when a verification check fails
    #[arg(long)]
    strict: bool,

    /// List built-in slots and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let catalog = SlotCatalog::standard().context("Failed to build slot catalog")?;

    if cli.list {
        return list_slots(&catalog, cli.json);
    }

    let definition = match &cli.config {
        Some(path) => SlotDefinition::load(path)
            .with_context(|| format!("Failed to load slot config {path}"))?,
        None => resolve_definition(&catalog, &cli.slot)?,
    };
    let slot = Arc::new(
        SlotConfiguration::from_definition(definition).context("Invalid slot configuration")?,
    );

    let available: Vec<u8> = slot.paytable().ids().collect();
    if cli.lines == 0 || cli.lines > available.len() {
        bail!(
            "--lines must be between 1 and {} for slot '{}'",
            available.len(),
            slot.id()
        );
    }

    let reference = match &cli.compare_with {
        Some(target) => Some(resolve_reference(&catalog, target)?),
        // harness-style tables are checked against the production table by default
        None if slot.is_weighted() && slot.id() != "classic" => Some(SlotDefinition::classic()),
        None => None,
    };

    let config = SimulationConfig::default()
        .with_spins(cli.spins)
        .with_bet_per_line(cli.bet_per_line)
        .with_lines(available[..cli.lines].to_vec())
        .with_seed(cli.seed)
        .with_threads(cli.threads)
        .with_chunk_size(cli.chunk_size);

    let mut simulator = Simulator::new(slot, config);
    if let Some(reference) = reference {
        simulator = simulator.with_reference(reference);
    }
    let report = simulator.run().context("Simulation failed")?;

    if cli.json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.to_text());
    }

    if cli.strict && !report.all_passed() {
        let failed: Vec<&str> = report
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect();
        bail!("Verification failed: {}", failed.join(", "));
    }
    Ok(())
}

fn resolve_definition(catalog: &SlotCatalog, id: &str) -> Result<SlotDefinition> {
    if id == HARNESS_ID {
        return Ok(SlotDefinition::calibration_harness());
    }
    let slot = catalog
        .get(id)
        .with_context(|| format!("Unknown slot '{id}' (try --list)"))?;
    Ok(slot.definition().clone())
}

fn resolve_reference(catalog: &SlotCatalog, target: &str) -> Result<SlotDefinition> {
    if Path::new(target).is_file() {
        return SlotDefinition::load(target)
            .with_context(|| format!("Failed to load reference table {target}"));
    }
    resolve_definition(catalog, target)
}

fn list_slots(catalog: &SlotCatalog, json: bool) -> Result<()> {
    if json {
        let infos: Vec<SlotInfo> = catalog
            .ids()
            .map(|id| catalog.get(id).map(|c| SlotInfo::from_config(&c)))
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!(
        "{:<12} {:<24} {:>5} {:>5} {:>6} {:<8} {:>6}",
        "ID", "Name", "Reels", "Rows", "Lines", "Vol", "RTP"
    );
    for s in catalog.summaries() {
        println!(
            "{:<12} {:<24} {:>5} {:>5} {:>6} {:<8} {:>5.1}%",
            s.id,
            s.name,
            s.reels,
            s.rows,
            s.max_paylines,
            s.volatility.as_str(),
            s.rtp
        );
    }
    println!("{HARNESS_ID:<12} (verification table, weighted)");
    Ok(())
}
