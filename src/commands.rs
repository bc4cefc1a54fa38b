use crate::app_config::{AppConfig, BATCH_OUTPUT_FILE};
use crate::engine::session::is_market_open;
use crate::engine::{
    BestStrike, Bias, ChartLevels, OptionCandidate, SetupResult, Snapshot, SnapshotReport,
    process_batch, process_snapshot,
};
use crate::utility::Timer;
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use std::path::Path;
use tracing::warn;

/// Read one snapshot JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

/// Read every `*.json` snapshot in `dir`, sorted by file name.
/// Unreadable files are reported and skipped.
pub fn load_snapshot_dir(dir: &Path) -> Result<(Vec<Snapshot>, Vec<(String, String)>)> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut snapshots = Vec::new();
    let mut failed = Vec::new();
    for path in paths {
        match load_snapshot(&path) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping snapshot");
                failed.push((path.display().to_string(), format!("{:#}", e)));
            }
        }
    }
    Ok((snapshots, failed))
}

pub fn format_status(setup: &SetupResult) -> String {
    let targets = setup
        .targets
        .iter()
        .enumerate()
        .map(|(i, t)| format!("T{}:{:.2}", i + 1, t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Price: {:.2}\nTargets: {}\nStop: {:.2}\nBias: {}",
        setup.price, targets, setup.stop, setup.bias
    )
}

pub fn format_candidate(candidate: Option<&OptionCandidate>) -> String {
    match candidate {
        None => "—".to_string(),
        Some(c) => format!(
            "{} {} | Δ={:.2} | bid/ask={:.2}/{:.2} | vol/oi={}/{}",
            c.side, c.strike, c.delta, c.bid, c.ask, c.volume, c.open_interest
        ),
    }
}

pub fn format_strike(best: &BestStrike) -> String {
    format!(
        "Best strike at {:.2}:\nCalls: {}\nPuts:  {}",
        best.underlying,
        format_candidate(best.call.as_ref()),
        format_candidate(best.put.as_ref())
    )
}

pub fn format_levels(levels: &ChartLevels) -> String {
    let mut lines = vec![format!("Hourly bars: {}", levels.hourly_bars)];
    if let Some(pivots) = &levels.pivots {
        let piv = pivots
            .labelled()
            .iter()
            .map(|(label, v)| format!("{}:{:.2}", label, v))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Pivots: {}", piv));
    }
    if !levels.swings.is_empty() {
        let swings = levels
            .swings
            .iter()
            .map(|s| format!("{:.2}", s.price))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Swing levels: {}", swings));
    }
    lines.join("\n")
}

fn bias_colored(bias: Bias) -> colored::ColoredString {
    match bias {
        Bias::Bullish => bias.to_string().green().bold(),
        Bias::Bearish => bias.to_string().red().bold(),
        Bias::Neutral => bias.to_string().yellow(),
    }
}

fn print_report(report: &SnapshotReport) {
    println!("{} {} ({} bars)", "→".cyan(), report.symbol.yellow(), report.bars);

    match (&report.setup, &report.no_signal) {
        (Some(setup), _) => {
            println!("{}", format_status(setup));
            println!("{} {}", "Bias:".cyan(), bias_colored(setup.bias));
        }
        (None, reason) => {
            println!(
                "{} No signal available: {}",
                "ℹ".blue(),
                reason.as_deref().unwrap_or("no data")
            );
        }
    }

    if let Some(levels) = &report.levels {
        println!("{}", format_levels(levels));
    }

    match &report.best_strike {
        Some(best) => println!("{}", format_strike(best)),
        None => println!("{} No options chain in snapshot", "ℹ".blue()),
    }
    println!();
}

fn banner(title: &str) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
}

/// CLI entry points, one per execution mode.
pub struct EngineCommands;

impl EngineCommands {
    /// Analyse one snapshot file and print the status, levels and strike reports.
    pub fn run_single(config: &AppConfig) -> Result<()> {
        banner("SPX Setup Engine");

        if !is_market_open(Utc::now()) {
            println!("{} Market may be closed now; data is from the last session.", "ℹ".blue());
            println!();
        }

        let snapshot = load_snapshot(&config.snapshot)?;
        let report = process_snapshot(&snapshot, &config.engine);
        print_report(&report);
        Ok(())
    }

    /// Analyse every snapshot in a directory and write the batch report.
    pub fn run_batch(config: &AppConfig) -> Result<()> {
        banner("SPX Setup Engine - Batch");

        let (snapshots, failed) = load_snapshot_dir(&config.snapshot_dir)?;
        println!("{} Loaded {} snapshots", "✓".green(), snapshots.len());

        let timer = Timer::start("batch analysis");
        let reports = process_batch(&snapshots, &config.engine);
        let elapsed = timer.stop();

        for report in &reports {
            print_report(report);
        }

        let with_signal = reports.iter().filter(|r| r.has_signal()).count();
        let with_strike = reports
            .iter()
            .filter_map(|r| r.best_strike.as_ref())
            .filter(|b| b.call.is_some() || b.put.is_some())
            .count();

        println!("{}", "=".repeat(60).blue());
        println!("{}", "Summary".cyan().bold());
        println!("{}", "=".repeat(60).blue());
        println!("{} Analysed: {}", "✓".green(), reports.len());
        println!("{} With signal: {}", "ℹ".blue(), with_signal);
        println!("{} With strike: {}", "ℹ".blue(), with_strike);
        println!("{} Failed to load: {}", "✗".red(), failed.len());
        println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
        for (path, error) in failed.iter().take(10) {
            println!("  {} {} → {}", "✗".red(), path.yellow(), error.chars().take(80).collect::<String>());
        }

        std::fs::write(BATCH_OUTPUT_FILE, serde_json::to_string_pretty(&reports)?)?;
        println!("{} Saved {} reports to {}", "✓".green(), reports.len(), BATCH_OUTPUT_FILE);
        Ok(())
    }
}
