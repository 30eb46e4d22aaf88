use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use show_order::config::Config;
use show_order::models::{Conflict, Entity, Show};
use show_order::roster::{load_roster, RosterOptions};
use show_order::scheduler::{ConflictSummary, ShowOrderOptimizer};
use show_order::service::OptimizerService;
use tracing::info;

/// Orders the entities of a show so that performers get time between
/// appearances.
#[derive(Debug, Parser)]
#[command(name = "show-order", version, about)]
struct Cli {
    /// Roster CSV (first_name, last_name, classes[, performer_id | student_id]).
    roster: PathBuf,

    /// Minimum number of entities between two appearances of a performer.
    #[arg(long)]
    min_gap: Option<usize>,

    /// Number of greedy attempts.
    #[arg(long)]
    attempts: Option<usize>,

    /// Seed for reproducible results.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep classes whose name contains "private".
    #[arg(long)]
    keep_private: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    min_gap: usize,
    order: Vec<&'a Entity>,
    conflicts: &'a [Conflict],
    summary: ConflictSummary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(attempts) = cli.attempts {
        config.optimizer.attempts = attempts;
    }
    if let Some(seed) = cli.seed {
        config.optimizer.seed = Some(seed);
    }
    if let Some(min_gap) = cli.min_gap {
        config.optimizer.min_gap = min_gap;
    }
    config.validate()?;
    config.logging.init()?;

    let options = RosterOptions::default().with_exclude_private(!cli.keep_private);
    let roster = load_roster(&cli.roster, &options)
        .with_context(|| format!("failed to read roster {}", cli.roster.display()))?;

    let mut show = Show::from_participants(&roster, config.optimizer.min_gap);
    info!(
        participants = roster.len(),
        entities = show.entities.len(),
        min_gap = show.min_gap,
        "roster loaded"
    );

    let service = OptimizerService::new(
        ShowOrderOptimizer::from_config(&config.optimizer),
        config.service.clone(),
    );
    service.reoptimize(&mut show).await?;
    service.shutdown();

    let summary = ConflictSummary::from_conflicts(&show.conflicts, show.min_gap);
    if cli.json {
        let report = Report {
            min_gap: show.min_gap,
            order: show.running_order(),
            conflicts: &show.conflicts,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&show, &summary);
    }

    Ok(())
}

fn print_report(show: &Show, summary: &ConflictSummary) {
    println!("Running order (min gap {}):", show.min_gap);
    for (slot, entity) in show.running_order().iter().enumerate() {
        let lock = if entity.is_pinned() { " [locked]" } else { "" };
        let clashes = match show.conflicts_involving(&entity.name).count() {
            0 => String::new(),
            n => format!(" !{n}"),
        };
        println!(
            "{:>3}. {} ({} performers){}{}",
            slot + 1,
            entity.name,
            entity.participant_count(),
            lock,
            clashes
        );
    }

    if summary.is_clean() {
        println!("\nNo conflicts.");
        return;
    }

    println!(
        "\n{} conflicts ({} back-to-back) affecting {} performers:",
        summary.total, summary.back_to_back, summary.participants
    );
    for conflict in &show.conflicts {
        println!(
            "  {}: {} -> {} (gap {})",
            conflict.participant_name,
            conflict.entity_names[0],
            conflict.entity_names[1],
            conflict.gap
        );
    }
}
