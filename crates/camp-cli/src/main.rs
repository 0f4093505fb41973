//! Headless Camp-Life Runner
//!
//! Run with: cargo run -p camp-cli
//!
//! Examples:
//!   cargo run -p camp-cli -- --days 14 --seed 7
//!   cargo run -p camp-cli -- --content-dir content/ --soldiers 80

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use camp_cli::session::CampSession;
use camp_core::{
    BuiltinRepository, CampConfig, DefinitionRepository, StaticSituationProvider, TomlRepository,
};
use camp_events::PlayerSnapshot;
use opportunities::OpportunityConfig;

/// Living-camp simulation, headless
#[derive(Parser, Debug)]
#[command(name = "camp-cli")]
#[command(about = "Headless runner for the living-camp simulation")]
struct Args {
    /// Number of days to simulate
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// Random seed for the simulation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Company strength at enlistment
    #[arg(long, default_value_t = 60)]
    soldiers: u32,

    /// Directory of TOML content packs (falls back to built-ins)
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Camp configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each phase's offered opportunities
    #[arg(long)]
    show_opportunities: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CampConfig::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("could not load {} ({}), using defaults", path.display(), e);
            CampConfig::default()
        }),
        None => CampConfig::default(),
    };

    let mut session = match &args.content_dir {
        Some(dir) => build_session(&args, config, &TomlRepository::new(dir)),
        None => build_session(&args, config, &BuiltinRepository),
    };

    let hours = args.days as u64 * 24;
    for _ in 0..hours {
        session.advance_hour();

        if session.clock().is_phase_boundary() && args.show_opportunities {
            let clock = session.clock();
            for candidate in session.opportunities() {
                println!(
                    "{} offer: {} (score {:.0})",
                    clock, candidate.definition.title, candidate.fitness_score
                );
            }
        }

        for entry in session.drain_news() {
            println!("[day {:>3}] {:?}: {}", entry.day, entry.severity, entry.text);
        }
        for event in session.drain_delivered() {
            println!("[day {:>3}] event: {} ({})", session.clock().day, event.title, event.decision_id);
        }
    }

    let roster = &session.sim.roster;
    println!(
        "\nAfter {} days: {} on the rolls, {} fit, {} sick, {} wounded, {} missing, {} dead.",
        args.days,
        roster.total_soldiers,
        roster.fit_for_duty(),
        roster.sick_count,
        roster.wounded_count,
        roster.missing_count,
        roster.dead_this_campaign,
    );
}

fn build_session(
    args: &Args,
    config: CampConfig,
    repository: &dyn DefinitionRepository,
) -> CampSession {
    CampSession::new(
        args.seed,
        config,
        OpportunityConfig::default(),
        repository,
        args.soldiers,
        PlayerSnapshot::veteran(),
        Box::new(StaticSituationProvider::garrison()),
    )
}
