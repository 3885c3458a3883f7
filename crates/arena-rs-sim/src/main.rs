mod config;
mod encounter;

use config::SimConfig;
use tracing::{error, info};

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "sim.toml".into());
    let config = match SimConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "arena-rs-sim v{} running {} (encounter {}, stage {})",
        env!("CARGO_PKG_VERSION"),
        config.encounter.archetype,
        config.encounter.encounter_index,
        config.encounter.stage
    );
    if let Some(log) = &config.simulation.event_log {
        info!("Writing events to {log}");
    }

    let summary = match encounter::run(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Encounter failed: {e}");
            std::process::exit(1);
        }
    };

    println!("outcome:         {}", summary.outcome);
    println!("ticks:           {} ({:.1}s)", summary.ticks, summary.seconds);
    println!("phase reached:   {}", summary.phase_reached.number());
    println!("damage dealt:    {:.0}", summary.damage_dealt);
    println!("damage taken:    {:.0}", summary.damage_taken);
    println!("minions spawned: {}", summary.minions_spawned);
    println!("attacks:");
    for (name, count) in &summary.attacks {
        println!("  {name:<14} {count}");
    }
}
