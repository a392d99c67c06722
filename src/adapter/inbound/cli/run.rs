//! Handler for `yieldkeeper run`.

use std::path::Path;

use tracing::info;

use super::command::RunArgs;
use crate::error::Result;
use crate::infrastructure::bootstrap::{Simulation, SimulationSummary};
use crate::infrastructure::config::settings::Config;

/// Load the configuration, apply CLI overrides and run the simulation.
pub async fn execute<P: AsRef<Path>>(config_path: P, args: &RunArgs) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, args)?;
    config.init_logging();

    let simulation = Simulation::build(config)?;
    let summary = simulation.run().await?;
    info!(harvests = summary.harvests, ticks = summary.keeper_ticks, "Simulation finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    if let Some(steps) = args.steps {
        config.simulation.steps = steps;
    }
    if args.migrate {
        config.simulation.migrate_at_end = true;
    }
    config.validate()
}

fn print_summary(summary: &SimulationSummary) {
    println!("Simulation Summary");
    println!("  Asset          {}", summary.asset);
    println!("  Steps          {}", summary.steps);
    println!("  Keeper ticks   {}", summary.keeper_ticks);
    println!("  Harvests       {}", summary.harvests);
    println!("  Gain           {}", summary.gain);
    println!("  Loss           {}", summary.loss);
    println!("  Final index    {}", summary.final_index);
    println!("  Idle           {}", summary.position.idle);
    println!("  Deployed       {}", summary.position.deployed);
    if let Some(migration) = &summary.migration {
        println!(
            "  Migrated to    {} ({}, loss {})",
            migration.target,
            migration.mode.as_str(),
            migration.realized_loss
        );
    }
}
