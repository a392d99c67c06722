use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate the configuration file without starting the keeper.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;
    let asset = config.asset.asset()?;
    let policy = config.strategy.policy(&asset)?;

    println!("Configuration Check");
    println!("  Config            {}", path.display());
    println!("  Asset             {} ({} decimals)", asset, asset.decimals());
    println!("  Strategy          {}", config.strategy.address);
    println!("  Vault             {}", config.strategy.vault);
    println!("  Venue             {}", config.strategy.venue);
    println!("  Min invest        {} base units", policy.min_invest_amount());
    println!("  Harvest interval  {}s", policy.harvest_interval().num_seconds());
    println!("  Migration mode    {}", config.strategy.migration_mode.as_str());
    println!("  Keeper            {}", config.keeper.identity);
    println!("Configuration file is valid");

    Ok(())
}
