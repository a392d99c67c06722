use clap::Parser;
use tokio::signal;
use tracing::info;
use yieldkeeper::adapter::inbound::cli::command::{CheckCommand, Cli, Commands};
use yieldkeeper::adapter::inbound::cli::{check, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => {
            tokio::select! {
                result = run::execute(&cli.config, &args) => result,
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    Ok(())
                }
            }
        }
        Commands::Check(CheckCommand::Config) => check::execute_config(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
