//! Command routing and execution

use crate::app::{init_logging, AppConfig};
use crate::cli::args::{Cli, Commands};
use crate::cli::commands::{run_distance, run_interactive, run_locate, run_validate};
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(cli: Cli) -> Result<()> {
    let app = AppConfig::new(cli.verbose).with_config_path(cli.config);

    match cli.command {
        Commands::Distance {
            cep,
            position,
            deny_location,
            json,
        } => run_distance(app, cep, position, deny_location, json).await,
        Commands::Locate { position, json } => run_locate(app, position, json).await,
        Commands::Validate { cep } => {
            // Pure check; configuration is not consulted
            init_logging(&app);
            run_validate(&cep)
        }
        Commands::Interactive => run_interactive(app).await,
    }
}
