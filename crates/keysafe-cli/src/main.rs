//! Keysafe CLI entry point.

use clap::Parser;
use keysafe_cli::{init_logging, load_config, run, Cli};

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings live in the config, so load it first
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose);

    run(cli, config)
}
