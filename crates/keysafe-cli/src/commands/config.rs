//! Configuration management commands.

use std::path::Path;

use clap::Args;
use keysafe_core::config::{Config, KeySourceConfig};
use keysafe_core::SecretString;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (inline keys are masked)
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub fn run(args: ConfigArgs, config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let json = serde_json::to_string_pretty(&masked(config))?;
            println!("{}", json);
        }

        ConfigCommand::Path => {
            println!("{}", crate::config_path(path)?.display());
        }

        ConfigCommand::Validate => {
            // Loading already validated; report what was checked
            config.validate()?;
            println!("Configuration is valid.");
            println!("  cipher backend: {}", config.cipher.backend.as_str());
            println!(
                "  key source:     {}",
                if config.cipher.key.is_external() {
                    "external"
                } else {
                    "generated (development only)"
                }
            );
            println!("  storage dir:    {}", config.storage_dir()?.display());
            println!("  owners:         {}", config.storage.owners.len());
        }
    }

    Ok(())
}

/// Copy of `config` safe to print.
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    if let KeySourceConfig::Hex { value } = &mut config.cipher.key {
        *value = SecretString::new("********");
    }
    config
}
