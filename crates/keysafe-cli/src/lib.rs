//! Keysafe command-line interface.

pub mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use keysafe_core::config::{Config, LoggingConfig};
use keysafe_core::{paths, ConfigError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keysafe - encrypted per-owner API key storage
#[derive(Parser)]
#[command(name = "keysafe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "KEYSAFE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage encrypted API keys
    Secrets(commands::secrets::SecretsArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Print a new random key for `cipher.key.source = "hex"`
    Keygen,

    /// Show version information
    Version,
}

/// Load the config at `path`, or the default file if present, or defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => match Config::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(e) => return Err(e.into()),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Resolve the config file path the CLI would read.
pub fn config_path(path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level; each `-v` raises it one step.
pub fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let level = (0..verbose).fold(logging.level, |level, _| level.more_verbose());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str();
        EnvFilter::new(format!(
            "keysafe_cli={level},keysafe_core={level},keysafe_secrets={level}"
        ))
    });

    let json = logging.json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Run the CLI with the given arguments.
pub fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Secrets(args) => commands::secrets::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config, cli.config.as_deref()),
        Commands::Keygen => {
            let key = keysafe_secrets::SymmetricKey::generate();
            println!("{}", key.to_hex().as_str());
            Ok(())
        }
        Commands::Version => {
            println!("keysafe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
