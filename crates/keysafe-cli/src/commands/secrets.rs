//! API key management commands.
//!
//! Provides `keysafe secrets set|get|list` subcommands backed by the
//! file settings store and the configured cipher gateway.

use std::sync::Arc;

use clap::Args;
use keysafe_core::{Config, OwnerId};
use keysafe_secrets::{
    FileSettingsStore, GatewayProvider, KeyOrigin, SecretManager, SettingsStore,
};
use tracing::debug;

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Encrypt and store an owner's API key (prompts for value)
    Set {
        /// Owner account id
        #[arg(long)]
        owner: OwnerId,

        /// Provider label, e.g. "openai"
        #[arg(long)]
        provider: Option<String>,

        /// API key (if omitted, prompts for hidden input; empty clears the key)
        #[arg(long)]
        value: Option<String>,
    },

    /// Decrypt and print an owner's API key
    Get {
        /// Owner account id
        #[arg(long)]
        owner: OwnerId,
    },

    /// List owners with a settings record (no plaintext)
    List,
}

/// Run the secrets command.
pub fn run(args: SecretsArgs, config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(
        FileSettingsStore::from_config(config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize settings store: {}", e))?,
    );

    match args.command {
        SecretsCommand::Set {
            owner,
            provider,
            value,
        } => {
            let manager = build_manager(config, store)?;
            let api_key = match value {
                Some(v) => v,
                None => rpassword::prompt_password(format!("Enter API key for owner {owner}: "))
                    .map_err(|e| anyhow::anyhow!("Failed to read API key: {}", e))?,
            };

            let settings = manager
                .save_secret(owner, Some(&api_key), provider.as_deref())
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            if settings.encrypted_api_key().is_unset() {
                println!("API key for owner {} cleared.", owner);
            } else {
                println!("API key for owner {} stored successfully.", owner);
            }
        }

        SecretsCommand::Get { owner } => {
            let manager = build_manager(config, store)?;
            match manager.get_secret(owner).map_err(|e| anyhow::anyhow!("{}", e))? {
                Some(secret) => println!("{}", secret.expose()),
                None => eprintln!("No API key set for owner {}.", owner),
            }
        }

        SecretsCommand::List => {
            let owners = store.list_owners().map_err(|e| anyhow::anyhow!("{}", e))?;

            if owners.is_empty() {
                println!("No settings records stored.");
            } else {
                println!("{:<12} {:<20} {:<8} {}", "OWNER", "PROVIDER", "KEY", "UPDATED");
                println!("{}", "-".repeat(64));
                for owner in &owners {
                    let Some(settings) = store.find(*owner).map_err(|e| anyhow::anyhow!("{}", e))?
                    else {
                        continue;
                    };
                    println!(
                        "{:<12} {:<20} {:<8} {}",
                        owner,
                        settings.api_provider.as_deref().unwrap_or("-"),
                        if settings.encrypted_api_key().is_unset() { "no" } else { "yes" },
                        settings.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                println!("\n{} record(s) total.", owners.len());
            }
        }
    }

    Ok(())
}

fn build_manager(config: &Config, store: Arc<FileSettingsStore>) -> anyhow::Result<SecretManager> {
    let provider = GatewayProvider::new(config.cipher.clone());
    let manager = SecretManager::from_provider(&provider, store)
        .map_err(|e| anyhow::anyhow!("Failed to initialize cipher: {}", e))?
        .with_failure_policy(config.secrets.on_decrypt_failure);

    if provider.key_origin() == Some(KeyOrigin::Generated) {
        eprintln!(
            "warning: using a generated key; configure cipher.key so stored keys stay readable"
        );
    }
    debug!(policy = ?manager.failure_policy(), "secret manager ready");
    Ok(manager)
}
