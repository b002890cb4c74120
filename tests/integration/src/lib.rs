//! Shared fixtures for the integration test binaries.

use std::path::Path;

use keysafe_core::config::{Config, KeySourceConfig};
use keysafe_core::{OwnerId, SecretString};

/// Fixed test key. Never use outside tests.
pub const TEST_HEX_KEY: &str = "3030303030303030303030303030303030303030303030303030303030303030";

/// Owner ids registered in [`fixture_config`].
pub const OWNERS: [i64; 3] = [1, 2, 42];

/// Config with an inline test key and a file store under `dir`.
pub fn fixture_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.cipher.key = KeySourceConfig::Hex {
        value: SecretString::new(TEST_HEX_KEY),
    };
    config.storage.dir = Some(dir.join("settings"));
    config.storage.owners = OWNERS.iter().copied().map(OwnerId::new).collect();
    config
}
