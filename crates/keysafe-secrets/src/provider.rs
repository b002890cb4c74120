//! Process-wide cipher gateway handle.
//!
//! Build one [`GatewayProvider`] at startup from [`CipherConfig`] and share it
//! by `Arc`. The gateway (and therefore the key) is built on the first
//! [`GatewayProvider::get`] and reused until [`GatewayProvider::reset`].

use std::sync::Arc;

use keysafe_core::config::{CipherBackend, CipherConfig};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::crypto::{AesGcmGateway, CipherGateway};
use crate::error::Result;
use crate::key::{self, KeyOrigin};

struct Slot {
    gateway: Arc<dyn CipherGateway>,
    origin: KeyOrigin,
}

/// Lazily builds and caches the cipher gateway for one configuration.
pub struct GatewayProvider {
    config: CipherConfig,
    // Held across construction so concurrent first callers share one key
    slot: Mutex<Option<Slot>>,
}

impl GatewayProvider {
    /// Create a provider; nothing is built until the first `get`.
    pub fn new(config: CipherConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
        }
    }

    /// A fresh provider with its own generated key, for tests.
    pub fn for_tests() -> Self {
        Self::new(CipherConfig::default())
    }

    /// The cached gateway, building it on first use.
    pub fn get(&self) -> Result<Arc<dyn CipherGateway>> {
        let mut slot = self.slot.lock();
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(&existing.gateway));
        }

        let built = build(&self.config)?;
        let gateway = Arc::clone(&built.gateway);
        *slot = Some(built);
        Ok(gateway)
    }

    /// Drop the cached gateway so the next `get` rebuilds it.
    ///
    /// With a generated key this makes every previously sealed blob unreadable.
    pub fn reset(&self) {
        if self.slot.lock().take().is_some() {
            debug!("cipher gateway reset");
        }
    }

    /// Whether a gateway is currently cached.
    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Origin of the cached gateway's key, if one is built.
    pub fn key_origin(&self) -> Option<KeyOrigin> {
        self.slot.lock().as_ref().map(|slot| slot.origin)
    }
}

fn build(config: &CipherConfig) -> Result<Slot> {
    if config.backend == CipherBackend::Kms {
        // TODO: build a KMS-backed gateway once a key-management endpoint is configurable
        warn!(
            backend = config.backend.as_str(),
            "KMS gateway is not implemented yet, falling back to AES-GCM"
        );
    }

    let (key, origin) = key::resolve(&config.key)?;
    if origin == KeyOrigin::Generated {
        warn!("cipher gateway using a generated key; stored secrets will not survive a restart");
    }

    let gateway: Arc<dyn CipherGateway> = Arc::new(AesGcmGateway::new(&key));
    debug!(backend = gateway.name(), ?origin, "cipher gateway constructed");
    Ok(Slot { gateway, origin })
}
