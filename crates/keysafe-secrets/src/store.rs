//! Settings-record storage backends.
//!
//! Defines the [`SettingsStore`] trait the secret operations persist through,
//! the [`OwnerRegistry`] used to reject unknown owners, and
//! [`MemorySettingsStore`]. The file-backed store lives in [`crate::file`].

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use keysafe_core::OwnerId;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, SecretError};
use crate::types::UserSettings;

/// Answers whether an owner id refers to a real account.
pub trait OwnerRegistry: Send + Sync {
    fn contains(&self, owner: OwnerId) -> bool;
}

impl OwnerRegistry for HashSet<OwnerId> {
    fn contains(&self, owner: OwnerId) -> bool {
        HashSet::contains(self, &owner)
    }
}

/// Durable per-owner settings records.
///
/// Two saves for the same owner are last-write-wins; implementations add no
/// locking beyond what a single `save` needs.
pub trait SettingsStore: Send + Sync {
    /// Fetch the owner's record, creating an empty one if none exists.
    ///
    /// Fails with [`SecretError::OwnerNotFound`] when the owner is unknown.
    fn get_or_create(&self, owner: OwnerId) -> Result<UserSettings>;

    /// Fetch the owner's record without creating it.
    fn find(&self, owner: OwnerId) -> Result<Option<UserSettings>>;

    /// Validate and persist `settings`, returning the stored record.
    fn save(&self, settings: UserSettings) -> Result<UserSettings>;
}

/// Stamp `settings` for persistence, keeping the original creation time.
pub(crate) fn prepare_for_save(
    mut settings: UserSettings,
    existing: Option<&UserSettings>,
) -> Result<UserSettings> {
    settings.validate()?;
    if let Some(existing) = existing {
        settings.created_at = existing.created_at;
    }
    settings.updated_at = Utc::now();
    Ok(settings)
}

/// In-memory [`SettingsStore`].
pub struct MemorySettingsStore {
    owners: Box<dyn OwnerRegistry>,
    records: RwLock<HashMap<OwnerId, UserSettings>>,
}

impl MemorySettingsStore {
    /// Create an empty store accepting the owners in `owners`.
    pub fn new(owners: impl OwnerRegistry + 'static) -> Self {
        Self {
            owners: Box::new(owners),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty store accepting exactly the given owner ids.
    pub fn with_owners(owners: impl IntoIterator<Item = OwnerId>) -> Self {
        Self::new(owners.into_iter().collect::<HashSet<_>>())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_owner(&self, owner: OwnerId) -> Result<()> {
        if self.owners.contains(owner) {
            Ok(())
        } else {
            Err(SecretError::OwnerNotFound(owner))
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_or_create(&self, owner: OwnerId) -> Result<UserSettings> {
        self.ensure_owner(owner)?;
        let mut records = self.records.write();
        let settings = records.entry(owner).or_insert_with(|| {
            debug!(owner_id = %owner, "creating settings record");
            UserSettings::new(owner)
        });
        Ok(settings.clone())
    }

    fn find(&self, owner: OwnerId) -> Result<Option<UserSettings>> {
        Ok(self.records.read().get(&owner).cloned())
    }

    fn save(&self, settings: UserSettings) -> Result<UserSettings> {
        let owner = settings.owner_id;
        self.ensure_owner(owner)?;
        let mut records = self.records.write();
        let settings = prepare_for_save(settings, records.get(&owner))?;
        records.insert(owner, settings.clone());
        Ok(settings)
    }
}
