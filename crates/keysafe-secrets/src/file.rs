//! File-system-backed settings store.
//!
//! Each owner's record is a JSON file at `{base_dir}/{owner_id}.json`. The
//! directory is created with mode `0700` and files with `0600` on Unix.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use keysafe_core::{Config, OwnerId};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, SecretError};
use crate::store::{prepare_for_save, OwnerRegistry, SettingsStore};
use crate::types::UserSettings;

/// A file-system-backed [`SettingsStore`].
pub struct FileSettingsStore {
    base_dir: PathBuf,
    owners: Box<dyn OwnerRegistry>,
}

impl FileSettingsStore {
    /// Create a store rooted at `base_dir` accepting the owners in `owners`.
    pub fn new(base_dir: PathBuf, owners: impl OwnerRegistry + 'static) -> Self {
        Self {
            base_dir,
            owners: Box::new(owners),
        }
    }

    /// Create a store from `storage.dir` and `storage.owners`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_dir = config
            .storage_dir()
            .map_err(|e| SecretError::StorageError(e.to_string()))?;
        let owners: HashSet<OwnerId> = config.storage.owners.iter().copied().collect();
        Ok(Self::new(base_dir, owners))
    }

    /// Directory holding the record files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Owners that currently have a record, sorted ascending.
    ///
    /// Files that are not `<integer>.json` are skipped.
    pub fn list_owners(&self) -> Result<Vec<OwnerId>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut owners = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::parse::<OwnerId>)
            {
                Some(Ok(owner)) => owners.push(owner),
                _ => warn!(path = %path.display(), "skipping unrecognized settings file"),
            }
        }

        owners.sort();
        Ok(owners)
    }

    /// Ensure the base directory exists with restrictive permissions.
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.base_dir, perms)?;
        }

        Ok(())
    }

    fn record_path(&self, owner: OwnerId) -> PathBuf {
        self.base_dir.join(format!("{owner}.json"))
    }

    fn ensure_owner(&self, owner: OwnerId) -> Result<()> {
        if self.owners.contains(owner) {
            Ok(())
        } else {
            Err(SecretError::OwnerNotFound(owner))
        }
    }

    fn read_record(&self, owner: OwnerId) -> Result<Option<UserSettings>> {
        let path = self.record_path(owner);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&path)?;
        let settings: UserSettings = serde_json::from_str(&data)?;
        if settings.owner_id != owner {
            return Err(SecretError::StorageError(format!(
                "{} holds the record of owner {}",
                path.display(),
                settings.owner_id
            )));
        }
        Ok(Some(settings))
    }

    fn write_record(&self, settings: &UserSettings) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(settings)?;
        let path = self.record_path(settings.owner_id);
        debug!(owner_id = %settings.owner_id, path = %path.display(), "writing settings record");
        write_record_file(&path, json.as_bytes())
    }
}

/// Write `data` to `path` atomically with mode 0600 on Unix.
///
/// Every call stages into its own temp file in the same directory, so
/// concurrent writers for one owner never share a partial file. The temp
/// file is created 0600 and the rename replaces `path` in one step.
fn write_record_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| SecretError::Io(e.error))?;
    Ok(())
}

impl SettingsStore for FileSettingsStore {
    fn get_or_create(&self, owner: OwnerId) -> Result<UserSettings> {
        self.ensure_owner(owner)?;
        if let Some(settings) = self.read_record(owner)? {
            return Ok(settings);
        }

        debug!(owner_id = %owner, "creating settings record");
        let settings = UserSettings::new(owner);
        self.write_record(&settings)?;
        Ok(settings)
    }

    fn find(&self, owner: OwnerId) -> Result<Option<UserSettings>> {
        self.read_record(owner)
    }

    fn save(&self, settings: UserSettings) -> Result<UserSettings> {
        let owner = settings.owner_id;
        self.ensure_owner(owner)?;
        let existing = self.read_record(owner)?;
        let settings = prepare_for_save(settings, existing.as_ref())?;
        self.write_record(&settings)?;
        Ok(settings)
    }
}
