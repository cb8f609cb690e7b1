use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::model::snapshot::{
    default_categories, default_properties, Snapshot, SnapshotPatch, UserProfile, ViewMode,
    SNAPSHOT_VERSION,
};
use crate::model::category::CATEGORY_ALL;
use crate::util::ids::monotonic_millis;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid snapshot format: {0}")]
    InvalidFormat(String),
    #[error("could not parse config.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("not a sprig data directory: no sprig/config.toml found")]
    NotADataDir,
    #[error("data directory already initialized (use --force to overwrite)")]
    AlreadyInitialized,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Slot naming and retention policy for one storage instance.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base name: the primary slot is `<key>.json`, backups are
    /// `<key>_backup_<stamp>.json`.
    pub key: String,
    /// Rolling backups retained after each save.
    pub backup_count: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: "taskdata".to_string(),
            backup_count: 5,
        }
    }
}

/// Size and freshness info reported by [`Storage::stats`].
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub size_bytes: usize,
    pub backup_count: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Snapshot store over a directory: a primary slot plus rolling
/// timestamped backups, all sharing the snapshot schema.
#[derive(Debug)]
pub struct Storage {
    dir: PathBuf,
    config: StorageConfig,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>, config: StorageConfig) -> Self {
        Storage {
            dir: dir.into(),
            config,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn primary_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.config.key))
    }

    fn backup_prefix(&self) -> String {
        format!("{}_backup_", self.config.key)
    }

    /// Backup files in ascending stamp order (stamps are fixed-width, so
    /// lexicographic filename order is chronological).
    fn backup_paths(&self) -> Vec<PathBuf> {
        let prefix = self.backup_prefix();
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            .collect();
        names.sort();
        names.into_iter().map(|name| self.dir.join(name)).collect()
    }

    /// Merge `patch` onto the stored snapshot, stamp version and
    /// last-modified, and persist: primary slot first, then a timestamped
    /// backup, then prune old backups. A primary-slot write failure
    /// propagates; backup and prune failures only warn.
    pub fn save(&self, patch: SnapshotPatch) -> Result<Snapshot, StorageError> {
        let mut snapshot = self.load();
        patch.apply(&mut snapshot);
        snapshot.version = SNAPSHOT_VERSION.to_string();
        snapshot.last_modified = Some(Utc::now());

        let body = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
        let primary = self.primary_path();
        atomic_write(&primary, body.as_bytes()).map_err(|source| StorageError::WriteFailed {
            path: primary,
            source,
        })?;

        self.write_backup(body.as_bytes());
        self.prune_backups();
        Ok(snapshot)
    }

    /// Load the stored snapshot. Never fails outward: an absent or
    /// unparsable primary slot falls back to the newest valid backup, and
    /// failing that, the seeded default.
    pub fn load(&self) -> Snapshot {
        match fs::read_to_string(self.primary_path()) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(raw) => validate_and_migrate(raw),
                Err(_) => self.recover_from_backup().unwrap_or_else(Snapshot::seeded),
            },
            Err(_) => self.recover_from_backup().unwrap_or_else(Snapshot::seeded),
        }
    }

    /// Newest-first walk over the backup chain, skipping entries that fail
    /// to parse.
    fn recover_from_backup(&self) -> Option<Snapshot> {
        for path in self.backup_paths().into_iter().rev() {
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<Value>(&text) {
                Ok(raw) if raw.is_object() => return Some(validate_and_migrate(raw)),
                _ => continue,
            }
        }
        None
    }

    fn write_backup(&self, body: &[u8]) {
        let path = self
            .dir
            .join(format!("{}{:013}.json", self.backup_prefix(), monotonic_millis()));
        if let Err(e) = atomic_write(&path, body) {
            eprintln!("warning: could not write backup {}: {}", path.display(), e);
        }
    }

    fn prune_backups(&self) {
        let mut paths = self.backup_paths();
        while paths.len() > self.config.backup_count {
            let victim = paths.remove(0); // oldest first
            if let Err(e) = fs::remove_file(&victim) {
                eprintln!("warning: could not prune backup {}: {}", victim.display(), e);
                break;
            }
        }
    }

    /// Pretty-printed JSON of the full stored snapshot.
    pub fn export(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(&self.load())
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))
    }

    /// Conventional filename for an export: `backup-<date>.json`.
    pub fn export_file_name() -> String {
        format!("backup-{}.json", Local::now().format("%Y-%m-%d"))
    }

    /// Parse and persist an exported snapshot. Input that is not a JSON
    /// object is rejected and the stored snapshot is left untouched;
    /// recognizable objects go through the same validate/migrate path as
    /// load.
    pub fn import(&self, text: &str) -> Result<Snapshot, StorageError> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
        if !raw.is_object() {
            return Err(StorageError::InvalidFormat(
                "expected a JSON object".to_string(),
            ));
        }
        let snapshot = validate_and_migrate(raw);
        self.save(SnapshotPatch::replace(snapshot))
    }

    /// Delete the primary slot and every backup.
    pub fn clear(&self) -> Result<(), StorageError> {
        remove_if_exists(&self.primary_path())?;
        for path in self.backup_paths() {
            remove_if_exists(&path)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> StorageStats {
        let snapshot = self.load();
        let size_bytes = serde_json::to_string(&snapshot).map(|s| s.len()).unwrap_or(0);
        StorageStats {
            size_bytes,
            backup_count: self.backup_paths().len(),
            last_modified: snapshot.last_modified,
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Defensive normalization of a raw persisted value into a snapshot.
///
/// Anything that is not an object becomes the seeded default. Within an
/// object, each top-level field is coerced independently: missing or
/// malformed fields take their defaults, and malformed elements inside the
/// three sequences are dropped rather than failing the whole load.
pub fn validate_and_migrate(raw: Value) -> Snapshot {
    let Value::Object(mut map) = raw else {
        return Snapshot::seeded();
    };

    let snapshot = Snapshot {
        user: map
            .remove("user")
            .and_then(|v| serde_json::from_value::<UserProfile>(v).ok())
            .unwrap_or_default(),
        tasks: coerce_array(map.remove("tasks")).unwrap_or_default(),
        properties: coerce_array(map.remove("properties")).unwrap_or_else(default_properties),
        categories: coerce_array(map.remove("categories")).unwrap_or_else(default_categories),
        current_view: map
            .remove("currentView")
            .and_then(|v| serde_json::from_value::<ViewMode>(v).ok())
            .unwrap_or_default(),
        current_category: map
            .remove("currentCategory")
            .and_then(|v| serde_json::from_value::<Option<String>>(v).ok())
            .flatten()
            .or_else(|| Some(CATEGORY_ALL.to_string())),
        version: map
            .remove("version")
            .and_then(|v| serde_json::from_value::<String>(v).ok())
            .unwrap_or_else(|| SNAPSHOT_VERSION.to_string()),
        last_modified: map
            .remove("lastModified")
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v).ok())
            .or_else(|| Some(Utc::now())),
    };

    migrate(snapshot)
}

/// Version-tag migration hook. Nothing to migrate yet; future schema
/// changes branch on `snapshot.version` here.
fn migrate(snapshot: Snapshot) -> Snapshot {
    snapshot
}

/// Coerce an optional value into a typed vec: non-arrays yield `None`,
/// array elements that fail to parse are dropped.
fn coerce_array<T: DeserializeOwned>(value: Option<Value>) -> Option<Vec<T>> {
    match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    }
}
