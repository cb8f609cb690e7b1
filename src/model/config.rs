use serde::{Deserialize, Serialize};

/// Configuration from `sprig/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Base name for the primary slot and its backups.
    #[serde(default = "default_key")]
    pub key: String,
    /// Quiet period before a debounced auto-save fires.
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    /// How many rolling backups to retain.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_key(),
            autosave_delay_ms: default_autosave_delay_ms(),
            backup_count: default_backup_count(),
        }
    }
}

fn default_key() -> String {
    "taskdata".to_string()
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

fn default_backup_count() -> usize {
    5
}

/// Remote mirror settings. No url means mirroring is disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: Option<String>,
}
