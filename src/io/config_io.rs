use std::fs;
use std::path::{Path, PathBuf};

use crate::io::storage::StorageError;
use crate::model::config::AppConfig;

/// Name of the data directory created by `sprig init`.
pub const DATA_DIR_NAME: &str = "sprig";

const CONFIG_FILE: &str = "config.toml";

const CONFIG_TEMPLATE: &str = "\
# sprig configuration

[storage]
# Base name for the data file and its backups
key = \"taskdata\"
# Quiet period (milliseconds) before a debounced auto-save fires
autosave_delay_ms = 1000
# Rolling backups retained per save
backup_count = 5

# Uncomment to mirror edits to a remote server
# [remote]
# url = \"http://localhost:4000\"
";

/// Discover the data directory by walking up from `start`, looking for a
/// `sprig/` subdirectory with a config.toml inside it.
pub fn discover_dir(start: &Path) -> Result<PathBuf, StorageError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.is_dir() && data_dir.join(CONFIG_FILE).exists() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(StorageError::NotADataDir);
        }
    }
}

/// Read and parse `config.toml` from a data directory.
pub fn load_config(data_dir: &Path) -> Result<AppConfig, StorageError> {
    let text = fs::read_to_string(data_dir.join(CONFIG_FILE))?;
    Ok(toml::from_str(&text)?)
}

/// Create `sprig/` under `root` with a default config.toml. Refuses to
/// overwrite an existing config unless `force` is set.
pub fn init_dir(root: &Path, force: bool) -> Result<PathBuf, StorageError> {
    let data_dir = root.join(DATA_DIR_NAME);
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(StorageError::AlreadyInitialized);
    }
    fs::create_dir_all(&data_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    Ok(data_dir)
}
