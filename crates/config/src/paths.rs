//! Filesystem locations

use std::path::{Path, PathBuf};

/// Data directory (~/.marketeer)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".marketeer"))
        .unwrap_or_else(|| PathBuf::from(".marketeer"))
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default business profile location
pub fn profile_path() -> PathBuf {
    data_dir().join("business_profile.txt")
}

/// Expand a leading `~` against the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Ensure directory exists
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}
