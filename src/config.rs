use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub const APP_ID: &str = "meal-chat";

/// Name of the durable slot holding the serialized conversation list.
pub const STORAGE_KEY: &str = "meal-chat-history";

pub const MAX_CONVERSATIONS: usize = 50;
pub const TITLE_MAX_CHARS: usize = 50;
pub const SAVE_DEBOUNCE_MS: u64 = 500;

/// `$XDG_DATA_HOME/meal-chat/history.db`, falling back to `~/.local/share`.
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = match std::env::var("XDG_DATA_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set"))?;
            PathBuf::from(home).join(".local/share")
        }
    };
    Ok(data_dir.join(APP_ID).join("history.db"))
}
