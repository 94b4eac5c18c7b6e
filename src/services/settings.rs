use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::database::Database;
use crate::config::{MAX_CONVERSATIONS, SAVE_DEBOUNCE_MS, STORAGE_KEY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub storage_key: String,
    pub capacity: usize,
    pub locale: Locale,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    English,
    Vietnamese,
}

impl Locale {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "en" | "en-US" | "english" => Some(Locale::English),
            "vi" | "vi-VN" | "vietnamese" => Some(Locale::Vietnamese),
            _ => None,
        }
    }

    /// Title given to conversations with no user text to derive one from.
    pub fn placeholder_title(&self) -> &'static str {
        match self {
            Locale::English => "New conversation",
            Locale::Vietnamese => "Cuộc trò chuyện mới",
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            capacity: MAX_CONVERSATIONS,
            locale: Locale::English,
            debounce_ms: SAVE_DEBOUNCE_MS,
        }
    }
}

impl HistorySettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub struct SettingsService;

impl SettingsService {
    const KEY: &'static str = "history_settings";

    pub fn load(db: &Database) -> HistorySettings {
        match db.get_setting(Self::KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt history settings: {}", e);
                HistorySettings::default()
            }),
            Ok(None) => HistorySettings::default(),
            Err(e) => {
                tracing::error!("Failed to read history settings: {}", e);
                HistorySettings::default()
            }
        }
    }

    pub fn save(db: &Database, settings: &HistorySettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        db.set_setting(Self::KEY, &json)
    }
}
