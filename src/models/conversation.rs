use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// Sidebar row: the only view of the store handed to rendering code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub pinned: bool,
    pub order: Option<u32>,
}

/// A record as it may appear in the slot, including ones written by older
/// clients: `pinned`/`order` absent, `timestamp` holding a display string
/// such as "2 giờ trước" instead of an instant.
#[derive(Debug, Deserialize)]
pub struct StoredConversation {
    id: serde_json::Value,
    #[serde(default)]
    title: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
    #[serde(default)]
    messages: Option<Vec<Message>>,
    #[serde(default)]
    pinned: Option<serde_json::Value>,
    #[serde(default)]
    order: Option<serde_json::Value>,
}

impl StoredConversation {
    /// Fill in documented defaults. Returns `None` when the record has no
    /// usable id.
    pub fn migrate(self, now: DateTime<Utc>, placeholder_title: &str) -> Option<Conversation> {
        let id = match self.id {
            serde_json::Value::String(s) if !s.trim().is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };

        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(|t| t.as_str())
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .or_else(|| instant_from_millis_id(&id))
            .unwrap_or(now);

        // Only whole, in-range keys are trusted; the store renumbers the
        // rest of the partition densely after loading.
        let order = self
            .order
            .as_ref()
            .and_then(|v| v.as_f64())
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32);

        Some(Conversation {
            title: self
                .title
                .as_ref()
                .and_then(|t| t.as_str())
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| placeholder_title.to_string()),
            id,
            timestamp,
            messages: self.messages.unwrap_or_default(),
            pinned: self.pinned.as_ref().and_then(|p| p.as_bool()).unwrap_or(false),
            order,
        })
    }
}

// Older clients used `Date.now().toString()` as the id.
fn instant_from_millis_id(id: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = id.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
