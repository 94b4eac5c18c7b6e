//! Conversation history store.
//!
//! Owns the list of saved conversations and the "current conversation"
//! pointer. Every mutation is written through to the injected [`Persister`];
//! a failed write is logged and the in-memory state stays authoritative.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Conversation, ConversationSummary, Message, StoredConversation};
use crate::services::conversation::derive_title;
use crate::services::persister::Persister;
use crate::services::settings::HistorySettings;
use crate::services::timestamp::format_relative;

pub struct ConversationStore<P: Persister> {
    persister: P,
    settings: HistorySettings,
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    last_write_error: Option<String>,
}

impl<P: Persister> ConversationStore<P> {
    /// Load the collection from `persister`. A missing, unreadable or corrupt
    /// slot yields an empty store.
    pub fn init(persister: P, settings: HistorySettings) -> Self {
        let conversations = match persister.load() {
            Ok(Some(bytes)) => decode_collection(&bytes, Utc::now(), &settings),
            Ok(None) => {
                tracing::debug!("No saved chat history, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Failed to read chat history: {}", e);
                Vec::new()
            }
        };
        tracing::info!("Loaded {} conversations", conversations.len());

        Self {
            persister,
            settings,
            conversations,
            current_id: None,
            last_write_error: None,
        }
    }

    /// Write the collection one last time and hand back the persister.
    pub fn close(mut self) -> P {
        self.persist();
        self.persister
    }

    pub fn settings(&self) -> &HistorySettings {
        &self.settings
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Message of the most recent failed write, cleared by the next good one.
    pub fn last_write_error(&self) -> Option<&str> {
        self.last_write_error.as_deref()
    }

    /// Record a finished message batch. Updates the current conversation, or
    /// creates one when nothing is current. Returns the id written to.
    pub fn save(&mut self, messages: Vec<Message>) -> Option<String> {
        if messages.is_empty() {
            return None;
        }

        let now = Utc::now();
        let existing = self
            .current_id
            .as_deref()
            .and_then(|id| self.conversations.iter_mut().find(|c| c.id == id));

        let id = match existing {
            Some(conv) => {
                conv.messages = messages;
                conv.timestamp = now;
                conv.id.clone()
            }
            None => self.create(messages, now),
        };

        self.persist();
        Some(id)
    }

    fn create(&mut self, messages: Vec<Message>, now: DateTime<Utc>) -> String {
        let id = self.next_id();
        let title = derive_title(&messages, self.settings.locale.placeholder_title());
        tracing::debug!("Creating conversation {} ({})", id, title);

        self.conversations.insert(
            0,
            Conversation {
                id: id.clone(),
                title,
                timestamp: now,
                messages,
                pinned: false,
                order: None,
            },
        );
        self.current_id = Some(id.clone());

        let capacity = self.settings.capacity.max(1);
        if self.conversations.len() > capacity {
            for evicted in self.conversations.drain(capacity..) {
                tracing::debug!("Evicted conversation {}", evicted.id);
            }
        }

        id
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::now_v7().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Messages of conversation `id`, which becomes current. Unknown ids
    /// leave the current pointer alone.
    pub fn load(&mut self, id: &str) -> Option<Vec<Message>> {
        let messages = self.get(id)?.messages.clone();
        self.current_id = Some(id.to_string());
        Some(messages)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let removed = self.conversations.remove(index);
        if self.current_id.as_deref() == Some(id) {
            self.current_id = None;
        }
        self.renumber(removed.pinned);
        self.persist();
        true
    }

    /// Toggle the pin. A newly pinned conversation joins the end of the
    /// pinned group; an unpinned one goes to the head of the rest.
    pub fn pin(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let mut conv = self.conversations.remove(index);
        conv.pinned = !conv.pinned;
        conv.order = None;
        let pinned = conv.pinned;

        self.partition_pinned();
        let boundary = self.conversations.iter().filter(|c| c.pinned).count();
        self.conversations.insert(boundary, conv);

        self.renumber(true);
        self.renumber(false);
        self.persist();
        tracing::debug!("Conversation {} pinned={}", id, pinned);
        true
    }

    pub fn rename(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if conv.title == title {
            return false;
        }
        conv.title = title.to_string();
        self.persist();
        true
    }

    /// Apply a drag-and-drop result. Listed ids are placed first, in the given
    /// order, within their partition; unlisted members follow unchanged. A
    /// partition with no listed ids keeps its order and `order` keys.
    pub fn reorder<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> bool {
        let mut seen = HashSet::new();
        let requested: Vec<String> = ordered_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.get(id).is_some() && seen.insert(*id))
            .map(str::to_string)
            .collect();
        if requested.is_empty() {
            return false;
        }

        let (pinned, unpinned): (Vec<_>, Vec<_>) =
            self.conversations.drain(..).partition(|c| c.pinned);
        let touches = |group: &[Conversation]| {
            group
                .iter()
                .any(|c| requested.iter().any(|id| *id == c.id))
        };

        let pinned = if touches(pinned.as_slice()) {
            arrange(pinned, &requested)
        } else {
            pinned
        };
        let unpinned = if touches(unpinned.as_slice()) {
            arrange(unpinned, &requested)
        } else {
            unpinned
        };

        self.conversations = pinned;
        self.conversations.extend(unpinned);
        self.persist();
        true
    }

    /// Move `id` to `index` within its own partition.
    pub fn move_to(&mut self, id: &str, index: usize) -> bool {
        let Some(pinned) = self.get(id).map(|c| c.pinned) else {
            return false;
        };
        let mut ids: Vec<String> = self
            .conversations
            .iter()
            .filter(|c| c.pinned == pinned && c.id != id)
            .map(|c| c.id.clone())
            .collect();
        ids.insert(index.min(ids.len()), id.to_string());
        self.reorder(ids.as_slice())
    }

    /// Forget the current conversation; the next `save` starts a new one.
    pub fn start_new(&mut self) {
        self.current_id = None;
    }

    pub fn list(&self) -> Vec<ConversationSummary> {
        self.list_at(Utc::now())
    }

    /// Sidebar rows in render order, pinned first, timestamps relative to `now`.
    pub fn list_at(&self, now: DateTime<Utc>) -> Vec<ConversationSummary> {
        let pinned = self.conversations.iter().filter(|c| c.pinned);
        let unpinned = self.conversations.iter().filter(|c| !c.pinned);
        pinned
            .chain(unpinned)
            .map(|c| ConversationSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                timestamp: format_relative(c.timestamp, now, self.settings.locale),
                pinned: c.pinned,
                order: c.order,
            })
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    fn partition_pinned(&mut self) {
        let (pinned, unpinned): (Vec<_>, Vec<_>) =
            self.conversations.drain(..).partition(|c| c.pinned);
        self.conversations = pinned;
        self.conversations.extend(unpinned);
    }

    fn renumber(&mut self, pinned: bool) {
        renumber_partition(&mut self.conversations, pinned);
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec(&self.conversations)
            .map_err(|e| e.to_string())
            .and_then(|bytes| self.persister.save(&bytes).map_err(|e| e.to_string()));

        match result {
            Ok(()) => self.last_write_error = None,
            Err(e) => {
                tracing::error!("Failed to save chat history: {}", e);
                self.last_write_error = Some(e);
            }
        }
    }
}

fn arrange(members: Vec<Conversation>, requested: &[String]) -> Vec<Conversation> {
    let mut rest = members;
    let mut arranged = Vec::with_capacity(rest.len());
    for id in requested {
        if let Some(pos) = rest.iter().position(|c| c.id == *id) {
            arranged.push(rest.remove(pos));
        }
    }
    arranged.extend(rest);
    for (i, conv) in arranged.iter_mut().enumerate() {
        conv.order = Some(i as u32);
    }
    arranged
}

// Keep `order` dense, by list position, in partitions that carry keys.
fn renumber_partition(conversations: &mut [Conversation], pinned: bool) {
    let has_order = conversations
        .iter()
        .any(|c| c.pinned == pinned && c.order.is_some());
    if !has_order {
        return;
    }
    for (i, conv) in conversations
        .iter_mut()
        .filter(|c| c.pinned == pinned)
        .enumerate()
    {
        conv.order = Some(i as u32);
    }
}

/// Parse a persisted slot. Records that cannot be read are skipped; a slot
/// that is not a JSON array yields nothing.
pub fn decode_collection(
    bytes: &[u8],
    now: DateTime<Utc>,
    settings: &HistorySettings,
) -> Vec<Conversation> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Vec::new();
    }

    let records: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Discarding unreadable chat history: {}", e);
            return Vec::new();
        }
    };

    let placeholder = settings.locale.placeholder_title();
    let mut seen = HashSet::new();
    let mut conversations = Vec::with_capacity(records.len());
    for record in records {
        let conv = serde_json::from_value::<StoredConversation>(record)
            .ok()
            .and_then(|raw| raw.migrate(now, placeholder));
        match conv {
            Some(conv) if seen.insert(conv.id.clone()) => conversations.push(conv),
            Some(conv) => tracing::warn!("Dropping duplicate conversation {}", conv.id),
            None => tracing::warn!("Skipping malformed conversation record"),
        }
    }

    let capacity = settings.capacity.max(1);
    if conversations.len() > capacity {
        tracing::warn!(
            "Chat history holds {} conversations, keeping the first {}",
            conversations.len(),
            capacity
        );
        conversations.truncate(capacity);
    }

    renumber_partition(&mut conversations, true);
    renumber_partition(&mut conversations, false);
    conversations
}
