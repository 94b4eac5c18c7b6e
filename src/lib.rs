//! Conversation history for the meal recommendation chat assistant.
//!
//! [`ConversationStore`] keeps the saved chats, the conversation currently
//! being written to, and the sidebar projection. Storage is pluggable through
//! [`Persister`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::PersistError;
pub use models::{Conversation, ConversationSummary, Message, Role};
pub use services::{
    ConversationStore, Database, FilePersister, HistorySettings, Locale, MemoryPersister,
    Persister, SaveDebouncer, SettingsService, SqlitePersister,
};
