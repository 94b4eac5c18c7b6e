pub mod conversation;
pub mod database;
pub mod debounce;
pub mod export;
pub mod history;
pub mod persister;
pub mod settings;
pub mod timestamp;

pub use database::Database;
pub use debounce::{SaveDebouncer, SharedStore};
pub use history::ConversationStore;
pub use persister::{FilePersister, MemoryPersister, Persister, SqlitePersister};
pub use settings::{HistorySettings, Locale, SettingsService};
