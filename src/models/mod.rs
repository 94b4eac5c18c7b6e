pub mod conversation;
pub mod message;

pub use conversation::{Conversation, ConversationSummary, StoredConversation};
pub use message::{Message, Nutrition, Recipe, Role, Video};
