//! Conversation Store (SPEC §4.10): tenant-scoped conversations, messages
//! and suggestion audits.

mod schema;
mod store;

pub use store::{ConversationStore, SqliteConversationStore};
