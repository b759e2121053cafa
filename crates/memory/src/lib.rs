//! Conversation history storage for TaskBot.
//!
//! History lives only for the lifetime of the process.

pub mod store;

pub use store::{ConversationStore, SessionGuard};
