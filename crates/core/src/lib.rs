//! # TaskBot Core
//!
//! Domain types, traits, and error definitions for the TaskBot chat service.
//! This crate has **no framework dependencies**: it defines the model that
//! the provider, memory, agent, and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: turns and conversations
//! - [`provider`]: the text-generation backend trait
//! - [`error`]: the error taxonomy shared across crates

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{MemoryError, ProviderError};
pub use message::{Conversation, Role, Turn};
pub use provider::Provider;
