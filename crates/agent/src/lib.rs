//! Chat handling for TaskBot.
//!
//! One request flows through:
//!
//! 1. **Record** the user turn in the conversation store
//! 2. **Assemble** the prompt (system prompt + recent history + message)
//! 3. **Generate** a reply through the configured provider
//! 4. **Fall back** to a canned keyword-matched reply if generation fails
//!
//! The handler never surfaces a generation failure to its caller.

pub mod fallback;
pub mod handler;
pub mod prompt;

pub use fallback::fallback_reply;
pub use handler::{ChatError, ChatHandler, ChatReply, DEFAULT_USER_ID, ReplySource};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, PromptAssembler};
