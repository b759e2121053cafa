//! Error types for the TaskBot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; crates at the edges wrap
//! these in their own error types.

use thiserror::Error;

// --- Bounded context errors ---

/// A failed generation call. Every variant is recoverable by the chat
/// handler through the canned fallback replies.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no text: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Conversation store is full ({capacity} users) and every conversation is busy")]
    CapacityExhausted { capacity: usize },
}
