//! Provider trait: the abstraction over the text-generation backend.
//!
//! A Provider takes one fully assembled prompt string and returns the
//! generated text. The chat handler never knows which backend it talks to.
//!
//! Implementations: Gemini, the degraded-mode unconfigured stub, and the
//! timeout wrapper.

use async_trait::async_trait;

use crate::error::ProviderError;

/// The core Provider trait.
///
/// A single call per prompt: no retries, no streaming. Any failure is
/// reported as a [`ProviderError`], which callers treat as "use the fallback".
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and get the generated text.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;

    /// Whether a usable credential was supplied at startup.
    ///
    /// `false` means every `generate` call will fail (degraded mode).
    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn trait_object_dispatch() {
        let provider: Box<dyn Provider> = Box::new(Echo);
        assert_eq!(provider.name(), "echo");
        assert!(provider.is_configured());
        assert_eq!(provider.generate("oi").await.unwrap(), "OI");
    }
}
