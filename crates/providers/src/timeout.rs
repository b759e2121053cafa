//! Provider deadline: bounds every generation call.
//!
//! The upstream call is the only blocking step of a chat request. A hung
//! call is cut off after the configured duration and reported as
//! [`ProviderError::Timeout`], so the caller falls back like any other failure.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskbot_core::Provider;
use taskbot_core::error::ProviderError;
use tracing::warn;

/// A provider that wraps another provider and enforces a deadline.
pub struct TimeoutProvider {
    inner: Arc<dyn Provider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn Provider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Provider for TimeoutProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = %self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Provider timed out"
                );
                Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}ms",
                    self.inner.name(),
                    self.timeout.as_millis()
                )))
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A mock provider that always succeeds.
    struct SuccessProvider {
        call_count: Mutex<usize>,
    }

    impl SuccessProvider {
        fn new() -> Self {
            Self {
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for SuccessProvider {
        fn name(&self) -> &str {
            "success"
        }

        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            Ok("success".into())
        }
    }

    /// A mock provider that always fails.
    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            Err(ProviderError::Network("conn refused".into()))
        }
    }

    /// A mock provider that hangs forever (for timeout testing).
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    #[tokio::test]
    async fn passes_through_success() {
        let inner = Arc::new(SuccessProvider::new());
        let p = TimeoutProvider::new(inner.clone(), Duration::from_secs(30));

        assert_eq!(p.generate("oi").await.unwrap(), "success");
        assert_eq!(inner.calls(), 1);
        assert_eq!(p.name(), "success");
    }

    #[tokio::test]
    async fn passes_through_failure() {
        let p = TimeoutProvider::new(Arc::new(FailingProvider), Duration::from_secs(30));
        match p.generate("oi").await.unwrap_err() {
            ProviderError::Network(_) => {}
            other => panic!("Expected Network, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn hung_call_becomes_timeout() {
        let p = TimeoutProvider::new(Arc::new(HangingProvider), Duration::from_millis(50));
        match p.generate("oi").await.unwrap_err() {
            ProviderError::Timeout(msg) => assert!(msg.contains("hanging")),
            other => panic!("Expected Timeout, got: {other:?}"),
        }
    }

    #[test]
    fn reports_inner_configuration() {
        let p = TimeoutProvider::new(
            Arc::new(crate::UnconfiguredProvider::new("x")),
            Duration::from_secs(30),
        );
        assert!(!p.is_configured());
        assert_eq!(p.timeout(), Duration::from_secs(30));
    }
}
