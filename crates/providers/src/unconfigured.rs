//! Degraded-mode provider used when no usable credential is configured.

use async_trait::async_trait;
use taskbot_core::error::ProviderError;

/// Fails every call immediately with [`ProviderError::NotConfigured`].
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl taskbot_core::Provider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(self.reason.clone()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
