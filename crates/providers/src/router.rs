//! Provider selection: builds the generation backend from config.

use std::sync::Arc;
use taskbot_config::AppConfig;
use taskbot_core::provider::Provider;
use tracing::{info, warn};

use crate::gemini::GeminiProvider;
use crate::timeout::TimeoutProvider;
use crate::unconfigured::UnconfiguredProvider;

/// Build the provider from configuration.
///
/// Without a usable API key this logs a warning and returns the degraded
/// [`UnconfiguredProvider`]; startup never fails on a missing credential.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let Some(api_key) = config.usable_api_key() else {
        warn!("GEMINI_API_KEY is not configured; every reply will use the canned fallback");
        warn!("Get a key at https://makersuite.google.com/app/apikey");
        return Arc::new(UnconfiguredProvider::new(
            "GEMINI_API_KEY is missing or still set to the placeholder",
        ));
    };

    let gemini = GeminiProvider::new(&config.provider.base_url, api_key, &config.model)
        .with_temperature(config.provider.temperature);

    let provider = TimeoutProvider::new(Arc::new(gemini), config.provider.timeout());
    info!(
        model = %config.model,
        timeout_secs = provider.timeout().as_secs(),
        "Gemini provider configured"
    );

    Arc::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskbot_config::PLACEHOLDER_API_KEY;

    #[test]
    fn missing_key_is_degraded() {
        let config = AppConfig::default();
        let provider = build_from_config(&config);
        assert!(!provider.is_configured());
        assert_eq!(provider.name(), "unconfigured");
    }

    #[test]
    fn placeholder_key_is_degraded() {
        let config = AppConfig {
            api_key: Some(PLACEHOLDER_API_KEY.into()),
            ..AppConfig::default()
        };
        assert!(!build_from_config(&config).is_configured());
    }

    #[test]
    fn real_key_builds_gemini() {
        let config = AppConfig {
            api_key: Some("AIza-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config);
        assert!(provider.is_configured());
        assert_eq!(provider.name(), "gemini");
    }
}
