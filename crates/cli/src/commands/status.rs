//! `taskbot status`: Show resolved configuration.

use taskbot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🤖 TaskBot Status");
    println!("================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Model:          {}", config.model);
    println!(
        "  API key:        {}",
        if config.has_api_key() {
            "configured"
        } else {
            "missing (fallback replies only)"
        }
    );
    println!("  Endpoint:       {}", config.provider.base_url);
    println!("  Timeout:        {}s", config.provider.timeout_secs);
    println!("  Temperature:    {}", config.provider.temperature);
    println!(
        "  Gateway:        {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "  History:        {} turns kept, {} sent per prompt",
        config.conversation.max_turns, config.conversation.history_window
    );
    println!(
        "  Fallback turns: {}",
        if config.conversation.record_fallback_replies {
            "recorded"
        } else {
            "not recorded"
        }
    );
    println!("  Max users:      {}", config.conversation.max_users);
    println!("  Idle TTL:       {}s", config.conversation.idle_ttl_secs);
    println!(
        "  System prompt:  {}",
        if config.prompt.system_prompt_override.is_some() {
            "custom"
        } else {
            "built-in"
        }
    );

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — using defaults (run `taskbot onboard` to create one)");
    }

    Ok(())
}
