//! `taskbot doctor`: Diagnose configuration problems.

use taskbot_config::{AppConfig, PLACEHOLDER_API_KEY};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 TaskBot Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — defaults will be used");
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            match config.api_key.as_deref() {
                _ if config.has_api_key() => println!("  ✅ GEMINI_API_KEY configured"),
                Some(key) if key.trim() == PLACEHOLDER_API_KEY => {
                    println!("  ❌ GEMINI_API_KEY is still the placeholder '{PLACEHOLDER_API_KEY}'");
                    issues += 1;
                }
                _ => {
                    println!("  ❌ GEMINI_API_KEY not set — every reply will be a canned fallback");
                    println!("     Get one at https://makersuite.google.com/app/apikey");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
