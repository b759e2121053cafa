//! `taskbot serve`: Start the HTTP API server.

use taskbot_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("{}", "━".repeat(50));
    println!("🤖 Task Manager ChatBot");
    println!("{}", "━".repeat(50));
    println!(
        "📍 Servidor: http://{}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("💬 Endpoint: POST /chat");
    println!("💚 Health: GET /health");
    println!("{}", "━".repeat(50));

    taskbot_gateway::start(config).await?;

    Ok(())
}
