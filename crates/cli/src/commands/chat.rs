//! `taskbot chat`: Interactive or single-message chat from the terminal.
//!
//! Uses the same handler as the HTTP API, so replies fall back to the canned
//! answers when no API key is configured.

use std::io::Write;
use std::sync::Arc;
use taskbot_agent::{ChatHandler, ReplySource};
use taskbot_config::AppConfig;
use taskbot_memory::ConversationStore;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    user_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = taskbot_providers::build_from_config(&config);
    let store = Arc::new(ConversationStore::new(
        config.conversation.max_turns,
        config.conversation.max_users,
    ));
    let handler = ChatHandler::from_config(&config, provider, store);
    let user_id = user_id.as_deref();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = handler.handle(user_id, &msg).await;
        eprint!("\r              \r");
        println!("{}", reply?.reply);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Task Manager ChatBot — Terminal       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!(
        "  AI:        {}",
        if handler.provider().is_configured() {
            "Gemini"
        } else {
            "offline (canned replies)"
        }
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  Você > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("sair") {
            break;
        }

        if !line.is_empty() {
            eprint!("  ...");
            match handler.handle(user_id, line).await {
                Ok(chat) => {
                    eprint!("\r     \r");
                    println!();
                    let prefix = match chat.source {
                        ReplySource::Ai => "Bot",
                        ReplySource::Fallback => "Bot (offline)",
                    };
                    for reply_line in chat.reply.lines() {
                        println!("  {prefix} > {reply_line}");
                    }
                    println!();
                }
                Err(e) => {
                    eprint!("\r     \r");
                    eprintln!("  [Erro] {e}");
                    println!();
                }
            }
        }

        print!("  Você > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Até logo! 👋");
    println!();

    Ok(())
}
