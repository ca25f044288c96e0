//! `concierge chat`: Single-message or interactive chat.

use concierge_agent::Orchestrator;
use concierge_config::AppConfig;
use concierge_core::event::EventBus;
use concierge_tools::{RestTravelClient, travel_registry};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY      = 'sk-...'");
        eprintln!("    CONCIERGE_API_KEY   = 'sk-...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = concierge_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let api = Arc::new(RestTravelClient::from_config(&config.travel_api)?);
    let tools = Arc::new(travel_registry(api));
    let orchestrator = Orchestrator::from_config(&config, provider, tools, Arc::new(EventBus::default()));

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = orchestrator.handle(&msg, session.as_deref()).await?;
        eprint!("\r              \r");
        println!("{}", render(&reply.response));
        eprintln!("  session: {}", reply.session_id);
        return Ok(());
    }

    println!();
    println!("  Concierge - interactive mode");
    println!();
    println!("  Model:      {}", config.default_model);
    println!("  Travel API: {}", config.travel_api.base_url);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut session = session;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        if line.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        eprint!("  ...");
        match orchestrator.handle(line, session.as_deref()).await {
            Ok(reply) => {
                eprint!("\r     \r");
                println!();
                for text in render(&reply.response).lines() {
                    println!("  Assistant > {text}");
                }
                println!();
                session = Some(reply.session_id.to_string());
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// Text replies print as is; structured results print as JSON.
fn render(response: &Value) -> String {
    match response {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}
