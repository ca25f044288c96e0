//! `concierge serve`: Start the HTTP API server.

use concierge_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        return Err("No API key configured. Set OPENAI_API_KEY or run `concierge doctor`.".into());
    }

    println!("Concierge API");
    println!("   Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:      {} ({})", config.default_model, config.default_provider);
    println!("   Travel API: {}", config.travel_api.base_url);

    concierge_gateway::start(config).await?;

    Ok(())
}
