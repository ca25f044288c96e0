//! `concierge doctor`: Diagnose configuration and backend health.

use concierge_config::AppConfig;
use concierge_core::provider::Provider;
use concierge_tools::{RestTravelClient, TravelApi};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Concierge Doctor - System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  [ok]   Config file found at {}", config_path.display());
    } else {
        println!("  [info] No config file, using defaults and environment");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Configuration valid");
            config
        }
        Err(e) => {
            println!("  [fail] Configuration invalid: {e}");
            println!("\n  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
        let router = concierge_providers::build_from_config(&config);
        match router.default() {
            Some(provider) => match provider.health_check().await {
                Ok(true) => println!("  [ok]   Model provider '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  [warn] Model provider '{}' answered but is not healthy", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  [fail] Model provider '{}': {e}", provider.name());
                    issues += 1;
                }
            },
            None => {
                println!("  [fail] No provider named '{}'", config.default_provider);
                issues += 1;
            }
        }
    } else {
        println!("  [warn] No API key configured - set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match RestTravelClient::from_config(&config.travel_api) {
        Ok(client) => match client.health().await {
            Ok(health) => println!(
                "  [ok]   Travel API {} is {}",
                config.travel_api.base_url, health.status
            ),
            Err(e) => {
                println!("  [fail] Travel API {}: {e}", config.travel_api.base_url);
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] Travel API client: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
