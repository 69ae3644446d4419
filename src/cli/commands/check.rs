//! Check Command
//!
//! Run a health probe against every adapter the router would use.

use std::time::Duration;

use crate::ai::timeout::with_timeout_map;
use crate::cli::{Output, is_json};
use crate::config::Config;
use crate::constants::network;
use crate::router::Router;
use crate::types::{Result, RouterError};

pub async fn run(config: &Config, format: &str) -> Result<()> {
    let router = Router::from_config(config)?;
    let health = with_timeout_map(
        Duration::from_secs(network::MAX_REQUEST_TIMEOUT_SECS),
        router.check_providers(),
        "provider health check",
    )
    .await?;

    let unhealthy = health.iter().filter(|h| !h.healthy).count();

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        let output = Output::new();
        output.section(&format!("Providers ({})", config.environment));
        for entry in &health {
            let mut roles: Vec<String> = entry.tiers.iter().map(ToString::to_string).collect();
            if entry.enhancer {
                roles.push("enhancer".to_string());
            }
            let line = format!("{} [{}]", entry.provider, roles.join(", "));
            if entry.healthy {
                output.success(&line);
            } else {
                output.error(&line);
            }
        }
        if !router.has_enhancer() {
            output.warning("Prompt enhancement is disabled");
        }
    }

    if unhealthy > 0 {
        return Err(RouterError::Unhealthy {
            unhealthy,
            total: health.len(),
        });
    }
    Ok(())
}
