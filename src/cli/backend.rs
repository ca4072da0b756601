use std::time::Duration;

use anyhow::Result;

use crate::core::AppConfig;
use crate::orchestrator::OrchestratorClient;
use crate::orchestrator::grid::grid_status;
use crate::orchestrator::voice::{VoiceMessage, fallback_reply, voice_response};

pub async fn health(config: &AppConfig) -> Result<()> {
    let client = OrchestratorClient::new(&config.backend_url);
    let health = client.health().await?;
    println!("{}: {}", client.base_url(), health.status);
    Ok(())
}

pub async fn grid(config: &AppConfig) -> Result<()> {
    let client = OrchestratorClient::new(&config.backend_url);
    let status = grid_status(&client).await;

    if !status.live {
        println!("Backend offline, showing estimated intensities");
    }
    for region in status.regions {
        println!(
            "{:<16} {:>6.0} gCO₂/kWh  {:?}",
            region.name, region.intensity, region.label
        );
    }
    Ok(())
}

/// Answer the way the voice widget does, locally when the backend
/// doesn't respond in time
pub async fn voice(config: &AppConfig, text: String) -> Result<()> {
    let client = OrchestratorClient::new(&config.backend_url);
    let messages = vec![VoiceMessage {
        role: "user".to_string(),
        content: text.clone(),
    }];
    let timeout = Duration::from_millis(config.voice_timeout_ms);

    match voice_response(&client, &messages, timeout).await {
        Some(reply) => println!("{}", reply),
        None => println!("{} (offline)", fallback_reply(&text)),
    }
    Ok(())
}
