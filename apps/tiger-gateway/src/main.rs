//! Tiger Gateway Binary
//!
//! Runs one gateway session and logs every event it publishes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tiger-gateway -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `TIGER_GATEWAY_CONFIG`: config path when no argument is given
//!   (default: config.yaml)
//! - `TIGER_GATEWAY_SDK`: `mock` runs against the scripted in-process SDK;
//!   anything else reports the SDK as unavailable
//! - `TIGER_GATEWAY_SUBSCRIBE`: comma-separated `SYMBOL.EXCHANGE` list to
//!   subscribe after connecting, e.g. `AAPL.NASDAQ,00700.SEHK`
//! - `RUST_LOG`: log filter (default: from config)

use std::sync::Arc;

use anyhow::Context;
use tiger_gateway::broker::{MockTigerSdk, SdkAvailability};
use tiger_gateway::config::{Config, load_config};
use tiger_gateway::domain::shared::Exchange;
use tiger_gateway::domain::trading::{GatewayEvent, SubscribeRequest};
use tiger_gateway::events::BroadcastEventPublisher;
use tiger_gateway::gateway::TigerGateway;
use tiger_gateway::observability::init_metrics;
use tiger_gateway::telemetry::init_telemetry;
use tokio::sync::broadcast::error::RecvError;

/// Events buffered per bus subscriber.
const EVENT_BUS_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TIGER_GATEWAY_CONFIG").ok());
    let config = load_config(path.as_deref()).context("loading configuration")?;

    init_telemetry(&config.observability.logging)?;
    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics)?;
    }

    tracing::info!(
        gateway = %config.gateway_name,
        environment = %config.tiger.environment,
        "Starting Tiger gateway"
    );

    let bus = BroadcastEventPublisher::new(EVENT_BUS_CAPACITY);
    let events = tokio::spawn(log_events(bus.subscribe()));

    let gateway = Arc::new(
        TigerGateway::new(
            config.gateway_name.as_str(),
            Arc::new(bus),
            resolve_sdk(),
        )
        .with_settings(config.supervisor.clone()),
    );

    connect(&gateway, &config).await?;

    tokio::signal::ctrl_c()
        .await
        .context("installing Ctrl-C handler")?;
    tracing::info!("Shutdown requested");

    let closing = Arc::clone(&gateway);
    tokio::task::spawn_blocking(move || closing.close())
        .await
        .context("closing gateway")?;

    drop(gateway);
    events.abort();
    tracing::info!("Tiger gateway stopped");
    Ok(())
}

/// Load .env from the current directory or any ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

fn resolve_sdk() -> SdkAvailability {
    match std::env::var("TIGER_GATEWAY_SDK").as_deref() {
        Ok("mock") => {
            tracing::warn!("Using the scripted mock SDK; no orders reach Tiger");
            SdkAvailability::available(MockTigerSdk::new())
        }
        _ => SdkAvailability::unavailable("no Tiger SDK binding linked into this binary"),
    }
}

/// Connect off the async runtime, then queue the configured subscriptions.
async fn connect(gateway: &Arc<TigerGateway>, config: &Config) -> anyhow::Result<()> {
    let session = Arc::clone(gateway);
    let settings = config.tiger.clone();
    let connected = tokio::task::spawn_blocking(move || session.connect(&settings)).await?;

    if let Err(e) = connected {
        tracing::error!(error = %e, "Gateway did not connect");
        return Ok(());
    }

    for request in subscriptions_from_env() {
        gateway.subscribe(request);
    }
    Ok(())
}

fn subscriptions_from_env() -> Vec<SubscribeRequest> {
    let Ok(list) = std::env::var("TIGER_GATEWAY_SUBSCRIBE") else {
        return Vec::new();
    };
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let parsed = entry
                .trim()
                .rsplit_once('.')
                .and_then(|(symbol, exchange)| {
                    Exchange::parse(exchange).map(|exchange| SubscribeRequest::new(symbol, exchange))
                });
            if parsed.is_none() {
                tracing::warn!(entry, "Ignoring malformed subscription");
            }
            parsed
        })
        .collect()
}

async fn log_events(mut rx: tokio::sync::broadcast::Receiver<GatewayEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(kind = event.kind(), event = %json, "Gateway event"),
                Err(e) => tracing::warn!(error = %e, "Unserializable gateway event"),
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event logger lagging, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
