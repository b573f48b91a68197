//! ProPass activation API server.
//!
//! Bridges the payment provider's subscription state to client-device
//! pro entitlement via activation tokens.
//!
//! Usage:
//!   propass-server --port 8080
//!
//! Secrets come from the environment: STRIPE_SECRET_KEY,
//! STRIPE_WEBHOOK_SECRET, APP_BASE_URL, and optionally
//! KV_REST_API_URL / KV_REST_API_TOKEN and EMAIL_API_KEY.

use anyhow::{Context, Result};
use clap::Parser;
use propass_billing::{StripeClient, StripeConfig, SubscriptionOracle};
use propass_engine::EntitlementEngine;
use propass_notify::{EmailSender, EmailSenderConfig, NotificationSender, NullSender};
use propass_server::{build_router, AppState, Config};
use propass_store::{KeyValueStore, MemoryStore, RedisRestConfig, RedisRestStore};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "propass-server")]
#[command(about = "ProPass activation API server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Use the in-process memory store instead of Redis (local runs)
    #[arg(long)]
    memory_store: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("ProPass server starting...");
    let config = Config::from_env().context("loading configuration")?;

    // All clients are built exactly once and shared across requests.
    let store: Arc<dyn KeyValueStore> = if args.memory_store {
        warn!("using in-process memory store; state is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        let (url, token) = match (config.kv_url.clone(), config.kv_token.clone()) {
            (Some(url), Some(token)) => (url, token),
            _ => anyhow::bail!(
                "KV_REST_API_URL and KV_REST_API_TOKEN are required without --memory-store"
            ),
        };
        Arc::new(RedisRestStore::new(RedisRestConfig { url, token })?)
    };

    let oracle: Arc<dyn SubscriptionOracle> = Arc::new(StripeClient::new(StripeConfig::new(
        config.stripe_secret_key.clone(),
    ))?);

    let sender: Arc<dyn NotificationSender> = match config.email_api_key.clone() {
        Some(api_key) => Arc::new(EmailSender::new(EmailSenderConfig {
            api_key,
            api_base_url: config.email_api_base_url.clone(),
            from_address: config.email_from.clone(),
            app_base_url: config.app_base_url.clone(),
        })?),
        None => {
            warn!("EMAIL_API_KEY not set; activation emails are disabled");
            Arc::new(NullSender)
        }
    };

    let engine = Arc::new(EntitlementEngine::new(store, oracle, sender));
    let app = build_router(AppState {
        engine,
        webhook_secret: config.webhook_secret.clone(),
    });

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
