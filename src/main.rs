//! pos-terminal-server - card-present sales on a Stripe Terminal reader

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pos_terminal_server::api::{create_router, AppState};
use pos_terminal_server::{Config, PaymentService, PollConfig, ProcessorConfig, StripeClient};

#[derive(Parser, Debug)]
#[command(name = "pos-terminal-server")]
#[command(about = "Point-of-sale backend for a Stripe Terminal reader")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "POS_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value = "4242")]
    port: u16,

    /// Stripe secret API key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    stripe_secret_key: String,

    /// Terminal reader that processes every sale
    #[arg(long, env = "STRIPE_READER_ID")]
    reader_id: String,

    /// Stripe API base URL
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    stripe_api_base: String,

    /// Timeout per Stripe request in seconds
    #[arg(long, env = "POS_REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Currency used when a sale omits one
    #[arg(long, env = "POS_DEFAULT_CURRENCY", default_value = "usd")]
    default_currency: String,

    /// Directory with index.html and pos.html
    #[arg(long, env = "POS_STATIC_DIR", default_value = "./public")]
    static_dir: String,

    /// Log level
    #[arg(long, env = "POS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            log_level: self.log_level,
            static_dir: self.static_dir,
            default_currency: self.default_currency,
            reader_id: self.reader_id,
            processor: ProcessorConfig {
                api_base: self.stripe_api_base,
                secret_key: self.stripe_secret_key,
                timeout_secs: self.request_timeout_secs,
            },
            poll: PollConfig::from_env(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    tracing::info!("Starting pos-terminal-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        reader_id = %config.reader_id,
        api_base = %config.processor.api_base,
        poll_interval_ms = config.poll.interval_ms,
        poll_max_attempts = config.poll.max_attempts,
        "Configuration loaded"
    );

    let stripe = StripeClient::new(&config.processor).context("failed to build Stripe client")?;
    let payments = PaymentService::new(
        Arc::new(stripe),
        config.reader_id.clone(),
        config.default_currency.clone(),
        config.poll.clone(),
    );

    let state = Arc::new(AppState {
        payments: Arc::new(payments),
        static_dir: config.static_dir.clone().into(),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
