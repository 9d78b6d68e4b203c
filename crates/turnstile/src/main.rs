//! # Turnstile - Gatehouse Access Engine
//!
//! Gates a downloadable artifact behind a terms-of-use step and an
//! email one-time-password challenge.
//!
//! ## Flow
//! ```text
//! Terms → Session → OTP issue → SMTP → OTP verify → Download grant
//!                      ↓                    ↓
//!                  OtpStore (in-memory, lazy expiry)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod notify;
mod otp;
mod routes;
mod session;
mod state;

use config::AppConfig;
use state::AppState;

/// Gatehouse Turnstile - email OTP download gate
#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/turnstile.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// SMTP relay host (overrides config)
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up .env in development before anything reads the environment
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!(
        "🔐 Starting Gatehouse Turnstile v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    let state = AppState::new(config.clone())?;
    info!(
        "✅ OTP engine ready: {}-digit codes, {}s validity, {} issuances / {} attempts per address",
        config.otp.length,
        config.otp.expiry_secs,
        config.otp.request_limit,
        config.otp.max_verify_attempts
    );

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("🚀 Turnstile listening on {}", config.listen_addr);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("🛑 Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 Turnstile shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
