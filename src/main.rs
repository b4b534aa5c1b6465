//! Letterdesk - LLM-drafted letters and wedding speeches
//!
//! HTTP service that drafts letters and speeches, stores them and emails
//! them on request.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use letterdesk::config::StoreBackend;
use letterdesk::{AppContext, LetterdeskConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "letterdesk")]
#[command(author = "Letterdesk Team")]
#[command(version)]
#[command(about = "LLM-drafted letters and wedding speeches, delivered by email")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LETTERDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check configuration and credentials
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("letterdesk={},tower_http={}", log_level, log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = LetterdeskConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Doctor => {
            run_doctor(&config, cli.config.as_deref());
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(
    mut config: LetterdeskConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!("Starting Letterdesk");
    let context = AppContext::build(config).context("failed to assemble services")?;
    let app = context.router();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "Letterdesk is running. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutting down...");
}

fn run_doctor(config: &LetterdeskConfig, explicit_path: Option<&std::path::Path>) {
    println!("Letterdesk Doctor");
    println!();

    println!("Checking configuration...");
    match explicit_path
        .map(PathBuf::from)
        .or_else(LetterdeskConfig::default_path)
    {
        Some(path) if path.exists() => println!("  ✓ Configuration file: {}", path.display()),
        _ => println!("  ℹ No configuration file found (using defaults)"),
    }
    println!("  Model: {} ({})", config.llm.model, config.llm.base_url);
    println!("  SMTP:  {}:{} ({:?})", config.smtp.host, config.smtp.port, config.smtp.tls);
    println!("  Store: {}", config.store.backend);

    println!();
    println!("Checking credentials...");
    let mut refs = vec![
        &config.llm.api_key_ref,
        &config.smtp.username_ref,
        &config.smtp.password_ref,
    ];
    if config.store.backend == StoreBackend::Supabase {
        refs.push(&config.store.url_ref);
        refs.push(&config.store.key_ref);
    }
    for name in refs {
        let found = std::env::var(name)
            .or_else(|_| std::env::var(name.to_uppercase()))
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if found {
            println!("  ✓ {}", name.to_uppercase());
        } else {
            println!("  ✗ {} is not set", name.to_uppercase());
        }
    }

    println!();
    println!("Doctor check complete!");
}

fn show_config(config: Option<&LetterdeskConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
