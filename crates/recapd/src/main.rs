//! The recap server binary.
//!
//! Startup order: logging, settings (file + env overrides), database
//! discovery, pool + bootstrap, provider chain, serve until ctrl-c.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use recap_llm::{AnthropicProvider, CompletionProvider, FallbackChain, OpenAiProvider};
use recap_server::{AppState, ProviderPresence, ServerConfig};
use recap_settings::discovery::{discover_database, DiscoveryReport};
use recap_settings::{load_settings, load_settings_from_path, RecapSettings};
use recap_store::{bootstrap, new_file, new_in_memory, ConnectionConfig, ConnectionPool};

/// Task tracking and daily-standup summary server.
#[derive(Debug, Parser)]
#[command(name = "recapd", version, about)]
struct Cli {
    /// Interface to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Database path (skips environment discovery).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file path (default: ~/.recap/settings.json).
    #[arg(long)]
    settings_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = load(&cli).context("failed to load settings")?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    let (pool, discovery) = open_database(cli.db_path.as_deref())?;
    {
        let conn = pool.get()?;
        let report = bootstrap(&conn).context("failed to bootstrap database")?;
        info!(default_user = %report.default_user_id, "database ready");
    }

    let (chain, providers) = build_chain(&settings);
    if !chain.has_provider() {
        warn!("no provider API key configured; summaries will use the deterministic template");
    }

    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
    };
    let state = AppState::new(pool, chain, discovery, providers);
    let handle = recap_server::start(&config, state, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
    })
    .await
    .context("failed to start server")?;

    info!(port = handle.port, "recap ready");
    handle.wait().await;
    info!("shut down");
    Ok(())
}

fn load(cli: &Cli) -> recap_settings::Result<RecapSettings> {
    match &cli.settings_path {
        Some(path) => load_settings_from_path(path),
        None => load_settings(),
    }
}

/// Open the pool at the explicit `--db-path`, or run environment discovery.
fn open_database(
    db_path: Option<&std::path::Path>,
) -> anyhow::Result<(ConnectionPool, DiscoveryReport)> {
    let config = ConnectionConfig::default();
    let (path, discovery) = match db_path {
        Some(path) => {
            let path = path.display().to_string();
            info!(path = %path, "using database path from command line");
            (
                path.clone(),
                DiscoveryReport {
                    probes: Vec::new(),
                    selected: None,
                    database_path: path,
                },
            )
        }
        None => {
            let report = discover_database();
            (report.database_path.clone(), report)
        }
    };

    let pool = if path == ":memory:" {
        new_in_memory(&config)
    } else {
        new_file(&path, &config)
    }
    .with_context(|| format!("failed to open database at {path}"))?;
    Ok((pool, discovery))
}

/// Build the provider chain from configured API keys. A missing key leaves
/// that stage out of the chain entirely.
fn build_chain(settings: &RecapSettings) -> (FallbackChain, ProviderPresence) {
    let primary: Option<Arc<dyn CompletionProvider>> =
        settings.providers.openai_api_key.as_deref().map(|key| {
            Arc::new(OpenAiProvider::new(key, settings.providers.primary_model.clone()))
                as Arc<dyn CompletionProvider>
        });
    let fallback: Option<Arc<dyn CompletionProvider>> = settings
        .providers
        .anthropic_api_key
        .as_deref()
        .map(|key| Arc::new(AnthropicProvider::new(key)) as Arc<dyn CompletionProvider>);

    let presence = ProviderPresence {
        openai: primary.is_some(),
        anthropic: fallback.is_some(),
    };
    info!(
        openai = presence.openai,
        anthropic = presence.anthropic,
        model = %settings.providers.primary_model,
        "provider chain configured"
    );
    (FallbackChain::new(primary, fallback), presence)
}
