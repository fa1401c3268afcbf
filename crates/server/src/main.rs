use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use plainpage_core::{ChatCompletionsGenerator, DirectoryIndexer, GeneratorConfig, Signatures, SpliceConfig};
use tracing_subscriber::EnvFilter;

mod app;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_FILTER: &str = "plainpage=info,tower_http=info";

/// HTTP API for cleaning pages and building simplified versions
#[derive(Parser, Debug)]
#[command(name = "plainpage-server")]
#[command(version)]
#[command(about = "HTTP API for cleaning pages and building simplified versions", long_about = None)]
struct Args {
    /// Address to bind (default: $PLAINPAGE_ADDR or 127.0.0.1:8080)
    #[arg(long, value_name = "ADDR")]
    addr: Option<SocketAddr>,

    /// Signature table (JSON) replacing the built-in tracker lists
    #[arg(long, value_name = "FILE")]
    signatures: Option<PathBuf>,

    /// Stylesheet injected into simplified pages instead of the built-in one
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Chat-completions endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Model name
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Generator request timeout in seconds
    #[arg(long, default_value = "120", value_name = "SECS")]
    generator_timeout: u64,

    /// Whole-request timeout in seconds
    #[arg(long, default_value = "180", value_name = "SECS")]
    request_timeout: u64,

    /// Store knowledge documents in this directory
    #[arg(long, value_name = "DIR")]
    index_dir: Option<PathBuf>,
}

fn bind_addr(flag: Option<SocketAddr>) -> anyhow::Result<SocketAddr> {
    if let Some(addr) = flag {
        return Ok(addr);
    }
    let value = std::env::var("PLAINPAGE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    value.parse().with_context(|| format!("Invalid PLAINPAGE_ADDR: {}", value))
}

fn generator_config(args: &Args) -> GeneratorConfig {
    let mut config = GeneratorConfig {
        timeout: args.generator_timeout,
        api_key: ["PLAINPAGE_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty()),
        ..Default::default()
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    let args = Args::parse();
    let addr = bind_addr(args.addr)?;

    let signatures = match &args.signatures {
        Some(path) => Signatures::from_file(path)
            .with_context(|| format!("Failed to load signatures: {}", path.display()))?,
        None => Signatures::load(),
    };

    let generator_config = generator_config(&args);
    if generator_config.api_key.is_none() {
        tracing::warn!("no API key set in PLAINPAGE_API_KEY or OPENAI_API_KEY");
    }
    let model = generator_config.model.clone();
    let generator = ChatCompletionsGenerator::new(generator_config).context("Failed to configure generator")?;

    let mut state = app::AppState::new(generator, signatures);
    if let Some(path) = &args.css {
        state.splice = SpliceConfig {
            css: std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read stylesheet: {}", path.display()))?,
            ..Default::default()
        };
    }
    state.indexer = args.index_dir.as_ref().map(DirectoryIndexer::new);

    let router = app::router(state, Duration::from_secs(args.request_timeout));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, %model, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
