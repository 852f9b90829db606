use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use tarot_application::{AppContext, AppOptions};
use tarot_infrastructure::process_env;

/// Tarot-AI HTTP server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Port to listen on (defaults to config.toml or $TAROT_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding config.toml and secret.json
    #[arg(long, env = "TAROT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Keep resume drafts in memory
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tarot=debug"));
    fmt().with_env_filter(filter).init();

    let options = AppOptions {
        config_dir: args.config_dir,
        memory_store: args.memory_store,
    };
    let mut ctx = AppContext::bootstrap(&options, process_env()).await?;
    if let Some(port) = args.port {
        ctx.config.server.port = port;
    }
    let port = ctx.config.server.port;

    tarot_server::start_server(ctx, port).await
}
