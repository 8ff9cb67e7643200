//! Stage 1: pull player props for the next games into `sportsbook_props.json`.
//!
//! Logs go to stdout. On failure the error is the only thing written to
//! stderr, which the refresh orchestrator echoes back to the API caller.

use tracing_subscriber::EnvFilter;

use prop_ev::config::Config;
use prop_ev::error::Result;
use prop_ev::stages;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    stages::run_fetch_odds(&cfg).await?;
    Ok(())
}
