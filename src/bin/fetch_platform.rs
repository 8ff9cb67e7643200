//! Stage 2: pull the platform's projection board into `platform_props.json`.

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

    stages::run_fetch_platform(&cfg).await?;
    Ok(())
}
