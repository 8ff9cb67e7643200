use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prop_ev::api::routes::{router, ApiState};
use prop_ev::config::Config;
use prop_ev::db;
use prop_ev::error::Result;
use prop_ev::refresh::default_stages;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::connect(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Refresh pipeline ---
    let stages = default_stages(&cfg);
    info!(
        "Refresh stages from {}: {}",
        cfg.stage_bin_dir.display(),
        stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(" → "),
    );
    if !cfg.ev_path().exists() {
        info!("No {} yet; POST /api/refresh to build it", cfg.ev_path().display());
    }

    // --- HTTP API server ---
    let api_state = ApiState {
        pool,
        cfg: Arc::new(cfg.clone()),
        stages: Arc::new(stages),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
