//! Stage 3: join sportsbook quotes and platform lines into `matched_props.json`.

use tracing_subscriber::EnvFilter;

use prop_ev::config::Config;
use prop_ev::error::Result;
use prop_ev::stages;

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cfg = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    let ev_cfg = cfg.load_ev_config()?;
    stages::run_match(&cfg, &ev_cfg)?;
    Ok(())
}
