//! Rebuild the analytics store with synthetic users, entries and picks.
//!
//! Usage: seed-db [USERS] [SEED]   (or SEED_USERS / SEED_VALUE in the environment)

use tracing::info;
use tracing_subscriber::EnvFilter;

use prop_ev::config::Config;
use prop_ev::db::{self, seed};
use prop_ev::error::{AppError, Result};

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

    let mut args = std::env::args().skip(1);
    let users: usize = arg_or_env(args.next(), "SEED_USERS", seed::DEFAULT_USERS)?;
    let seed_value: u64 = arg_or_env(args.next(), "SEED_VALUE", seed::DEFAULT_SEED)?;
    if users == 0 {
        return Err(AppError::Config("user count must be at least 1".to_string()));
    }

    let pool = db::connect(&cfg.db_path).await?;
    info!("Generating {users} users (seed {seed_value}) into {}", cfg.db_path);

    let dataset = seed::generate(users, seed_value);
    seed::insert(&pool, &dataset).await?;
    pool.close().await;
    Ok(())
}

fn arg_or_env<T: std::str::FromStr>(arg: Option<String>, var: &str, default: T) -> Result<T> {
    match arg.or_else(|| std::env::var(var).ok()).filter(|v| !v.trim().is_empty()) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{var} must be a number, got '{v}'"))),
        None => Ok(default),
    }
}
