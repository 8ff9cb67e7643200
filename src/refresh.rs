use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::process::Command;
use tracing::{error, info};

use crate::artifacts::read_json;
use crate::config::{stage_timeouts, Config};
use crate::error::{AppError, Result};

/// One pipeline stage run as a child process.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub name: String,
    /// Error label reported to the caller when the stage exits nonzero.
    pub failure_label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl PipelineStage {
    fn binary(cfg: &Config, name: &str, failure_label: &str, timeout_secs: u64) -> Self {
        Self {
            name: name.to_string(),
            failure_label: failure_label.to_string(),
            program: cfg.stage_bin_dir.join(name),
            args: Vec::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// fetch-odds → fetch-platform → match-props → calculate-ev, from STAGE_BIN_DIR.
pub fn default_stages(cfg: &Config) -> Vec<PipelineStage> {
    vec![
        PipelineStage::binary(cfg, "fetch-odds", "Sportsbook API failed", stage_timeouts::FETCH_ODDS),
        PipelineStage::binary(
            cfg,
            "fetch-platform",
            "PrizePicks/Platform API failed",
            stage_timeouts::FETCH_PLATFORM,
        ),
        PipelineStage::binary(cfg, "match-props", "Prop matching failed", stage_timeouts::MATCH_PROPS),
        PipelineStage::binary(cfg, "calculate-ev", "EV calculation failed", stage_timeouts::CALCULATE_EV),
    ]
}

#[derive(Debug, Serialize)]
pub struct RefreshSummary {
    pub status: &'static str,
    pub message: &'static str,
    pub prop_count: usize,
}

/// Run every stage in order. The first nonzero exit or timeout stops the run;
/// later stages are never started. No retries.
pub async fn run(cfg: &Config, stages: &[PipelineStage]) -> Result<RefreshSummary> {
    info!(event = "REFRESH_START", stages = stages.len());
    let started = Instant::now();

    for (idx, stage) in stages.iter().enumerate() {
        info!("[{}/{}] Running {}", idx + 1, stages.len(), stage.name);
        run_stage(stage, cfg).await?;
    }

    // Every stage exited 0, so an absent or unreadable result is still a pipeline failure.
    let results: Vec<serde_json::Value> = read_json(&cfg.ev_path()).map_err(|e| {
        error!(event = "REFRESH_NO_OUTPUT", path = %cfg.ev_path().display(), "{e}");
        AppError::StageFailed {
            label: stages
                .last()
                .map_or_else(|| "Refresh failed".to_string(), |s| s.failure_label.clone()),
            details: format!("{} was not produced: {e}", cfg.ev_path().display()),
        }
    })?;
    info!(
        event = "REFRESH_COMPLETE",
        prop_count = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
    );

    Ok(RefreshSummary {
        status: "success",
        message: "Data refreshed successfully",
        prop_count: results.len(),
    })
}

async fn run_stage(stage: &PipelineStage, cfg: &Config) -> Result<()> {
    let child = Command::new(&stage.program)
        .args(&stage.args)
        .env("DATA_DIR", &cfg.data_dir)
        .env("STAT_MARKET", &cfg.stat_market)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AppError::StageFailed {
            label: stage.failure_label.clone(),
            details: format!("failed to start {}: {e}", stage.program.display()),
        })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(stage.timeout, child.wait_with_output()).await {
        Ok(res) => res?,
        Err(_) => {
            error!(event = "STAGE_TIMEOUT", stage = %stage.name, secs = stage.timeout.as_secs());
            return Err(AppError::StageTimeout {
                stage: stage.name.clone(),
                secs: stage.timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let details = String::from_utf8_lossy(&output.stderr).into_owned();
        error!(
            event = "STAGE_FAILED",
            stage = %stage.name,
            code = ?output.status.code(),
            "{} exited with {}",
            stage.name,
            output.status,
        );
        return Err(AppError::StageFailed {
            label: stage.failure_label.clone(),
            details,
        });
    }

    info!(event = "STAGE_OK", stage = %stage.name);
    Ok(())
}
