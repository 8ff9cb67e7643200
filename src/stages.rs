//! The four pipeline stages. Each reads the previous stage's artifact from
//! DATA_DIR and overwrites its own; the stage binaries are thin wrappers.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::artifacts::{read_json, write_json};
use crate::config::{Config, EvConfig};
use crate::error::{AppError, Result};
use crate::ev::{classify_all, BatchOutcome};
use crate::fetcher::{fetch_platform_feed, fetch_sportsbook_props};
use crate::matcher::match_props;
use crate::types::{EvResult, MatchReport, OddsEvent, PlatformFeed};

/// Stage 1: sportsbook player props → `sportsbook_props.json`. Returns the event count.
pub async fn run_fetch_odds(cfg: &Config) -> Result<usize> {
    let payloads = fetch_sportsbook_props(cfg).await?;
    write_json(&cfg.odds_path(), &payloads)?;
    info!(event = "ARTIFACT_WRITTEN", path = %cfg.odds_path().display(), events = payloads.len());
    Ok(payloads.len())
}

/// Stage 2: platform projections → `platform_props.json`. Returns the projection count.
pub async fn run_fetch_platform(cfg: &Config) -> Result<usize> {
    let feed = fetch_platform_feed(cfg).await?;
    write_json(&cfg.platform_path(), &feed)?;
    let count = feed.get("data").and_then(|d| d.as_array()).map_or(0, Vec::len);
    info!(event = "ARTIFACT_WRITTEN", path = %cfg.platform_path().display(), projections = count);
    Ok(count)
}

/// Stage 3: join both feeds → `matched_props.json`. The artifact is written even when empty.
pub fn run_match(cfg: &Config, ev_cfg: &EvConfig) -> Result<MatchReport> {
    let category = ev_cfg.category(&cfg.stat_market).ok_or_else(|| {
        AppError::Config(format!("no stat category configured for market '{}'", cfg.stat_market))
    })?;

    let events: Vec<OddsEvent> = read_json(&cfg.odds_path())?;
    let feed: PlatformFeed = read_json(&cfg.platform_path())?;

    let report = match_props(&events, &feed, &category.market_key, &category.platform_stat_type);

    for m in &report.matches {
        info!(
            event = "PROP_MATCHED",
            player = %m.player,
            platform_line = m.platform.line,
            sportsbook_avg = ?m.sportsbook.average_line,
            books = m.sportsbook.lines.len(),
        );
    }
    if !report.sportsbook_only.is_empty() {
        warn!(
            count = report.sportsbook_only.len(),
            "No standard {} line on the platform for: {}",
            category.platform_stat_type,
            report.sportsbook_only.join(", ")
        );
    }
    if !report.platform_only.is_empty() {
        info!(
            count = report.platform_only.len(),
            "Platform players without sportsbook quotes: {}",
            report.platform_only.join(", ")
        );
    }

    write_json(&cfg.matched_path(), &report.matches)?;
    info!(
        event = "ARTIFACT_WRITTEN",
        path = %cfg.matched_path().display(),
        matched = report.matches.len(),
        "Matched {} {} props",
        report.matches.len(),
        category.platform_stat_type,
    );
    Ok(report)
}

/// Stage 4: classify every matched prop → `ev_analysis.json`.
pub fn run_calculate(cfg: &Config, ev_cfg: &EvConfig) -> Result<BatchOutcome> {
    let records: Vec<serde_json::Value> = read_json(&cfg.matched_path())?;
    info!("Loaded {} matched props", records.len());

    let outcome = classify_all(&records, ev_cfg);
    write_json(&cfg.ev_path(), &outcome.results)?;

    log_summary(&summarize(&outcome.results, 10), ev_cfg);
    info!(
        event = "ARTIFACT_WRITTEN",
        path = %cfg.ev_path().display(),
        results = outcome.results.len(),
        skipped = outcome.skipped.len(),
    );
    Ok(outcome)
}

#[derive(Debug)]
pub struct EvSummary<'a> {
    /// Calculated results, highest implied probability first.
    pub top: Vec<&'a EvResult>,
    /// risk_label → count, calculated results only.
    pub distribution: BTreeMap<String, usize>,
    pub unscored: usize,
}

pub fn summarize(results: &[EvResult], top_n: usize) -> EvSummary<'_> {
    let mut scored: Vec<&EvResult> = results.iter().filter(|r| r.verdict().is_some()).collect();
    scored.sort_by(|a, b| {
        let pa = a.verdict().map_or(0.0, |v| v.implied_probability);
        let pb = b.verdict().map_or(0.0, |v| v.implied_probability);
        pb.total_cmp(&pa).then_with(|| a.prop.player.cmp(&b.prop.player))
    });

    let mut distribution = BTreeMap::new();
    for v in scored.iter().filter_map(|r| r.verdict()) {
        *distribution.entry(v.risk_label.clone()).or_insert(0) += 1;
    }

    let unscored = results.len() - scored.len();
    scored.truncate(top_n);
    EvSummary {
        top: scored,
        distribution,
        unscored,
    }
}

fn log_summary(summary: &EvSummary<'_>, ev_cfg: &EvConfig) {
    if summary.top.is_empty() {
        warn!("No props with calculated EV");
        return;
    }
    for (rank, r) in summary.top.iter().enumerate() {
        let Some(v) = r.verdict() else { continue };
        info!(
            event = "EV_OPPORTUNITY",
            rank = rank + 1,
            player = %r.prop.player,
            side = %v.better_side,
            "{}. {} {} {} | {:.2}% ({}) | edge {:+.2}% vs {} breakeven {}%",
            rank + 1,
            r.prop.player,
            v.better_side.to_string().to_uppercase(),
            r.prop.platform.line,
            v.implied_probability,
            v.risk_label,
            v.edge_over_breakeven,
            ev_cfg.reference_slip,
            v.breakeven_rate,
        );
    }
    for (label, count) in &summary.distribution {
        info!(event = "RISK_DISTRIBUTION", risk = %label, count, "{label}: {count} props");
    }
    if summary.unscored > 0 {
        info!(unscored = summary.unscored, "Props without sportsbook reference data");
    }
}
