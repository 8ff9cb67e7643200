use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use crate::config::{Config, FEED_TIMEOUT_SECS};
use crate::error::{AppError, Result};

const ODDS_SOURCE: &str = "the-odds-api";
const PLATFORM_SOURCE: &str = "platform projections API";

/// Quota headers may be integers or floats ("14527.0").
fn parse_quota_header(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
}

fn log_quota(headers: &HeaderMap) {
    let used = parse_quota_header(headers, "x-requests-used");
    let remaining = parse_quota_header(headers, "x-requests-remaining");
    if let (Some(used), Some(remaining)) = (used, remaining) {
        info!(used, remaining, "Odds API quota: {used} used, {remaining} remaining");
    }
}

/// Turn a non-success response into `AppError::Upstream`, keeping the body for the caller.
async fn check_status(resp: reqwest::Response, source_name: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let body: String = body.chars().take(500).collect();
    Err(AppError::Upstream {
        source_name: source_name.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Pull player-prop odds for the first `max_games` upcoming events.
///
/// The event list comes from the cheap h2h endpoint; props are only served
/// per event. Returns each event-odds payload untouched so the artifact
/// mirrors what the API sent.
pub async fn fetch_sportsbook_props(cfg: &Config) -> Result<Vec<serde_json::Value>> {
    let api_key = cfg
        .odds_api_key
        .as_deref()
        .ok_or_else(|| AppError::Config("ODDS_API_KEY is not set".to_string()))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
        .build()?;
    let base = cfg.odds_api_url.trim_end_matches('/');

    let events_url = format!("{base}/v4/sports/{}/odds", cfg.odds_sport);
    let resp = client
        .get(&events_url)
        .query(&[
            ("apiKey", api_key),
            ("regions", cfg.odds_regions.as_str()),
            ("markets", "h2h"),
            ("oddsFormat", "american"),
        ])
        .send()
        .await?;
    log_quota(resp.headers());
    let events: Vec<serde_json::Value> = check_status(resp, ODDS_SOURCE).await?.json().await?;
    info!("Found {} upcoming {} games", events.len(), cfg.odds_sport);

    let mut payloads = Vec::new();
    for event in events.iter().take(cfg.max_games) {
        let Some(event_id) = event.get("id").and_then(|v| v.as_str()) else {
            warn!("Event without an id in {} listing, skipping", cfg.odds_sport);
            continue;
        };
        let label = format!(
            "{} @ {}",
            event.get("away_team").and_then(|v| v.as_str()).unwrap_or("?"),
            event.get("home_team").and_then(|v| v.as_str()).unwrap_or("?"),
        );

        let url = format!("{base}/v4/sports/{}/events/{event_id}/odds", cfg.odds_sport);
        let resp = client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("regions", cfg.odds_regions.as_str()),
                ("markets", cfg.stat_market.as_str()),
                ("oddsFormat", "american"),
            ])
            .send()
            .await?;
        log_quota(resp.headers());
        let payload: serde_json::Value = check_status(resp, ODDS_SOURCE).await?.json().await?;

        let books = payload
            .get("bookmakers")
            .and_then(|b| b.as_array())
            .map_or(0, Vec::len);
        debug!(event_id, books, "Fetched {} props for {label}", cfg.stat_market);
        payloads.push(payload);
    }

    info!("Fetched {} props for {} games", cfg.stat_market, payloads.len());
    Ok(payloads)
}

fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    h.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h.insert(header::REFERER, HeaderValue::from_static("https://app.prizepicks.com/"));
    h.insert(header::ORIGIN, HeaderValue::from_static("https://app.prizepicks.com"));
    h.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
    h.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
    h.insert("Sec-Fetch-Site", HeaderValue::from_static("same-site"));
    h
}

/// Download the platform projections feed for the configured league.
pub async fn fetch_platform_feed(cfg: &Config) -> Result<serde_json::Value> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
        .default_headers(browser_headers())
        .build()?;

    let per_page = cfg.platform_per_page.to_string();
    let resp = client
        .get(&cfg.platform_api_url)
        .query(&[
            ("league_id", cfg.platform_league_id.as_str()),
            ("per_page", per_page.as_str()),
            ("single_stat", "true"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::FORBIDDEN {
        let body: String = resp.text().await.unwrap_or_default().chars().take(500).collect();
        return Err(AppError::Upstream {
            source_name: format!("{PLATFORM_SOURCE} (access denied, bot protection triggered)"),
            status: 403,
            body,
        });
    }

    let feed: serde_json::Value = check_status(resp, PLATFORM_SOURCE).await?.json().await?;
    let count = feed.get("data").and_then(|d| d.as_array()).map_or(0, Vec::len);
    info!("Fetched {count} platform projections");
    Ok(feed)
}
