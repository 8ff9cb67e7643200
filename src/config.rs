use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_API_PORT: u16 = 5000;

pub const ODDS_API_URL: &str = "https://api.the-odds-api.com";
pub const PLATFORM_API_URL: &str = "https://api.prizepicks.com/projections";

/// the-odds-api sport key for the NFL.
pub const DEFAULT_SPORT: &str = "americanfootball_nfl";

/// Player-prop market used when STAT_MARKET is unset.
pub const DEFAULT_STAT_MARKET: &str = "player_pass_yds";

/// Each event-odds call costs one request credit, so only the first few games are pulled.
pub const DEFAULT_MAX_GAMES: usize = 5;

/// Platform league id for the NFL.
pub const DEFAULT_PLATFORM_LEAGUE: &str = "9";
pub const DEFAULT_PLATFORM_PER_PAGE: u32 = 250;

/// Request timeout for both external feeds (seconds).
pub const FEED_TIMEOUT_SECS: u64 = 10;

/// Artifact file names inside DATA_DIR. Each is overwritten wholesale by its stage.
pub mod artifacts {
    pub const ODDS: &str = "sportsbook_props.json";
    pub const PLATFORM: &str = "platform_props.json";
    pub const MATCHED: &str = "matched_props.json";
    pub const EV: &str = "ev_analysis.json";
}

/// Per-stage wall-clock limits for `POST /refresh` (seconds).
pub mod stage_timeouts {
    pub const FETCH_ODDS: u64 = 60;
    pub const FETCH_PLATFORM: u64 = 30;
    pub const MATCH_PROPS: u64 = 10;
    pub const CALCULATE_EV: u64 = 10;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    pub db_path: String,
    /// Directory holding the four pipeline artifacts (DATA_DIR).
    pub data_dir: PathBuf,
    /// Required by the odds stage only (ODDS_API_KEY).
    pub odds_api_key: Option<String>,
    pub odds_api_url: String,
    pub odds_sport: String,
    pub odds_regions: String,
    /// Sportsbook market key of the stat category being matched (STAT_MARKET).
    pub stat_market: String,
    pub max_games: usize,
    pub platform_api_url: String,
    pub platform_league_id: String,
    pub platform_per_page: u32,
    /// Where the stage binaries live (STAGE_BIN_DIR). Defaults to the server's own directory.
    pub stage_bin_dir: PathBuf,
    /// Optional TOML override for [`EvConfig`] (EV_CONFIG_PATH).
    pub ev_config_path: Option<PathBuf>,
}

/// Numeric setting from the environment. Unset or blank means `default`;
/// anything else must parse.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    parse_setting(name, std::env::var(name).ok(), default)
}

fn parse_setting<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{name} must be a valid number, got '{v}'"))),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env is fine; real env vars take precedence either way.
        let _ = dotenvy::dotenv();

        let stage_bin_dir = match std::env::var("STAGE_BIN_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_exe()?
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: env_parse("API_PORT", DEFAULT_API_PORT)?,
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "user_data.db".to_string()),
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            ),
            odds_api_key: std::env::var("ODDS_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            odds_api_url: std::env::var("ODDS_API_URL")
                .unwrap_or_else(|_| ODDS_API_URL.to_string()),
            odds_sport: std::env::var("ODDS_SPORT").unwrap_or_else(|_| DEFAULT_SPORT.to_string()),
            odds_regions: std::env::var("ODDS_REGIONS").unwrap_or_else(|_| "us".to_string()),
            stat_market: std::env::var("STAT_MARKET")
                .unwrap_or_else(|_| DEFAULT_STAT_MARKET.to_string()),
            max_games: env_parse("MAX_GAMES", DEFAULT_MAX_GAMES)?,
            platform_api_url: std::env::var("PLATFORM_API_URL")
                .unwrap_or_else(|_| PLATFORM_API_URL.to_string()),
            platform_league_id: std::env::var("PLATFORM_LEAGUE_ID")
                .unwrap_or_else(|_| DEFAULT_PLATFORM_LEAGUE.to_string()),
            platform_per_page: env_parse("PLATFORM_PER_PAGE", DEFAULT_PLATFORM_PER_PAGE)?,
            stage_bin_dir,
            ev_config_path: std::env::var("EV_CONFIG_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn odds_path(&self) -> PathBuf {
        self.data_dir.join(artifacts::ODDS)
    }

    pub fn platform_path(&self) -> PathBuf {
        self.data_dir.join(artifacts::PLATFORM)
    }

    pub fn matched_path(&self) -> PathBuf {
        self.data_dir.join(artifacts::MATCHED)
    }

    pub fn ev_path(&self) -> PathBuf {
        self.data_dir.join(artifacts::EV)
    }

    /// Built-in [`EvConfig`], or the TOML file at EV_CONFIG_PATH when set.
    pub fn load_ev_config(&self) -> Result<EvConfig> {
        match &self.ev_config_path {
            Some(path) => EvConfig::load(path),
            None => Ok(EvConfig::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// EV model configuration
// ---------------------------------------------------------------------------

/// Links a sportsbook market key to the platform's label for the same stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCategory {
    pub market_key: String,
    pub platform_stat_type: String,
    /// Probability shift per unit of line gap (0.02 = 2 points per unit).
    pub slope: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    /// Inclusive lower bound on implied probability (percent).
    pub min_probability: f64,
    pub level: String,
    pub label: String,
    pub color: String,
}

/// Every tunable of the EV model. Built once and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvConfig {
    /// Reference bookmakers, most trusted first.
    pub bookmaker_priority: Vec<String>,
    /// Breakeven win rate (percent) per slip type.
    pub breakeven_rates: BTreeMap<String, f64>,
    /// Slip type the edge is measured against.
    pub reference_slip: String,
    /// Ordered by `min_probability`, highest first.
    pub risk_tiers: Vec<RiskTier>,
    pub stat_categories: Vec<StatCategory>,
    /// Slope for markets missing from `stat_categories`.
    pub default_slope: f64,
    pub probability_floor: f64,
    pub probability_ceiling: f64,
}

impl Default for EvConfig {
    fn default() -> Self {
        let breakeven_rates = [
            ("2_power", 57.74),
            ("3_power", 58.48),
            ("3_flex", 59.80),
            ("4_power", 56.23),
            ("4_flex", 56.89),
            ("5_flex", 54.34),
            ("6_flex", 54.34),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let tier = |min_probability: f64, level: &str, label: &str, color: &str| RiskTier {
            min_probability,
            level: level.to_string(),
            label: label.to_string(),
            color: color.to_string(),
        };

        let category = |market_key: &str, platform_stat_type: &str| StatCategory {
            market_key: market_key.to_string(),
            platform_stat_type: platform_stat_type.to_string(),
            slope: 0.02,
        };

        Self {
            bookmaker_priority: [
                "FanDuel",
                "DraftKings",
                "BetMGM",
                "Caesars",
                "BetRivers",
                "BetOnline.ag",
                "Bovada",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            breakeven_rates,
            reference_slip: "2_power".to_string(),
            risk_tiers: vec![
                tier(60.0, "low", "Strong +EV", "green"),
                tier(57.74, "medium", "Slight Edge", "lightgreen"),
                tier(55.0, "moderate", "Marginal", "yellow"),
                tier(50.0, "high", "Risky", "orange"),
                tier(0.0, "very_high", "Very Risky", "red"),
            ],
            stat_categories: vec![
                category("player_pass_yds", "Pass Yards"),
                category("player_pass_tds", "Pass TDs"),
                category("player_rush_yds", "Rush Yards"),
                category("player_reception_yds", "Receiving Yards"),
                category("player_receptions", "Receptions"),
            ],
            default_slope: 0.02,
            probability_floor: 5.0,
            probability_ceiling: 95.0,
        }
    }
}

impl EvConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: EvConfig = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.breakeven_rates.contains_key(&self.reference_slip) {
            return Err(AppError::Config(format!(
                "reference_slip '{}' has no breakeven rate",
                self.reference_slip
            )));
        }
        if self.risk_tiers.is_empty() {
            return Err(AppError::Config("risk_tiers must not be empty".to_string()));
        }
        if self
            .risk_tiers
            .windows(2)
            .any(|w| w[0].min_probability <= w[1].min_probability)
        {
            return Err(AppError::Config(
                "risk_tiers must be strictly descending by min_probability".to_string(),
            ));
        }
        if !(self.probability_floor < self.probability_ceiling) {
            return Err(AppError::Config(
                "probability_floor must be below probability_ceiling".to_string(),
            ));
        }
        Ok(())
    }

    /// Breakeven rate of the reference slip.
    pub fn breakeven(&self) -> f64 {
        self.breakeven_rates
            .get(&self.reference_slip)
            .copied()
            .unwrap_or(50.0)
    }

    pub fn category(&self, market_key: &str) -> Option<&StatCategory> {
        self.stat_categories.iter().find(|c| c.market_key == market_key)
    }

    pub fn slope_for(&self, market_key: &str) -> f64 {
        self.category(market_key)
            .map(|c| c.slope)
            .unwrap_or(self.default_slope)
    }

    /// First tier whose bound the probability clears; the last tier catches everything else.
    /// None only when `risk_tiers` is empty.
    pub fn risk_tier(&self, implied_probability: f64) -> Option<&RiskTier> {
        self.risk_tiers
            .iter()
            .find(|t| implied_probability >= t.min_probability)
            .or_else(|| self.risk_tiers.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_settings_reject_garbage_instead_of_defaulting() {
        assert_eq!(parse_setting("MAX_GAMES", None, DEFAULT_MAX_GAMES).unwrap(), 5);
        assert_eq!(parse_setting("MAX_GAMES", Some("  ".to_string()), 5usize).unwrap(), 5);
        assert_eq!(parse_setting("MAX_GAMES", Some("8".to_string()), 5usize).unwrap(), 8);

        for (name, raw) in [("MAX_GAMES", "five"), ("PLATFORM_PER_PAGE", "-1")] {
            let err = parse_setting::<u32>(name, Some(raw.to_string()), 1).unwrap_err();
            assert!(matches!(err, AppError::Config(ref m) if m.contains(name)));
        }
        let err = parse_setting::<u16>("API_PORT", Some("70000".to_string()), DEFAULT_API_PORT)
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = EvConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.breakeven(), 57.74);
        assert_eq!(cfg.slope_for("player_pass_yds"), 0.02);
        assert_eq!(cfg.slope_for("player_unknown"), cfg.default_slope);
    }

    #[test]
    fn risk_tier_boundaries_are_inclusive() {
        let cfg = EvConfig::default();
        let level = |p: f64| cfg.risk_tier(p).unwrap().level.clone();
        assert_eq!(level(60.0), "low");
        assert_eq!(level(57.74), "medium");
        assert_eq!(level(57.73), "moderate");
        assert_eq!(level(55.0), "moderate");
        assert_eq!(level(50.0), "high");
        assert_eq!(level(49.99), "very_high");
    }

    #[test]
    fn toml_override_merges_with_defaults() {
        let cfg: EvConfig = toml::from_str(
            r#"
            reference_slip = "5_flex"

            [[stat_categories]]
            market_key = "player_pass_tds"
            platform_stat_type = "Pass TDs"
            slope = 0.15
            "#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.breakeven(), 54.34);
        assert_eq!(cfg.slope_for("player_pass_tds"), 0.15);
        assert_eq!(cfg.bookmaker_priority[0], "FanDuel");
    }

    #[test]
    fn unsorted_tiers_are_rejected() {
        let mut cfg = EvConfig::default();
        cfg.risk_tiers.reverse();
        assert!(cfg.validate().is_err());
    }
}
