use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sportsbook feed (the-odds-api v4 event odds, as saved by fetch-odds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsEvent {
    pub id: String,
    #[serde(default)]
    pub sport_key: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: String,
    #[serde(default)]
    pub bookmakers: Vec<OddsBookmaker>,
}

impl OddsEvent {
    /// "Away @ Home", the game descriptor carried on every match.
    pub fn descriptor(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsBookmaker {
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub markets: Vec<OddsMarket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OddsOutcome>,
}

/// One side of a player prop. `description` holds the player name, `name` is "Over"/"Under".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsOutcome {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
}

// ---------------------------------------------------------------------------
// Platform feed (JSON:API style projections payload)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformFeed {
    #[serde(default)]
    pub data: Vec<Projection>,
    /// Side lookup table; `new_player` resources resolve projection player ids.
    #[serde(default)]
    pub included: Vec<IncludedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Projection {
    #[serde(default)]
    pub id: String,
    pub attributes: ProjectionAttributes,
    #[serde(default)]
    pub relationships: ProjectionRelationships,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionAttributes {
    pub stat_type: String,
    pub line_score: f64,
    /// "standard", "demon", "goblin", ...
    #[serde(default)]
    pub odds_type: Option<String>,
    /// True on boosted/adjusted pricing.
    #[serde(default)]
    pub adjusted_odds: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectionRelationships {
    #[serde(default)]
    pub new_player: Option<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncludedResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Over-side price from one bookmaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SportsbookQuote {
    pub line: f64,
    pub odds: f64,
}

/// A standard-priced platform line resolved to its player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatLine {
    pub player: String,
    pub team: String,
    pub stat_type: String,
    pub line: f64,
    pub odds_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformLine {
    pub line: f64,
    pub team: String,
    pub stat_type: String,
    pub odds_type: String,
}

impl From<&PlayerStatLine> for PlatformLine {
    fn from(l: &PlayerStatLine) -> Self {
        Self {
            line: l.line,
            team: l.team.clone(),
            stat_type: l.stat_type.clone(),
            odds_type: l.odds_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportsbookLines {
    /// Bookmaker title → over quote. Ordered so output is stable across runs.
    pub lines: BTreeMap<String, SportsbookQuote>,
    /// Mean over `lines`, None when the player only had under quotes.
    pub average_line: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedProp {
    pub player: String,
    pub game: String,
    pub commence_time: String,
    /// Sportsbook market key; selects the probability slope.
    pub market: String,
    /// Serialized as `prizepicks`, the key the dashboard reads.
    #[serde(rename = "prizepicks")]
    pub platform: PlatformLine,
    pub sportsbook: SportsbookLines,
    /// Platform line minus sportsbook average.
    pub line_difference: Option<f64>,
}

/// Output of the matcher: the joined props plus who fell out on each side.
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub matches: Vec<MatchedProp>,
    pub sportsbook_only: Vec<String>,
    pub platform_only: Vec<String>,
}

// ---------------------------------------------------------------------------
// EV classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Over => write!(f, "over"),
            Side::Under => write!(f, "under"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvVerdict {
    pub bookmaker_used: String,
    pub better_side: Side,
    pub implied_probability: f64,
    pub adjusted_over_probability: f64,
    pub adjusted_under_probability: f64,
    pub reference_line: f64,
    pub reference_odds: f64,
    pub sportsbook_over_probability: f64,
    pub line_difference: f64,
    pub probability_adjustment: f64,
    pub slope_used: f64,
    pub risk_level: String,
    pub risk_color: String,
    pub risk_label: String,
    pub breakeven_slip: String,
    pub breakeven_rate: f64,
    pub edge_over_breakeven: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvAnalysis {
    Calculated(EvVerdict),
    /// Terminal, not an error: no bookmaker quoted the over side.
    NoReferenceData { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvResult {
    #[serde(flatten)]
    pub prop: MatchedProp,
    pub ev_analysis: EvAnalysis,
}

impl EvResult {
    pub fn verdict(&self) -> Option<&EvVerdict> {
        match &self.ev_analysis {
            EvAnalysis::Calculated(v) => Some(v),
            EvAnalysis::NoReferenceData { .. } => None,
        }
    }
}
