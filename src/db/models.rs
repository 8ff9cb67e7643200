//! Row types for the analytics queries. Computed columns are REAL or NULL,
//! so rates are `Option<f64>` wherever a NULLIF guards the denominator.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopWinnerRow {
    pub user_id: i64,
    pub username: String,
    pub state: Option<String>,
    pub account_status: String,
    pub total_entries: i64,
    pub winning_entries: i64,
    pub losing_entries: i64,
    pub total_winnings: f64,
    pub total_wagered: f64,
    pub net_profit: f64,
    pub roi_percentage: f64,
    pub win_rate_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HitLineRow {
    pub player_name: String,
    pub position: Option<String>,
    pub team: Option<String>,
    pub stat_type: String,
    pub line: f64,
    pub selection: String,
    pub times_picked: i64,
    pub times_hit: i64,
    pub times_missed: i64,
    pub total_revenue_generated: f64,
    pub hit_rate_percentage: Option<f64>,
    /// "Player OVER 245.5 Passing Yards", filled in after the query.
    #[sqlx(skip)]
    pub line_description: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfileRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub state: Option<String>,
    pub account_status: String,
    pub kyc_verified: i64,
    pub created_at: String,
    pub last_login: Option<String>,
    pub current_balance: f64,
    pub total_deposits: f64,
    pub total_wagered: f64,
    pub total_winnings: f64,
    #[sqlx(skip)]
    pub net_profit: f64,
    #[sqlx(skip)]
    pub roi_percentage: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EntryStatsRow {
    pub total_entries: i64,
    pub winning_entries: i64,
    pub losing_entries: i64,
    pub pending_entries: i64,
    pub avg_bet_size: Option<f64>,
    pub biggest_win: Option<f64>,
    pub smallest_win: Option<f64>,
    pub win_rate_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MostPickedRow {
    pub player_name: String,
    pub position: Option<String>,
    pub team: Option<String>,
    pub times_picked: i64,
    pub times_hit: i64,
    pub hit_rate_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentEntryRow {
    pub entry_id: i64,
    pub entry_amount: f64,
    pub potential_payout: f64,
    pub actual_payout: f64,
    pub num_picks: i64,
    pub entry_type: String,
    pub status: String,
    pub created_at: String,
    pub settled_at: Option<String>,
    pub profit_loss: f64,
    #[sqlx(skip)]
    pub picks: Vec<EntryPickRow>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EntryPickRow {
    pub player_name: String,
    pub position: Option<String>,
    pub stat_type: String,
    pub line: f64,
    pub selection: String,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DateRangeRow {
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}
