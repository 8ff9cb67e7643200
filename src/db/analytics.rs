use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::models::{
    DateRangeRow, EntryPickRow, EntryStatsRow, HitLineRow, MostPickedRow, RecentEntryRow,
    TopWinnerRow, UserProfileRow,
};
use crate::error::{AppError, Result};
use crate::ev::round_to;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Net profit for winners, payout generated for hit lines.
    Revenue,
    /// Winning entries for winners, times hit for hit lines.
    Count,
}

impl std::str::FromStr for SortBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "revenue" => Ok(SortBy::Revenue),
            "count" => Ok(SortBy::Count),
            other => Err(AppError::BadRequest(format!(
                "sort_by must be 'revenue' or 'count', got '{other}'"
            ))),
        }
    }
}

/// Validated filter set shared by the two leaderboard queries. Echoed back in responses.
#[derive(Debug, Clone, Serialize)]
pub struct TopFilters {
    pub sort_by: SortBy,
    pub state: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: i64,
}

impl Default for TopFilters {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Revenue,
            state: None,
            start_date: None,
            end_date: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TopFilters {
    /// Blank strings count as absent. Dates must be YYYY-MM-DD; limit is clamped to 1..=100.
    pub fn new(
        sort_by: Option<&str>,
        state: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Self> {
        let sort_by = match present(sort_by) {
            Some(s) => s.parse()?,
            None => SortBy::Revenue,
        };
        let start_date = present(start_date).map(parse_date).transpose()?;
        let end_date = present(end_date).map(parse_date).transpose()?;

        Ok(Self {
            sort_by,
            state: present(state).map(|s| s.to_uppercase()),
            start_date,
            end_date,
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }
}

fn present(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| AppError::BadRequest(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, f: &TopFilters, date_column: &str) {
    if let Some(state) = &f.state {
        qb.push(" AND u.state = ").push_bind(state.clone());
    }
    if let Some(start) = &f.start_date {
        qb.push(format!(" AND DATE({date_column}) >= "))
            .push_bind(start.clone());
    }
    if let Some(end) = &f.end_date {
        qb.push(format!(" AND DATE({date_column}) <= "))
            .push_bind(end.clone());
    }
}

/// Users ranked by net profit or by winning entries over settled entries.
pub async fn top_winners(pool: &SqlitePool, f: &TopFilters) -> Result<Vec<TopWinnerRow>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            u.user_id,
            u.username,
            u.state,
            u.account_status,
            COUNT(DISTINCT e.entry_id) AS total_entries,
            COUNT(DISTINCT CASE WHEN e.status = 'won' THEN e.entry_id END) AS winning_entries,
            COUNT(DISTINCT CASE WHEN e.status = 'lost' THEN e.entry_id END) AS losing_entries,
            SUM(CASE WHEN e.status = 'won' THEN e.actual_payout ELSE 0.0 END) AS total_winnings,
            SUM(e.entry_amount) AS total_wagered,
            SUM(CASE WHEN e.status = 'won' THEN e.actual_payout ELSE 0.0 END) - SUM(e.entry_amount) AS net_profit,
            CASE
                WHEN SUM(e.entry_amount) > 0
                THEN ROUND((SUM(CASE WHEN e.status = 'won' THEN e.actual_payout ELSE 0.0 END) - SUM(e.entry_amount))
                           / SUM(e.entry_amount) * 100, 2)
                ELSE 0.0
            END AS roi_percentage,
            ROUND(CAST(COUNT(CASE WHEN e.status = 'won' THEN 1 END) AS REAL)
                  / NULLIF(COUNT(CASE WHEN e.status IN ('won', 'lost') THEN 1 END), 0) * 100, 1) AS win_rate_percentage
        FROM users u
        JOIN entries e ON u.user_id = e.user_id
        WHERE e.status IN ('won', 'lost')
        "#,
    );
    push_filters(&mut qb, f, "e.created_at");
    qb.push(" GROUP BY u.user_id HAVING total_entries > 0");
    qb.push(match f.sort_by {
        SortBy::Revenue => " ORDER BY net_profit DESC, u.user_id",
        SortBy::Count => " ORDER BY winning_entries DESC, net_profit DESC, u.user_id",
    });
    qb.push(" LIMIT ").push_bind(f.limit);

    let rows = qb.build_query_as::<TopWinnerRow>().fetch_all(pool).await?;
    Ok(rows)
}

/// Player lines (player + stat + line + side) that hit at least once.
pub async fn top_hit_lines(pool: &SqlitePool, f: &TopFilters) -> Result<Vec<HitLineRow>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            p.player_name,
            p.position,
            p.team,
            pk.stat_type,
            pk.line,
            pk.selection,
            COUNT(pk.pick_id) AS times_picked,
            COUNT(CASE WHEN pk.result = 'hit' THEN 1 END) AS times_hit,
            COUNT(CASE WHEN pk.result = 'miss' THEN 1 END) AS times_missed,
            SUM(CASE WHEN pk.result = 'hit' AND e.status = 'won' THEN e.actual_payout ELSE 0.0 END) AS total_revenue_generated,
            ROUND(CAST(COUNT(CASE WHEN pk.result = 'hit' THEN 1 END) AS REAL)
                  / NULLIF(COUNT(CASE WHEN pk.result IN ('hit', 'miss') THEN 1 END), 0) * 100, 1) AS hit_rate_percentage
        FROM picks pk
        JOIN players p ON pk.player_id = p.player_id
        JOIN entries e ON pk.entry_id = e.entry_id
        JOIN users u ON e.user_id = u.user_id
        WHERE pk.result IN ('hit', 'miss')
        "#,
    );
    push_filters(&mut qb, f, "pk.created_at");
    qb.push(" GROUP BY p.player_id, pk.stat_type, pk.line, pk.selection HAVING times_hit > 0");
    qb.push(match f.sort_by {
        SortBy::Revenue => " ORDER BY total_revenue_generated DESC",
        SortBy::Count => " ORDER BY times_hit DESC, total_revenue_generated DESC",
    });
    qb.push(", p.player_id, pk.stat_type, pk.line, pk.selection");
    qb.push(" LIMIT ").push_bind(f.limit);

    let mut rows = qb.build_query_as::<HitLineRow>().fetch_all(pool).await?;
    for r in &mut rows {
        r.line_description = format!(
            "{} {} {} {}",
            r.player_name,
            r.selection.to_uppercase(),
            r.line,
            r.stat_type
        );
    }
    Ok(rows)
}

#[derive(Debug, Serialize)]
pub struct UserReport {
    pub user: UserProfileRow,
    pub entry_stats: EntryStatsRow,
    pub most_picked_players: Vec<MostPickedRow>,
    pub recent_entries: Vec<RecentEntryRow>,
}

/// `%` and `_` in user input match literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// First user whose username or email contains `q` (case-insensitive), with
/// wallet, entry stats, top-5 players and the 10 latest entries with picks.
pub async fn search_user(pool: &SqlitePool, q: &str) -> Result<Option<UserReport>> {
    let pattern = like_pattern(q);
    let user = sqlx::query_as::<_, UserProfileRow>(
        r#"
        SELECT
            u.user_id, u.username, u.email, u.first_name, u.last_name, u.state,
            u.account_status, u.kyc_verified, u.created_at, u.last_login,
            COALESCE(w.current_balance, 0.0) AS current_balance,
            COALESCE(w.total_deposits, 0.0)  AS total_deposits,
            COALESCE(w.total_wagered, 0.0)   AS total_wagered,
            COALESCE(w.total_winnings, 0.0)  AS total_winnings
        FROM users u
        LEFT JOIN wallets w ON u.user_id = w.user_id
        WHERE u.username LIKE ? ESCAPE '\' OR u.email LIKE ? ESCAPE '\'
        ORDER BY u.user_id
        LIMIT 1
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_optional(pool)
    .await?;

    let Some(mut user) = user else {
        return Ok(None);
    };

    let net = user.total_winnings - user.total_wagered;
    user.net_profit = round_to(net, 2);
    user.roi_percentage = if user.total_wagered > 0.0 {
        round_to(net / user.total_wagered * 100.0, 2)
    } else {
        0.0
    };

    let entry_stats = sqlx::query_as::<_, EntryStatsRow>(
        r#"
        SELECT
            COUNT(*) AS total_entries,
            COUNT(CASE WHEN status = 'won' THEN 1 END) AS winning_entries,
            COUNT(CASE WHEN status = 'lost' THEN 1 END) AS losing_entries,
            COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending_entries,
            ROUND(AVG(entry_amount), 2) AS avg_bet_size,
            MAX(CASE WHEN status = 'won' THEN actual_payout END) AS biggest_win,
            MIN(CASE WHEN status = 'won' THEN actual_payout END) AS smallest_win,
            ROUND(CAST(COUNT(CASE WHEN status = 'won' THEN 1 END) AS REAL)
                  / NULLIF(COUNT(CASE WHEN status IN ('won', 'lost') THEN 1 END), 0) * 100, 1) AS win_rate_percentage
        FROM entries
        WHERE user_id = ?
        "#,
    )
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;

    let most_picked_players = sqlx::query_as::<_, MostPickedRow>(
        r#"
        SELECT
            p.player_name,
            p.position,
            p.team,
            COUNT(pk.pick_id) AS times_picked,
            COUNT(CASE WHEN pk.result = 'hit' THEN 1 END) AS times_hit,
            ROUND(CAST(COUNT(CASE WHEN pk.result = 'hit' THEN 1 END) AS REAL)
                  / NULLIF(COUNT(CASE WHEN pk.result IN ('hit', 'miss') THEN 1 END), 0) * 100, 1) AS hit_rate_percentage
        FROM picks pk
        JOIN players p ON pk.player_id = p.player_id
        JOIN entries e ON pk.entry_id = e.entry_id
        WHERE e.user_id = ?
        GROUP BY p.player_id
        ORDER BY times_picked DESC, p.player_id
        LIMIT 5
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let mut recent_entries = sqlx::query_as::<_, RecentEntryRow>(
        r#"
        SELECT
            entry_id, entry_amount, potential_payout, actual_payout, num_picks,
            entry_type, status, created_at, settled_at,
            actual_payout - entry_amount AS profit_loss
        FROM entries
        WHERE user_id = ?
        ORDER BY created_at DESC, entry_id DESC
        LIMIT 10
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    for entry in &mut recent_entries {
        entry.picks = sqlx::query_as::<_, EntryPickRow>(
            r#"
            SELECT p.player_name, p.position, pk.stat_type, pk.line, pk.selection, pk.result
            FROM picks pk
            JOIN players p ON pk.player_id = p.player_id
            WHERE pk.entry_id = ?
            ORDER BY pk.pick_id
            "#,
        )
        .bind(entry.entry_id)
        .fetch_all(pool)
        .await?;
    }

    Ok(Some(UserReport {
        user,
        entry_stats,
        most_picked_players,
        recent_entries,
    }))
}

pub async fn available_states(pool: &SqlitePool) -> Result<Vec<String>> {
    let states = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT state FROM users WHERE state IS NOT NULL ORDER BY state",
    )
    .fetch_all(pool)
    .await?;
    Ok(states)
}

/// Earliest and latest entry dates; both None on an empty store.
pub async fn date_range(pool: &SqlitePool) -> Result<DateRangeRow> {
    let row = sqlx::query_as::<_, DateRangeRow>(
        "SELECT MIN(DATE(created_at)) AS min_date, MAX(DATE(created_at)) AS max_date FROM entries",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}
