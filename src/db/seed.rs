//! Deterministic synthetic dataset for the analytics store.
//!
//! Generation is pure (seeded `StdRng`); `insert` writes a generated dataset
//! in one transaction after clearing every table.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;
use crate::ev::round_to;

pub const DEFAULT_USERS: usize = 500;
pub const DEFAULT_SEED: u64 = 42;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Casual,
    Regular,
    Sharp,
    Elite,
}

struct TierParams {
    entries: (u32, u32),
    bet_size: (f64, f64),
    win_rate: f64,
    initial_deposit: (f64, f64),
}

impl Tier {
    fn params(self) -> TierParams {
        match self {
            Tier::Casual => TierParams {
                entries: (1, 5),
                bet_size: (5.0, 20.0),
                win_rate: 0.37,
                initial_deposit: (50.0, 200.0),
            },
            Tier::Regular => TierParams {
                entries: (5, 15),
                bet_size: (10.0, 50.0),
                win_rate: 0.42,
                initial_deposit: (200.0, 500.0),
            },
            Tier::Sharp => TierParams {
                entries: (20, 50),
                bet_size: (25.0, 100.0),
                win_rate: 0.51,
                initial_deposit: (500.0, 2000.0),
            },
            Tier::Elite => TierParams {
                entries: (50, 100),
                bet_size: (50.0, 200.0),
                win_rate: 0.58,
                initial_deposit: (2000.0, 5000.0),
            },
        }
    }
}

const PLAYERS: &[(&str, &str, &str)] = &[
    ("Patrick Mahomes", "KC", "QB"),
    ("Josh Allen", "BUF", "QB"),
    ("Joe Burrow", "CIN", "QB"),
    ("Lamar Jackson", "BAL", "QB"),
    ("Jalen Hurts", "PHI", "QB"),
    ("Dak Prescott", "DAL", "QB"),
    ("Justin Herbert", "LAC", "QB"),
    ("Jared Goff", "DET", "QB"),
    ("Brock Purdy", "SF", "QB"),
    ("Jordan Love", "GB", "QB"),
    ("Matthew Stafford", "LAR", "QB"),
    ("Tua Tagovailoa", "MIA", "QB"),
    ("Christian McCaffrey", "SF", "RB"),
    ("Saquon Barkley", "PHI", "RB"),
    ("Derrick Henry", "BAL", "RB"),
    ("Bijan Robinson", "ATL", "RB"),
    ("Jahmyr Gibbs", "DET", "RB"),
    ("Jonathan Taylor", "IND", "RB"),
    ("Josh Jacobs", "GB", "RB"),
    ("De'Von Achane", "MIA", "RB"),
    ("Kyren Williams", "LAR", "RB"),
    ("James Cook", "BUF", "RB"),
    ("Isiah Pacheco", "KC", "RB"),
    ("Breece Hall", "NYJ", "RB"),
    ("Justin Jefferson", "MIN", "WR"),
    ("Tyreek Hill", "MIA", "WR"),
    ("Ja'Marr Chase", "CIN", "WR"),
    ("CeeDee Lamb", "DAL", "WR"),
    ("Amon-Ra St. Brown", "DET", "WR"),
    ("AJ Brown", "PHI", "WR"),
    ("Puka Nacua", "LAR", "WR"),
    ("Garrett Wilson", "NYJ", "WR"),
    ("Nico Collins", "HOU", "WR"),
    ("Drake London", "ATL", "WR"),
    ("Zay Flowers", "BAL", "WR"),
    ("Rashee Rice", "KC", "WR"),
    ("Ladd McConkey", "LAC", "WR"),
    ("Keon Coleman", "BUF", "WR"),
    ("Travis Kelce", "KC", "TE"),
    ("Sam LaPorta", "DET", "TE"),
    ("George Kittle", "SF", "TE"),
    ("Mark Andrews", "BAL", "TE"),
    ("Dallas Goedert", "PHI", "TE"),
    ("Dalton Kincaid", "BUF", "TE"),
    ("Jake Ferguson", "DAL", "TE"),
    ("TJ Hockenson", "MIN", "TE"),
];

/// (home, away, kickoff, final score). Scheduled games have no score.
const GAMES: &[(&str, &str, &str, Option<(i64, i64)>)] = &[
    ("KC", "TB", "2025-11-04 20:15:00", Some((30, 24))),
    ("BUF", "MIA", "2025-11-03 13:00:00", Some((30, 27))),
    ("MIN", "IND", "2025-11-03 20:20:00", Some((21, 13))),
    ("DET", "GB", "2025-11-03 16:25:00", Some((24, 14))),
    ("PHI", "JAX", "2025-11-03 16:25:00", Some((28, 23))),
    ("LAR", "SEA", "2025-11-03 16:05:00", Some((26, 20))),
    ("BAL", "DEN", "2025-11-03 13:00:00", Some((41, 10))),
    ("CIN", "LV", "2025-11-03 13:00:00", Some((41, 24))),
    ("ATL", "DAL", "2025-11-03 13:00:00", Some((27, 21))),
    ("LAC", "CLE", "2025-11-03 13:00:00", Some((27, 10))),
    ("BAL", "CIN", "2025-11-07 20:15:00", Some((35, 34))),
    ("SF", "TB", "2025-11-10 13:00:00", Some((23, 20))),
    ("BUF", "IND", "2025-11-10 13:00:00", Some((30, 20))),
    ("DEN", "KC", "2025-11-10 13:00:00", Some((16, 14))),
    ("NYJ", "ARI", "2025-11-10 16:25:00", Some((31, 6))),
    ("PHI", "DAL", "2025-11-10 16:25:00", Some((34, 6))),
    ("DET", "HOU", "2025-11-10 20:20:00", Some((26, 23))),
    ("MIA", "LAR", "2025-11-11 20:15:00", Some((23, 15))),
    ("PHI", "WAS", "2025-11-14 20:15:00", None),
    ("JAX", "DET", "2025-11-17 13:00:00", None),
    ("LV", "MIA", "2025-11-17 13:00:00", None),
    ("MIN", "TEN", "2025-11-17 13:00:00", None),
    ("SEA", "SF", "2025-11-17 16:05:00", None),
    ("KC", "BUF", "2025-11-17 16:25:00", None),
    ("IND", "NYJ", "2025-11-17 20:20:00", None),
    ("BAL", "PIT", "2025-11-17 13:00:00", None),
    ("LAC", "CIN", "2025-11-17 20:20:00", None),
    ("GB", "CHI", "2025-11-17 13:00:00", None),
    ("DAL", "HOU", "2025-11-18 20:15:00", None),
];

const LEGAL_STATES: &[&str] = &[
    "AZ", "CO", "CT", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "NV", "NH",
    "NJ", "NY", "NC", "OH", "OR", "PA", "RI", "TN", "VA", "WV", "WY", "DC",
];

const FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Daniel", "Matthew", "Anthony", "Mark", "Steven", "Andrew", "Joshua", "Kevin", "Brian",
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Susan", "Jessica", "Sarah", "Karen",
    "Lisa", "Nancy", "Ashley", "Emily", "Michelle", "Amanda", "Melissa", "Laura", "Nicole",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Wilson", "Anderson", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Thompson",
    "White", "Harris", "Clark", "Lewis", "Robinson", "Walker", "Young", "Allen", "King",
    "Wright", "Scott", "Nguyen", "Hill", "Green", "Adams", "Baker", "Nelson", "Carter",
];

const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
    "aol.com",
];

const ENTRY_TYPES: &[(&str, u32)] = &[("standard", 70), ("flex", 20), ("power", 8), ("goblin", 2)];

/// Picks per entry and their weights; payout is `stake * multiplier`.
const PICK_COUNTS: &[(usize, u32, f64)] = &[
    (2, 35, 3.0),
    (3, 35, 5.0),
    (4, 15, 10.0),
    (5, 10, 20.0),
    (6, 5, 40.0),
];

fn stat_types(position: &str) -> &'static [&'static str] {
    match position {
        "QB" => &["Passing Yards", "Passing TDs", "Completions", "Pass Attempts", "Interceptions"],
        "RB" => &["Rushing Yards", "Rushing TDs", "Receptions", "Receiving Yards", "Total Yards"],
        _ => &["Receiving Yards", "Receptions", "Receiving TDs", "Targets", "Longest Reception"],
    }
}

fn line_range(stat_type: &str) -> (u32, u32) {
    match stat_type {
        "Passing Yards" => (220, 285),
        "Passing TDs" => (1, 2),
        "Completions" => (19, 28),
        "Pass Attempts" => (30, 39),
        "Interceptions" | "Rushing TDs" | "Receiving TDs" => (0, 1),
        "Rushing Yards" => (55, 95),
        "Receiving Yards" => (45, 85),
        "Receptions" => (4, 7),
        "Targets" => (5, 9),
        "Longest Reception" => (18, 28),
        "Total Yards" => (70, 110),
        _ => (50, 100),
    }
}

// ---------------------------------------------------------------------------
// Generated rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub user_id: i64,
    pub tier: Tier,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub date_of_birth: String,
    pub created_at: String,
    pub last_login: String,
    pub account_status: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    pub user_id: i64,
    pub current_balance: f64,
    pub total_deposits: f64,
    pub total_wagered: f64,
    pub total_winnings: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub player_id: i64,
    pub player_name: String,
    pub team: String,
    pub position: String,
    pub jersey_number: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub game_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub game_date: NaiveDateTime,
    pub is_final: bool,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub entry_id: i64,
    pub user_id: i64,
    pub entry_amount: f64,
    pub potential_payout: f64,
    pub actual_payout: f64,
    pub num_picks: i64,
    pub entry_type: String,
    pub status: String,
    pub created_at: String,
    pub settled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPick {
    pub entry_id: i64,
    pub player_id: i64,
    pub game_id: i64,
    pub stat_type: String,
    pub line: f64,
    pub selection: String,
    pub result: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub transaction_type: &'static str,
    pub amount: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub related_entry_id: Option<i64>,
    pub payment_method: Option<&'static str>,
    pub transaction_date: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub users: Vec<NewUser>,
    pub wallets: Vec<NewWallet>,
    pub players: Vec<NewPlayer>,
    pub games: Vec<NewGame>,
    pub entries: Vec<NewEntry>,
    pub picks: Vec<NewPick>,
    pub transactions: Vec<NewTransaction>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn fmt_ts(t: NaiveDateTime) -> String {
    t.format(TS_FORMAT).to_string()
}

fn window_end() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 12)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn random_between(rng: &mut StdRng, start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    if start >= end {
        return end;
    }
    let secs = (end - start).num_seconds();
    start + Duration::seconds(rng.gen_range(0..=secs))
}

fn tiers(rng: &mut StdRng, users: usize) -> Vec<Tier> {
    let count = |pct: usize| users * pct / 100;
    let mut tiers = Vec::with_capacity(users);
    tiers.extend(std::iter::repeat(Tier::Regular).take(count(24)));
    tiers.extend(std::iter::repeat(Tier::Sharp).take(count(5)));
    tiers.extend(std::iter::repeat(Tier::Elite).take(count(1)));
    while tiers.len() < users {
        tiers.push(Tier::Casual);
    }
    tiers.shuffle(rng);
    tiers
}

fn username(rng: &mut StdRng, first: &str, last: &str) -> String {
    let (f, l) = (first.to_lowercase(), last.to_lowercase());
    let initial = &f[..1];
    match rng.gen_range(0..6) {
        0 => format!("{f}{l}"),
        1 => format!("{f}.{l}"),
        2 => format!("{initial}{l}"),
        3 => format!("{f}{l}{}", rng.gen_range(1..=999)),
        4 => format!("{f}_{l}"),
        _ => format!("{l}{initial}"),
    }
}

/// Build the whole dataset. Same `(users, seed)` always yields the same rows.
pub fn generate(users: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let end = window_end();
    let start = end - Duration::days(30);
    let mut ds = Dataset::default();

    for (idx, (name, team, position)) in PLAYERS.iter().enumerate() {
        ds.players.push(NewPlayer {
            player_id: idx as i64 + 1,
            player_name: name.to_string(),
            team: team.to_string(),
            position: position.to_string(),
            jersey_number: rng.gen_range(1..=99),
        });
    }

    for (idx, (home, away, kickoff, score)) in GAMES.iter().enumerate() {
        let game_date = NaiveDateTime::parse_from_str(kickoff, TS_FORMAT).unwrap_or(end);
        ds.games.push(NewGame {
            game_id: idx as i64 + 1,
            home_team: home.to_string(),
            away_team: away.to_string(),
            game_date,
            is_final: score.is_some(),
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
        });
    }

    let mut games_by_team: HashMap<&str, Vec<&NewGame>> = HashMap::new();
    for g in &ds.games {
        games_by_team.entry(g.home_team.as_str()).or_default().push(g);
        games_by_team.entry(g.away_team.as_str()).or_default().push(g);
    }

    let entry_type_dist = WeightedIndex::new(ENTRY_TYPES.iter().map(|e| e.1)).ok();
    let pick_count_dist = WeightedIndex::new(PICK_COUNTS.iter().map(|p| p.1)).ok();

    let mut used_names = HashSet::new();
    let mut next_entry_id = 1i64;

    for (idx, tier) in tiers(&mut rng, users).into_iter().enumerate() {
        let user_id = idx as i64 + 1;

        let (first, last, uname) = loop {
            let first = *FIRST_NAMES.choose(&mut rng).unwrap_or(&"Alex");
            let last = *LAST_NAMES.choose(&mut rng).unwrap_or(&"Doe");
            let mut uname = username(&mut rng, first, last);
            if used_names.contains(&uname) {
                uname = format!("{uname}{user_id}");
            }
            if used_names.insert(uname.clone()) {
                break (first, last, uname);
            }
        };

        let created = random_between(&mut rng, start - Duration::days(365), end - Duration::days(1));
        let last_login = random_between(&mut rng, created, end);
        let suspended = tier == Tier::Elite && rng.gen_bool(0.4);
        let dob = NaiveDate::from_ymd_opt(
            rng.gen_range(1970..=2000),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28),
        )
        .unwrap_or_default();

        ds.users.push(NewUser {
            user_id,
            tier,
            email: format!("{uname}@{}", EMAIL_DOMAINS.choose(&mut rng).unwrap_or(&"gmail.com")),
            username: uname,
            first_name: first.to_string(),
            last_name: last.to_string(),
            state: LEGAL_STATES.choose(&mut rng).unwrap_or(&"NY").to_string(),
            date_of_birth: dob.format("%Y-%m-%d").to_string(),
            created_at: fmt_ts(created),
            last_login: fmt_ts(last_login),
            account_status: if suspended { "suspended" } else { "active" }.to_string(),
            phone_number: format!(
                "{}-{}-{}",
                rng.gen_range(200..=999),
                rng.gen_range(200..=999),
                rng.gen_range(1000..=9999)
            ),
        });

        // Money flow for this user, replayed into wallet totals and transactions.
        let p = tier.params();
        let mut balance = round_to(rng.gen_range(p.initial_deposit.0..p.initial_deposit.1), 2);
        let mut deposits = balance;
        let mut wagered = 0.0;
        let mut winnings = 0.0;
        ds.transactions.push(NewTransaction {
            user_id,
            transaction_type: "deposit",
            amount: balance,
            balance_before: 0.0,
            balance_after: round_to(balance, 2),
            related_entry_id: None,
            payment_method: ["credit_card", "paypal", "venmo", "bank_transfer"]
                .choose(&mut rng)
                .copied(),
            transaction_date: fmt_ts(random_between(&mut rng, start - Duration::days(30), start)),
        });

        for _ in 0..rng.gen_range(p.entries.0..=p.entries.1) {
            let stake = round_to(rng.gen_range(p.bet_size.0..p.bet_size.1), 2);
            if balance < stake {
                let top_up = round_to(rng.gen_range(stake * 2.0..stake * 5.0), 2);
                ds.transactions.push(NewTransaction {
                    user_id,
                    transaction_type: "deposit",
                    amount: top_up,
                    balance_before: round_to(balance, 2),
                    balance_after: round_to(balance + top_up, 2),
                    related_entry_id: None,
                    payment_method: ["credit_card", "paypal", "venmo"].choose(&mut rng).copied(),
                    transaction_date: fmt_ts(random_between(&mut rng, start, end)),
                });
                balance += top_up;
                deposits += top_up;
            }

            let (num_picks, _, multiplier) = match &pick_count_dist {
                Some(d) => PICK_COUNTS[d.sample(&mut rng)],
                None => PICK_COUNTS[0],
            };
            let entry_type = match &entry_type_dist {
                Some(d) => ENTRY_TYPES[d.sample(&mut rng)].0,
                None => "standard",
            };
            let potential = round_to(stake * multiplier, 2);
            let placed = random_between(&mut rng, start, end);
            let entry_id = next_entry_id;
            next_entry_id += 1;

            ds.transactions.push(NewTransaction {
                user_id,
                transaction_type: "bet_placed",
                amount: stake,
                balance_before: round_to(balance, 2),
                balance_after: round_to(balance - stake, 2),
                related_entry_id: Some(entry_id),
                payment_method: None,
                transaction_date: fmt_ts(placed),
            });
            balance -= stake;
            wagered += stake;

            let mut latest_game = placed;
            let mut all_final = true;
            let first_pick = ds.picks.len();
            for player in ds.players.choose_multiple(&mut rng, num_picks) {
                let candidates: Vec<&NewGame> = match games_by_team.get(player.team.as_str()) {
                    Some(team_games) => {
                        let upcoming: Vec<&NewGame> = team_games
                            .iter()
                            .copied()
                            .filter(|g| g.game_date >= placed)
                            .collect();
                        if upcoming.is_empty() {
                            team_games.clone()
                        } else {
                            upcoming
                        }
                    }
                    None => ds.games.iter().collect(),
                };
                let Some(game) = candidates.choose(&mut rng) else {
                    continue;
                };
                latest_game = latest_game.max(game.game_date);
                all_final &= game.is_final;

                let stats = stat_types(&player.position);
                let stat_type = stats.choose(&mut rng).copied().unwrap_or("Receiving Yards");
                let (lo, hi) = line_range(stat_type);
                let line = f64::from(rng.gen_range(lo..hi.max(lo + 1))) + 0.5;

                ds.picks.push(NewPick {
                    entry_id,
                    player_id: player.player_id,
                    game_id: game.game_id,
                    stat_type: stat_type.to_string(),
                    line,
                    selection: if rng.gen_bool(0.5) { "over" } else { "under" }.to_string(),
                    result: "pending".to_string(),
                    created_at: fmt_ts(placed),
                });
            }

            let mut entry = NewEntry {
                entry_id,
                user_id,
                entry_amount: stake,
                potential_payout: potential,
                actual_payout: 0.0,
                num_picks: (ds.picks.len() - first_pick) as i64,
                entry_type: entry_type.to_string(),
                status: "pending".to_string(),
                created_at: fmt_ts(placed),
                settled_at: None,
            };

            if all_final {
                let settled = latest_game + Duration::hours(3);
                let picks = &mut ds.picks[first_pick..];
                if rng.gen_bool(p.win_rate) {
                    entry.status = "won".to_string();
                    entry.actual_payout = potential;
                    picks.iter_mut().for_each(|pk| pk.result = "hit".to_string());
                    ds.transactions.push(NewTransaction {
                        user_id,
                        transaction_type: "payout",
                        amount: potential,
                        balance_before: round_to(balance, 2),
                        balance_after: round_to(balance + potential, 2),
                        related_entry_id: Some(entry_id),
                        payment_method: None,
                        transaction_date: fmt_ts(settled),
                    });
                    balance += potential;
                    winnings += potential;
                } else {
                    entry.status = "lost".to_string();
                    let misses = rng.gen_range(1..=picks.len().max(1));
                    let missed: HashSet<usize> =
                        (0..picks.len()).choose_multiple(&mut rng, misses).into_iter().collect();
                    for (i, pk) in picks.iter_mut().enumerate() {
                        pk.result = if missed.contains(&i) { "miss" } else { "hit" }.to_string();
                    }
                }
                entry.settled_at = Some(fmt_ts(settled));
            }
            ds.entries.push(entry);
        }

        ds.wallets.push(NewWallet {
            user_id,
            current_balance: round_to(balance, 2),
            total_deposits: round_to(deposits, 2),
            total_wagered: round_to(wagered, 2),
            total_winnings: round_to(winnings, 2),
        });
    }

    ds
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Replace the store's contents with `ds`.
pub async fn insert(pool: &SqlitePool, ds: &Dataset) -> Result<()> {
    let mut tx = pool.begin().await?;

    for table in ["transactions", "picks", "entries", "games", "players", "wallets", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for p in &ds.players {
        sqlx::query(
            "INSERT INTO players (player_id, player_name, team, position, sport, jersey_number, is_active)
             VALUES (?, ?, ?, ?, 'NFL', ?, 1)",
        )
        .bind(p.player_id)
        .bind(&p.player_name)
        .bind(&p.team)
        .bind(&p.position)
        .bind(p.jersey_number)
        .execute(&mut *tx)
        .await?;
    }

    for g in &ds.games {
        sqlx::query(
            "INSERT INTO games (game_id, sport, league, home_team, away_team, game_date, venue, status, home_score, away_score)
             VALUES (?, 'NFL', 'NFL', ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(g.game_id)
        .bind(&g.home_team)
        .bind(&g.away_team)
        .bind(fmt_ts(g.game_date))
        .bind(format!("{} Stadium", g.home_team))
        .bind(if g.is_final { "final" } else { "scheduled" })
        .bind(g.home_score)
        .bind(g.away_score)
        .execute(&mut *tx)
        .await?;
    }

    for u in &ds.users {
        sqlx::query(
            "INSERT INTO users (user_id, username, email, first_name, last_name, state, date_of_birth,
                                created_at, last_login, account_status, kyc_verified, phone_number)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(u.user_id)
        .bind(&u.username)
        .bind(&u.email)
        .bind(&u.first_name)
        .bind(&u.last_name)
        .bind(&u.state)
        .bind(&u.date_of_birth)
        .bind(&u.created_at)
        .bind(&u.last_login)
        .bind(&u.account_status)
        .bind(&u.phone_number)
        .execute(&mut *tx)
        .await?;
    }

    for w in &ds.wallets {
        sqlx::query(
            "INSERT INTO wallets (user_id, current_balance, total_deposits, total_withdrawals, total_wagered, total_winnings)
             VALUES (?, ?, ?, 0.0, ?, ?)",
        )
        .bind(w.user_id)
        .bind(w.current_balance)
        .bind(w.total_deposits)
        .bind(w.total_wagered)
        .bind(w.total_winnings)
        .execute(&mut *tx)
        .await?;
    }

    for e in &ds.entries {
        sqlx::query(
            "INSERT INTO entries (entry_id, user_id, entry_amount, potential_payout, actual_payout,
                                  num_picks, entry_type, status, created_at, settled_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(e.entry_id)
        .bind(e.user_id)
        .bind(e.entry_amount)
        .bind(e.potential_payout)
        .bind(e.actual_payout)
        .bind(e.num_picks)
        .bind(&e.entry_type)
        .bind(&e.status)
        .bind(&e.created_at)
        .bind(&e.settled_at)
        .execute(&mut *tx)
        .await?;
    }

    for p in &ds.picks {
        sqlx::query(
            "INSERT INTO picks (entry_id, player_id, game_id, stat_type, line, selection, result, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(p.entry_id)
        .bind(p.player_id)
        .bind(p.game_id)
        .bind(&p.stat_type)
        .bind(p.line)
        .bind(&p.selection)
        .bind(&p.result)
        .bind(&p.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for t in &ds.transactions {
        sqlx::query(
            "INSERT INTO transactions (user_id, transaction_type, amount, balance_before, balance_after,
                                       related_entry_id, status, payment_method, transaction_date)
             VALUES (?, ?, ?, ?, ?, ?, 'completed', ?, ?)",
        )
        .bind(t.user_id)
        .bind(t.transaction_type)
        .bind(t.amount)
        .bind(t.balance_before)
        .bind(t.balance_after)
        .bind(t.related_entry_id)
        .bind(t.payment_method)
        .bind(&t.transaction_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let won = ds.entries.iter().filter(|e| e.status == "won").count();
    let lost = ds.entries.iter().filter(|e| e.status == "lost").count();
    info!(
        event = "SEED_COMPLETE",
        users = ds.users.len(),
        players = ds.players.len(),
        games = ds.games.len(),
        entries = ds.entries.len(),
        picks = ds.picks.len(),
        transactions = ds.transactions.len(),
        won,
        lost,
        "Seeded {} users, {} entries, {} picks",
        ds.users.len(),
        ds.entries.len(),
        ds.picks.len(),
    );
    Ok(())
}
