use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::normalize_player_name;
use crate::ev::round_to;
use crate::types::{
    MatchReport, MatchedProp, OddsEvent, PlatformFeed, PlatformLine, PlayerStatLine,
    SportsbookLines, SportsbookQuote,
};

/// Everything the sportsbook feed says about one player in one market.
#[derive(Debug, Clone, PartialEq)]
pub struct SportsbookPlayer {
    pub game: String,
    pub commence_time: String,
    event_id: String,
    /// Over quotes by bookmaker title. May be empty if only unders were posted.
    pub quotes: BTreeMap<String, SportsbookQuote>,
}

/// Group the sportsbook payload by player for one market key.
///
/// A bookmaker posting several over lines for the same player (alternates)
/// keeps the lowest line, then the best price, so the result never depends
/// on payload order. A player appearing in several events is attached to the
/// earliest kickoff, and only that event's quotes are kept.
pub fn index_sportsbook(events: &[OddsEvent], market_key: &str) -> BTreeMap<String, SportsbookPlayer> {
    let mut players: BTreeMap<String, SportsbookPlayer> = BTreeMap::new();

    for event in events {
        for bookmaker in &event.bookmakers {
            for market in bookmaker.markets.iter().filter(|m| m.key == market_key) {
                for outcome in &market.outcomes {
                    let Some(raw_name) = outcome.description.as_deref() else {
                        continue;
                    };
                    let name = normalize_player_name(raw_name);
                    if name.is_empty() {
                        continue;
                    }

                    let entry = players.entry(name).or_insert_with(|| SportsbookPlayer {
                        game: event.descriptor(),
                        commence_time: event.commence_time.clone(),
                        event_id: event.id.clone(),
                        quotes: BTreeMap::new(),
                    });
                    let order = (event.commence_time.as_str(), event.id.as_str())
                        .cmp(&(entry.commence_time.as_str(), entry.event_id.as_str()));
                    match order {
                        // Quotes from a later game never mix with the earliest one.
                        Ordering::Greater => continue,
                        Ordering::Less => {
                            entry.game = event.descriptor();
                            entry.commence_time = event.commence_time.clone();
                            entry.event_id = event.id.clone();
                            entry.quotes.clear();
                        }
                        Ordering::Equal => {}
                    }

                    if !outcome.name.eq_ignore_ascii_case("Over") {
                        continue;
                    }
                    let Some(line) = outcome.point else {
                        continue;
                    };
                    let candidate = SportsbookQuote {
                        line,
                        odds: outcome.price,
                    };
                    entry
                        .quotes
                        .entry(bookmaker.title.clone())
                        .and_modify(|kept| {
                            if prefer_quote(&candidate, kept) {
                                *kept = candidate;
                            }
                        })
                        .or_insert(candidate);
                }
            }
        }
    }

    players
}

fn prefer_quote(candidate: &SportsbookQuote, kept: &SportsbookQuote) -> bool {
    match candidate.line.total_cmp(&kept.line) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => candidate.odds.total_cmp(&kept.odds) == Ordering::Greater,
    }
}

/// Standard-priced platform lines for one stat type, grouped by player name.
///
/// Player ids are resolved through the feed's `new_player` lookup table;
/// projections whose id has no entry are dropped.
pub fn index_platform(feed: &PlatformFeed, stat_type: &str) -> BTreeMap<String, Vec<PlayerStatLine>> {
    let lookup: HashMap<&str, (String, String)> = feed
        .included
        .iter()
        .filter(|r| r.kind == "new_player")
        .filter_map(|r| {
            let name = r.attributes.get("name")?.as_str()?;
            let team = r
                .attributes
                .get("team")
                .and_then(|t| t.as_str())
                .unwrap_or("N/A");
            Some((r.id.as_str(), (normalize_player_name(name), team.to_string())))
        })
        .collect();

    let mut lines: BTreeMap<String, Vec<PlayerStatLine>> = BTreeMap::new();

    for projection in &feed.data {
        let attrs = &projection.attributes;
        if attrs.stat_type != stat_type {
            continue;
        }
        let odds_type = attrs.odds_type.as_deref().unwrap_or("unknown");
        if odds_type != "standard" || attrs.adjusted_odds == Some(true) {
            continue;
        }

        let Some(player_ref) = projection
            .relationships
            .new_player
            .as_ref()
            .and_then(|r| r.data.as_ref())
        else {
            debug!(projection = %projection.id, "projection has no player reference");
            continue;
        };
        let Some((name, team)) = lookup.get(player_ref.id.as_str()) else {
            debug!(projection = %projection.id, player_id = %player_ref.id, "unresolved player id");
            continue;
        };

        lines.entry(name.clone()).or_default().push(PlayerStatLine {
            player: name.clone(),
            team: team.clone(),
            stat_type: attrs.stat_type.clone(),
            line: attrs.line_score,
            odds_type: odds_type.to_string(),
        });
    }

    lines
}

/// Join both feeds on player name for one stat category.
///
/// Output is sorted by player name and does not depend on the order of
/// records in either payload.
pub fn match_props(
    events: &[OddsEvent],
    feed: &PlatformFeed,
    market_key: &str,
    platform_stat_type: &str,
) -> MatchReport {
    let sportsbook = index_sportsbook(events, market_key);
    let platform = index_platform(feed, platform_stat_type);

    let mut report = MatchReport::default();

    for (name, sb) in &sportsbook {
        let Some(candidates) = platform.get(name) else {
            report.sportsbook_only.push(name.clone());
            continue;
        };

        let average = average_line(&sb.quotes);
        let Some(chosen) = pick_platform_line(candidates, average) else {
            report.sportsbook_only.push(name.clone());
            continue;
        };

        report.matches.push(MatchedProp {
            player: name.clone(),
            game: sb.game.clone(),
            commence_time: sb.commence_time.clone(),
            market: market_key.to_string(),
            platform: PlatformLine::from(chosen),
            sportsbook: SportsbookLines {
                lines: sb.quotes.clone(),
                average_line: average.map(|a| round_to(a, 2)),
            },
            line_difference: average.map(|a| round_to(chosen.line - a, 2)),
        });
    }

    report.platform_only = platform
        .keys()
        .filter(|name| !sportsbook.contains_key(*name))
        .cloned()
        .collect();

    report
}

fn average_line(quotes: &BTreeMap<String, SportsbookQuote>) -> Option<f64> {
    if quotes.is_empty() {
        return None;
    }
    Some(quotes.values().map(|q| q.line).sum::<f64>() / quotes.len() as f64)
}

/// When the feed carries more than one standard line for a player, keep the
/// one closest to the sportsbook consensus; ties (or no consensus) go to the
/// lower line.
fn pick_platform_line(candidates: &[PlayerStatLine], average: Option<f64>) -> Option<&PlayerStatLine> {
    candidates.iter().min_by(|a, b| {
        let by_distance = match average {
            Some(avg) => (a.line - avg).abs().total_cmp(&(b.line - avg).abs()),
            None => Ordering::Equal,
        };
        by_distance.then_with(|| a.line.total_cmp(&b.line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MARKET: &str = "player_pass_yds";
    const STAT: &str = "Pass Yards";

    fn outcome(side: &str, player: &str, point: f64, price: f64) -> serde_json::Value {
        json!({ "name": side, "description": player, "point": point, "price": price })
    }

    fn event(id: &str, kickoff: &str, books: Vec<(&str, Vec<serde_json::Value>)>) -> OddsEvent {
        let bookmakers: Vec<serde_json::Value> = books
            .into_iter()
            .map(|(title, outcomes)| {
                json!({
                    "key": title.to_lowercase(),
                    "title": title,
                    "markets": [{ "key": MARKET, "outcomes": outcomes }]
                })
            })
            .collect();
        serde_json::from_value(json!({
            "id": id,
            "sport_key": "americanfootball_nfl",
            "home_team": "Kansas City Chiefs",
            "away_team": "Buffalo Bills",
            "commence_time": kickoff,
            "bookmakers": bookmakers,
        }))
        .unwrap()
    }

    fn projection(player_id: &str, stat: &str, line: f64, odds_type: &str) -> serde_json::Value {
        json!({
            "id": format!("p-{player_id}-{line}"),
            "type": "projection",
            "attributes": { "stat_type": stat, "line_score": line, "odds_type": odds_type },
            "relationships": { "new_player": { "data": { "id": player_id, "type": "new_player" } } }
        })
    }

    fn player(id: &str, name: &str, team: &str) -> serde_json::Value {
        json!({ "id": id, "type": "new_player", "attributes": { "name": name, "team": team } })
    }

    fn feed(data: Vec<serde_json::Value>, included: Vec<serde_json::Value>) -> PlatformFeed {
        serde_json::from_value(json!({ "data": data, "included": included })).unwrap()
    }

    fn sample_events() -> Vec<OddsEvent> {
        vec![event(
            "evt1",
            "2025-11-16T18:00:00Z",
            vec![
                (
                    "FanDuel",
                    vec![
                        outcome("Over", "Patrick Mahomes", 237.5, -110.0),
                        outcome("Under", "Patrick Mahomes", 237.5, -110.0),
                        outcome("Over", "Josh Allen", 245.5, -115.0),
                    ],
                ),
                (
                    "BetRivers",
                    vec![
                        outcome("Over", "Patrick Mahomes", 238.5, -105.0),
                        outcome("Over", "Sportsbook Only", 199.5, -110.0),
                    ],
                ),
            ],
        )]
    }

    fn sample_feed() -> PlatformFeed {
        feed(
            vec![
                projection("1", STAT, 235.5, "standard"),
                projection("1", STAT, 225.5, "goblin"),
                projection("2", STAT, 244.5, "standard"),
                projection("2", "Pass TDs", 1.5, "standard"),
                projection("3", STAT, 210.5, "standard"),
            ],
            vec![
                player("1", "Patrick Mahomes", "KC"),
                player("2", "Josh Allen", "BUF"),
                player("3", "Platform Only", "NYJ"),
            ],
        )
    }

    #[test]
    fn joins_players_present_in_both_feeds() {
        let report = match_props(&sample_events(), &sample_feed(), MARKET, STAT);

        let names: Vec<&str> = report.matches.iter().map(|m| m.player.as_str()).collect();
        assert_eq!(names, vec!["Josh Allen", "Patrick Mahomes"]);
        assert_eq!(report.sportsbook_only, vec!["Sportsbook Only".to_string()]);
        assert_eq!(report.platform_only, vec!["Platform Only".to_string()]);

        let mahomes = &report.matches[1];
        assert_eq!(mahomes.game, "Buffalo Bills @ Kansas City Chiefs");
        assert_eq!(mahomes.platform.line, 235.5);
        assert_eq!(mahomes.platform.team, "KC");
        assert_eq!(mahomes.sportsbook.lines.len(), 2);
        assert_eq!(mahomes.sportsbook.average_line, Some(238.0));
        assert_eq!(mahomes.line_difference, Some(-2.5));
    }

    #[test]
    fn promotional_and_adjusted_lines_are_excluded() {
        let mut f = sample_feed();
        f.data.retain(|p| p.attributes.odds_type.as_deref() != Some("standard"));
        let adjusted: PlatformFeed = feed(
            vec![json!({
                "id": "adj",
                "attributes": {
                    "stat_type": STAT, "line_score": 230.5,
                    "odds_type": "standard", "adjusted_odds": true
                },
                "relationships": { "new_player": { "data": { "id": "1", "type": "new_player" } } }
            })],
            vec![player("1", "Patrick Mahomes", "KC")],
        );
        f.data.extend(adjusted.data);

        let report = match_props(&sample_events(), &f, MARKET, STAT);
        assert!(report.matches.is_empty());
    }

    #[test]
    fn shuffled_inputs_give_the_same_matches() {
        let forward = match_props(&sample_events(), &sample_feed(), MARKET, STAT);

        let mut events = sample_events();
        for e in &mut events {
            e.bookmakers.reverse();
            for b in &mut e.bookmakers {
                for m in &mut b.markets {
                    m.outcomes.reverse();
                }
            }
        }
        let mut f = sample_feed();
        f.data.reverse();
        f.included.reverse();

        let backward = match_props(&events, &f, MARKET, STAT);
        assert_eq!(forward.matches, backward.matches);
        assert_eq!(forward.sportsbook_only, backward.sportsbook_only);
        assert_eq!(forward.platform_only, backward.platform_only);
    }

    #[test]
    fn duplicate_standard_lines_resolve_to_closest_to_consensus() {
        let f = feed(
            vec![
                projection("1", STAT, 255.5, "standard"),
                projection("1", STAT, 236.5, "standard"),
                projection("1", STAT, 220.5, "standard"),
            ],
            vec![player("1", "Patrick Mahomes", "KC")],
        );
        let report = match_props(&sample_events(), &f, MARKET, STAT);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].platform.line, 236.5);
    }

    #[test]
    fn alternate_over_lines_keep_the_lowest() {
        let events = vec![event(
            "evt1",
            "2025-11-16T18:00:00Z",
            vec![(
                "FanDuel",
                vec![
                    outcome("Over", "Patrick Mahomes", 249.5, 150.0),
                    outcome("Over", "Patrick Mahomes", 237.5, -110.0),
                ],
            )],
        )];
        let index = index_sportsbook(&events, MARKET);
        let q = index["Patrick Mahomes"].quotes["FanDuel"];
        assert_eq!(q.line, 237.5);
        assert_eq!(q.odds, -110.0);
    }

    #[test]
    fn under_only_player_matches_without_quotes() {
        let events = vec![event(
            "evt1",
            "2025-11-16T18:00:00Z",
            vec![("FanDuel", vec![outcome("Under", "Patrick Mahomes", 237.5, -110.0)])],
        )];
        let report = match_props(&events, &sample_feed(), MARKET, STAT);
        assert_eq!(report.matches.len(), 1);
        assert!(report.matches[0].sportsbook.lines.is_empty());
        assert_eq!(report.matches[0].line_difference, None);
    }

    #[test]
    fn earliest_kickoff_wins_for_players_in_several_events() {
        let late = event(
            "evt-late",
            "2025-11-23T18:00:00Z",
            vec![("FanDuel", vec![outcome("Over", "Patrick Mahomes", 240.5, -110.0)])],
        );
        let early = event(
            "evt-early",
            "2025-11-16T18:00:00Z",
            vec![("DraftKings", vec![outcome("Over", "Patrick Mahomes", 237.5, -110.0)])],
        );
        let a = index_sportsbook(&[late.clone(), early.clone()], MARKET);
        let b = index_sportsbook(&[early, late], MARKET);
        assert_eq!(a, b);

        let mahomes = &a["Patrick Mahomes"];
        assert_eq!(mahomes.commence_time, "2025-11-16T18:00:00Z");
        assert_eq!(mahomes.quotes.len(), 1);
        assert_eq!(mahomes.quotes["DraftKings"].line, 237.5);
        assert!(!mahomes.quotes.contains_key("FanDuel"));
    }

    #[test]
    fn later_game_quotes_do_not_leak_into_the_match() {
        let late = event(
            "evt-late",
            "2025-11-23T18:00:00Z",
            vec![("FanDuel", vec![outcome("Over", "Patrick Mahomes", 260.5, -110.0)])],
        );
        let early = event(
            "evt-early",
            "2025-11-16T18:00:00Z",
            vec![("DraftKings", vec![outcome("Over", "Patrick Mahomes", 237.5, -110.0)])],
        );
        let report = match_props(&[late, early], &sample_feed(), MARKET, STAT);

        let mahomes = report.matches.iter().find(|m| m.player == "Patrick Mahomes").unwrap();
        assert_eq!(mahomes.commence_time, "2025-11-16T18:00:00Z");
        assert_eq!(mahomes.sportsbook.lines.keys().map(String::as_str).collect::<Vec<_>>(), vec!["DraftKings"]);
        assert_eq!(mahomes.sportsbook.average_line, Some(237.5));
        assert_eq!(mahomes.line_difference, Some(-2.0));
    }
}
