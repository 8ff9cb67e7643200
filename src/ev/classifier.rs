use serde::Deserialize;
use tracing::warn;

use super::{adjust_probability, odds_to_probability, reference_quote, round_to};
use crate::config::EvConfig;
use crate::error::{AppError, Result};
use crate::types::{EvAnalysis, EvResult, EvVerdict, MatchedProp, Side};

/// Score one matched prop against its reference sportsbook quote.
///
/// A prop with no over quotes yields `NoReferenceData`. Errors mean the record
/// itself is unusable (non-finite line, zero odds) and should be skipped.
pub fn classify(prop: &MatchedProp, cfg: &EvConfig) -> Result<EvResult> {
    let Some((bookmaker, quote)) = reference_quote(&prop.sportsbook.lines, &cfg.bookmaker_priority)
    else {
        return Ok(EvResult {
            prop: prop.clone(),
            ev_analysis: EvAnalysis::NoReferenceData {
                message: "No sportsbook lines available".to_string(),
            },
        });
    };

    if !prop.platform.line.is_finite() || !quote.line.is_finite() {
        return Err(AppError::MalformedRecord(format!(
            "{}: non-finite line (platform {}, {bookmaker} {})",
            prop.player, prop.platform.line, quote.line
        )));
    }

    let over_probability = odds_to_probability(quote.odds)?;
    let gap = quote.line - prop.platform.line;
    let slope = cfg.slope_for(&prop.market);
    let adj = adjust_probability(
        over_probability,
        gap,
        slope,
        cfg.probability_floor,
        cfg.probability_ceiling,
    );

    let (better_side, implied) = if adj.over > adj.under {
        (Side::Over, adj.over)
    } else {
        (Side::Under, adj.under)
    };

    let tier = cfg
        .risk_tier(implied)
        .ok_or_else(|| AppError::Config("no risk tiers configured".to_string()))?;
    let breakeven = cfg.breakeven();

    let verdict = EvVerdict {
        bookmaker_used: bookmaker.to_string(),
        better_side,
        implied_probability: round_to(implied, 2),
        adjusted_over_probability: round_to(adj.over, 2),
        adjusted_under_probability: round_to(adj.under, 2),
        reference_line: quote.line,
        reference_odds: quote.odds,
        sportsbook_over_probability: round_to(over_probability, 2),
        line_difference: round_to(gap, 2),
        probability_adjustment: round_to(adj.adjustment, 2),
        slope_used: slope,
        risk_level: tier.level.clone(),
        risk_color: tier.color.clone(),
        risk_label: tier.label.clone(),
        breakeven_slip: cfg.reference_slip.clone(),
        breakeven_rate: breakeven,
        edge_over_breakeven: round_to(implied - breakeven, 2),
    };

    Ok(EvResult {
        prop: prop.clone(),
        ev_analysis: EvAnalysis::Calculated(verdict),
    })
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<EvResult>,
    /// (index in the input array, reason) for every excluded record.
    pub skipped: Vec<(usize, String)>,
}

/// Classify every record of a matched-props array. Failures are per record:
/// a bad record is logged and excluded, the rest of the batch still runs.
pub fn classify_all(records: &[serde_json::Value], cfg: &EvConfig) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (idx, record) in records.iter().enumerate() {
        let scored = MatchedProp::deserialize(record)
            .map_err(AppError::from)
            .and_then(|prop| classify(&prop, cfg));

        match scored {
            Ok(result) => outcome.results.push(result),
            Err(e) => {
                let player = record
                    .get("player")
                    .and_then(|p| p.as_str())
                    .unwrap_or("?");
                warn!(event = "RECORD_SKIPPED", index = idx, player, "Skipping matched prop: {e}");
                outcome.skipped.push((idx, e.to_string()));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlatformLine, SportsbookLines, SportsbookQuote};
    use std::collections::BTreeMap;

    fn prop(platform_line: f64, quotes: &[(&str, f64, f64)]) -> MatchedProp {
        let lines: BTreeMap<String, SportsbookQuote> = quotes
            .iter()
            .map(|(b, line, odds)| (b.to_string(), SportsbookQuote { line: *line, odds: *odds }))
            .collect();
        let average_line = if lines.is_empty() {
            None
        } else {
            Some(lines.values().map(|q| q.line).sum::<f64>() / lines.len() as f64)
        };
        MatchedProp {
            player: "Player X".to_string(),
            game: "Away @ Home".to_string(),
            commence_time: "2025-11-16T18:00:00Z".to_string(),
            market: "player_pass_yds".to_string(),
            platform: PlatformLine {
                line: platform_line,
                team: "KC".to_string(),
                stat_type: "Pass Yards".to_string(),
                odds_type: "standard".to_string(),
            },
            line_difference: average_line.map(|a| platform_line - a),
            sportsbook: SportsbookLines { lines, average_line },
        }
    }

    #[test]
    fn end_to_end_scenario_is_marginal_over() {
        let cfg = EvConfig::default();
        let result = classify(&prop(235.5, &[("FanDuel", 237.5, -110.0)]), &cfg).unwrap();
        let v = result.verdict().unwrap();

        assert_eq!(v.bookmaker_used, "FanDuel");
        assert_eq!(v.better_side, Side::Over);
        assert_eq!(v.line_difference, 2.0);
        assert_eq!(v.sportsbook_over_probability, 52.38);
        assert_eq!(v.probability_adjustment, 4.0);
        assert_eq!(v.adjusted_over_probability, 56.38);
        assert_eq!(v.adjusted_under_probability, 43.62);
        assert_eq!(v.implied_probability, 56.38);
        assert_eq!(v.edge_over_breakeven, -1.36);
        assert_eq!(v.risk_level, "moderate");
        assert_eq!(v.risk_label, "Marginal");
    }

    #[test]
    fn higher_platform_line_favors_under() {
        let cfg = EvConfig::default();
        let result = classify(&prop(245.5, &[("DraftKings", 237.5, -110.0)]), &cfg).unwrap();
        let v = result.verdict().unwrap();
        assert_eq!(v.better_side, Side::Under);
        // 52.38 - 16 = 36.38 over → 63.62 under
        assert_eq!(v.implied_probability, 63.62);
        assert_eq!(v.risk_level, "low");
    }

    #[test]
    fn no_quotes_is_unscored_not_error() {
        let cfg = EvConfig::default();
        let result = classify(&prop(235.5, &[]), &cfg).unwrap();
        assert!(matches!(result.ev_analysis, EvAnalysis::NoReferenceData { .. }));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ev_analysis"]["status"], "no_reference_data");
        assert_eq!(json["player"], "Player X");
    }

    #[test]
    fn classification_is_deterministic() {
        let cfg = EvConfig::default();
        let p = prop(235.5, &[("BetMGM", 236.5, -120.0), ("Caesars", 238.5, 105.0)]);
        let a = serde_json::to_string(&classify(&p, &cfg).unwrap()).unwrap();
        let b = serde_json::to_string(&classify(&p, &cfg).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_skips_bad_records_and_keeps_going() {
        let cfg = EvConfig::default();
        let good = serde_json::to_value(prop(235.5, &[("FanDuel", 237.5, -110.0)])).unwrap();
        let zero_odds = serde_json::to_value(prop(235.5, &[("FanDuel", 237.5, 0.0)])).unwrap();
        let missing_fields = serde_json::json!({ "player": "Broken" });

        let outcome = classify_all(&[missing_fields, good, zero_odds], &cfg);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].prop.player, "Player X");
        let skipped: Vec<usize> = outcome.skipped.iter().map(|(i, _)| *i).collect();
        assert_eq!(skipped, vec![0, 2]);
    }

    #[test]
    fn calculated_status_is_serialized_inline() {
        let cfg = EvConfig::default();
        let result = classify(&prop(235.5, &[("FanDuel", 237.5, -110.0)]), &cfg).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ev_analysis"]["status"], "calculated");
        assert_eq!(json["ev_analysis"]["better_side"], "over");

        let back: EvResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
