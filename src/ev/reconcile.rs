use std::collections::BTreeMap;

use crate::types::SportsbookQuote;

/// Pick the reference quote: first bookmaker from `priority` that quoted the prop,
/// otherwise the first bookmaker in name order. None when nobody quoted it.
pub fn reference_quote<'a>(
    lines: &'a BTreeMap<String, SportsbookQuote>,
    priority: &[String],
) -> Option<(&'a str, &'a SportsbookQuote)> {
    priority
        .iter()
        .find_map(|name| lines.get_key_value(name.as_str()))
        .or_else(|| lines.iter().next())
        .map(|(name, quote)| (name.as_str(), quote))
}
