/// Canonical form used as the join key between the two feeds.
///
/// Only whitespace is normalized: leading/trailing runs are dropped and inner
/// runs collapse to one space. Case, punctuation, suffixes ("Jr", "III") and
/// diacritics are left alone, so "AJ Brown" and "A.J. Brown" stay distinct.
pub fn normalize_player_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
