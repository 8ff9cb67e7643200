pub mod names;
pub mod props;

pub use names::normalize_player_name;
pub use props::{index_platform, index_sportsbook, match_props, SportsbookPlayer};
