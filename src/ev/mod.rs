pub mod adjust;
pub mod classifier;
pub mod odds;
pub mod reconcile;

pub use adjust::{adjust_probability, Adjustment};
pub use classifier::{classify, classify_all, BatchOutcome};
pub use odds::odds_to_probability;
pub use reconcile::reference_quote;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
