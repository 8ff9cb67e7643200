use crate::error::{AppError, Result};

/// Convert American odds to implied probability, in percent.
///
/// -110 → 52.38, +150 → 40.0. Zero has no meaning as an American price and is rejected.
pub fn odds_to_probability(odds: f64) -> Result<f64> {
    if odds == 0.0 || !odds.is_finite() {
        return Err(AppError::InvalidOdds(odds));
    }
    let p = if odds < 0.0 {
        odds.abs() / (odds.abs() + 100.0)
    } else {
        100.0 / (odds + 100.0)
    };
    Ok(p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_and_underdog_reference_values() {
        assert!((odds_to_probability(-110.0).unwrap() - 52.38).abs() < 0.01);
        assert!((odds_to_probability(150.0).unwrap() - 40.0).abs() < 1e-9);
        assert!((odds_to_probability(-100.0).unwrap() - 50.0).abs() < 1e-9);
        assert!((odds_to_probability(100.0).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_and_non_finite_odds_rejected() {
        assert!(matches!(odds_to_probability(0.0), Err(AppError::InvalidOdds(_))));
        assert!(odds_to_probability(f64::NAN).is_err());
        assert!(odds_to_probability(f64::INFINITY).is_err());
    }

    #[test]
    fn probability_stays_strictly_inside_bounds() {
        for odds in [-100_000.0, -5000.0, -250.0, -101.0, -1.0, 1.0, 99.0, 350.0, 25_000.0] {
            let p = odds_to_probability(odds).unwrap();
            assert!(p > 0.0 && p < 100.0, "odds {odds} gave {p}");
        }
    }
}
