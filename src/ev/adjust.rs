/// Over/under probabilities after shifting for a line gap (percent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub over: f64,
    pub under: f64,
    /// Raw shift applied before clamping.
    pub adjustment: f64,
}

/// Shift the reference over-probability by `gap × slope × 100` and clamp it to
/// `[floor, ceiling]`.
///
/// `gap` is reference line minus comparison line: a positive gap means the
/// comparison line is lower and so easier to clear, which raises the over side.
pub fn adjust_probability(
    base_over: f64,
    gap: f64,
    slope: f64,
    floor: f64,
    ceiling: f64,
) -> Adjustment {
    let adjustment = gap * slope * 100.0;
    let over = (base_over + adjustment).clamp(floor, ceiling);
    Adjustment {
        over,
        under: 100.0 - over,
        adjustment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn two_unit_gap_adds_four_points() {
        let adj = adjust_probability(52.4, 2.0, 0.02, 5.0, 95.0);
        assert!(close(adj.adjustment, 4.0));
        assert!(close(adj.over, 56.4));
        assert!(close(adj.under, 43.6));
    }

    #[test]
    fn negative_gap_favors_under() {
        let adj = adjust_probability(52.4, -3.0, 0.02, 5.0, 95.0);
        assert!(close(adj.adjustment, -6.0));
        assert!(close(adj.over, 46.4));
        assert!(adj.under > adj.over);
    }

    #[test]
    fn result_is_clamped_to_bounds() {
        let high = adjust_probability(94.0, 10.0, 0.02, 5.0, 95.0);
        assert!(close(high.over, 95.0));
        assert!(close(high.under, 5.0));
        assert!(close(high.adjustment, 20.0));

        let low = adjust_probability(10.0, -10.0, 0.02, 5.0, 95.0);
        assert!(close(low.over, 5.0));
    }

    #[test]
    fn over_rises_monotonically_with_gap() {
        let mut prev = f64::MIN;
        for step in -20..=20 {
            let adj = adjust_probability(50.0, step as f64 * 0.5, 0.02, 5.0, 95.0);
            assert!(adj.over >= prev);
            prev = adj.over;
        }
    }
}
