use rating_core::{Recommendation, Thresholds};

/// Map an overall score to a recommendation: `>= buy` is Buy, else `>= hold`
/// is Hold, else Sell/Avoid. Callers must not pass an undefined score; use
/// [`recommend`] when the score may be missing.
pub fn classify(overall: f64, buy_threshold: f64, hold_threshold: f64) -> Recommendation {
    if overall >= buy_threshold {
        Recommendation::Buy
    } else if overall >= hold_threshold {
        Recommendation::Hold
    } else {
        Recommendation::SellAvoid
    }
}

/// `None` when there is no overall score (insufficient data).
pub fn recommend(overall: Option<f64>, thresholds: &Thresholds) -> Option<Recommendation> {
    overall
        .filter(|v| v.is_finite())
        .map(|v| classify(v, thresholds.buy, thresholds.hold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_boundaries() {
        assert_eq!(classify(8.0, 8.0, 6.0), Recommendation::Buy);
        assert_eq!(classify(7.99, 8.0, 6.0), Recommendation::Hold);
        assert_eq!(classify(6.0, 8.0, 6.0), Recommendation::Hold);
        assert_eq!(classify(5.99, 8.0, 6.0), Recommendation::SellAvoid);
        assert_eq!(classify(10.0, 8.0, 6.0), Recommendation::Buy);
        assert_eq!(classify(0.0, 8.0, 6.0), Recommendation::SellAvoid);
    }

    #[test]
    fn test_inverted_thresholds_skip_hold() {
        // buy below hold: anything reaching hold already reaches buy
        assert_eq!(classify(5.5, 5.0, 6.0), Recommendation::Buy);
        assert_eq!(classify(4.0, 5.0, 6.0), Recommendation::SellAvoid);
    }

    #[test]
    fn test_recommend_handles_missing_score() {
        let t = Thresholds::default();
        assert_eq!(recommend(None, &t), None);
        assert_eq!(recommend(Some(f64::NAN), &t), None);
        assert_eq!(recommend(Some(6.45), &t), Some(Recommendation::Hold));
        assert_eq!(recommend(Some(8.2), &t), Some(Recommendation::Buy));
    }
}
