use rating_core::samples::SAMPLE_UNIVERSE;
use rating_orchestrator::{Assessment, RatingReport};
use std::fmt::Write;

const INSUFFICIENT_DATA: &str = "Insufficient data";

/// Plain-text report for a terminal.
pub fn text(report: &RatingReport) -> String {
    let mut out = String::new();
    let i = &report.instrument;
    let _ = writeln!(out, "Detected: {} · {} · {}", i.market, i.kind, i.code);

    match &report.assessment {
        Assessment::Rated { score, recommendation } => {
            let headline = match (score.overall, recommendation) {
                (Some(overall), Some(rec)) => format!("Overall: {:.2}/10 -> {}", overall, rec),
                _ => format!("Overall: n/a -> {}", INSUFFICIENT_DATA),
            };
            let _ = writeln!(out, "{}", headline);
            let _ = writeln!(
                out,
                "Thresholds: buy >= {:.2}, hold >= {:.2}",
                report.thresholds.buy, report.thresholds.hold
            );
            let _ = writeln!(out, "Sector: {}", score.sector);
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:<18} {:>7} {:>7} {:>6}  {}",
                "Factor", "Weight", "Eff.", "Score", "Why"
            );
            for row in &score.factors {
                let score = row.score.map(|s| format!("{:.2}", s)).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{:<18} {:>7.3} {:>7.3} {:>6}  {}",
                    row.factor.key(),
                    row.nominal_weight,
                    row.weight,
                    score,
                    row.rationale
                );
            }
        }
        Assessment::Unscored { message, nominal_weights, .. } => {
            let _ = writeln!(out, "{}", message);
            let _ = writeln!(out);
            let _ = writeln!(out, "{:<18} {:>7}", "Factor", "Weight");
            for (factor, weight) in nominal_weights {
                let _ = writeln!(out, "{:<18} {:>7.3}", factor, weight);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Key metrics");
    let metrics = serde_json::Value::Object(report.key_metrics.clone());
    let _ = writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&metrics).unwrap_or_else(|_| metrics.to_string())
    );
    out
}

pub fn json(report: &RatingReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn samples() -> String {
    let mut out = String::new();
    for (bucket, codes) in SAMPLE_UNIVERSE {
        let _ = writeln!(out, "{:<20} {}", bucket, codes.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use factor_scoring::StockScoringEngine;
    use rating_core::{Instrument, InstrumentKind, RawMetrics, Recommendation, Thresholds};
    use std::collections::BTreeMap;

    fn stock_report(metrics: RawMetrics, recommendation: Option<Recommendation>) -> RatingReport {
        let instrument = Instrument::detect("AAPL").unwrap();
        let score = StockScoringEngine::default()
            .score(instrument.market, &instrument.code, &metrics)
            .unwrap();
        RatingReport {
            key_metrics: metrics.key_metrics(),
            instrument,
            generated_at: Utc::now(),
            thresholds: Thresholds::default(),
            assessment: Assessment::Rated { score, recommendation },
        }
    }

    #[test]
    fn test_text_for_rated_stock() {
        let metrics = RawMetrics {
            price: Some(100.0),
            pe: Some(18.0),
            sector: Some("Technology".to_string()),
            ..Default::default()
        };
        let out = text(&stock_report(metrics, Some(Recommendation::Hold)));

        assert!(out.starts_with("Detected: US · Stock · AAPL"));
        assert!(out.contains("-> Hold"));
        assert!(out.contains("Sector: Technology"));
        assert!(out.contains("pe_vs_sector"));
        assert!(out.contains("Proxy: fixed placeholder"));
        assert!(out.contains("\"price\": 100.0"));
        assert!(out.contains("\"pb\": null"));
    }

    #[test]
    fn test_text_for_missing_overall() {
        let mut report = stock_report(RawMetrics { price: Some(1.0), ..Default::default() }, None);
        if let Assessment::Rated { score, .. } = &mut report.assessment {
            score.overall = None;
        }
        assert!(text(&report).contains("Overall: n/a -> Insufficient data"));
    }

    #[test]
    fn test_text_for_unscored_fund() {
        let report = RatingReport {
            instrument: Instrument::detect("VFIAX").unwrap(),
            generated_at: Utc::now(),
            thresholds: Thresholds::default(),
            assessment: Assessment::Unscored {
                kind: InstrumentKind::MutualFund,
                message: rating_orchestrator::UNSCORED_MESSAGE.to_string(),
                nominal_weights: BTreeMap::from([("expense".to_string(), 0.1)]),
            },
            key_metrics: RawMetrics::default().key_metrics(),
        };
        let out = text(&report);
        assert!(out.contains("Mutual Fund"));
        assert!(out.contains("ETF/MF scoring not implemented"));
        assert!(out.contains("expense"));
        assert!(!out.contains("Overall"));
    }

    #[test]
    fn test_json_is_parseable() {
        let metrics = RawMetrics { price: Some(100.0), ..Default::default() };
        let out = json(&stock_report(metrics, Some(Recommendation::SellAvoid))).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["assessment"]["recommendation"], "Sell/Avoid");
        assert_eq!(v["key_metrics"]["price"], 100.0);
    }

    #[test]
    fn test_samples_lists_every_bucket() {
        let out = samples();
        assert_eq!(out.lines().count(), SAMPLE_UNIVERSE.len());
        assert!(out.contains("NSE:NIFTYBEES"));
        assert!(out.contains("INF109K01ZB3"));
    }
}
