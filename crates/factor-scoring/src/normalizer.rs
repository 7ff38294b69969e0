//! Per-factor scoring functions.
//!
//! Each function maps raw metrics plus sector medians to a score in [0, 10],
//! or `None` when a required input is missing or zero.

use rating_core::RawMetrics;
use serde::Serialize;

use crate::reference::SectorMedians;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Fixed score for qualitative factors that have no model yet.
pub const PLACEHOLDER_SCORE: f64 = 6.0;

/// Price/book treated as healthy
const TARGET_PRICE_TO_BOOK: f64 = 3.0;

/// Divisor applied to the yield in percent; a 6% yield scores 10
const YIELD_PCT_DIVISOR: f64 = 0.6;

pub type FactorFn = fn(&RawMetrics, &SectorMedians) -> FactorScore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub score: Option<f64>,
    pub rationale: String,
}

impl FactorScore {
    fn new(score: Option<f64>, rationale: impl Into<String>) -> Self {
        Self {
            score: score.map(clamp_score),
            rationale: rationale.into(),
        }
    }
}

pub fn clamp_score(x: f64) -> f64 {
    x.clamp(MIN_SCORE, MAX_SCORE)
}

/// Unclamped score of a price multiple against its sector median: 5 at the
/// median, higher when cheaper. `None` if either side is missing, zero or non-finite.
pub fn relative_value(actual: Option<f64>, median: f64) -> Option<f64> {
    match actual {
        Some(a) if a != 0.0 && a.is_finite() && median != 0.0 && median.is_finite() => {
            Some(5.0 + 5.0 * ((median / a) - 1.0))
        }
        _ => None,
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{:.2}", x))
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{:.1}%", x * 100.0))
}

pub fn pe_vs_sector(m: &RawMetrics, med: &SectorMedians) -> FactorScore {
    match relative_value(m.pe, med.pe) {
        Some(s) => FactorScore::new(Some(s), format!("P/E {} vs sector {}", fmt_opt(m.pe), med.pe)),
        None => FactorScore::new(None, format!("Insufficient data: P/E {} vs sector {}", fmt_opt(m.pe), med.pe)),
    }
}

/// Distance of price/book from ~3, two points per unit.
pub fn financial_health(m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    match m.pb.filter(|pb| *pb != 0.0) {
        Some(pb) => FactorScore::new(
            Some(10.0 - (pb - TARGET_PRICE_TO_BOOK).abs() * 2.0),
            format!("P/B {:.2} (target ~3)", pb),
        ),
        None => FactorScore::new(None, "Insufficient data: P/B unavailable"),
    }
}

/// Mean of the available P/E, P/S and P/FCF relative-value scores.
pub fn valuation(m: &RawMetrics, med: &SectorMedians) -> FactorScore {
    let parts: Vec<f64> = [
        relative_value(m.pe, med.pe),
        relative_value(m.ps, med.ps),
        relative_value(m.pfcf, med.pfcf),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        return FactorScore::new(None, "Insufficient data: no PE/PS/PFCF vs sector medians");
    }
    let mean = parts.iter().sum::<f64>() / parts.len() as f64;
    FactorScore::new(
        Some(mean),
        format!("PE/PS/PFCF vs sector medians ({} of 3 ratios)", parts.len()),
    )
}

/// Price momentum. Missing returns count as 0 rather than making the factor undefined.
pub fn growth(m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    let one_year = m.r_1y.unwrap_or(0.0) * 10.0;
    let three_year = m.r_3y.unwrap_or(0.0) * 5.0;
    FactorScore::new(
        Some(5.0 + (one_year + three_year) / 2.0),
        format!("1Y {} / 3Y {}", fmt_pct(m.r_1y), fmt_pct(m.r_3y)),
    )
}

/// Placeholder: no management model exists yet.
pub fn management(_m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    FactorScore::new(Some(PLACEHOLDER_SCORE), "Proxy: fixed placeholder (6.0)")
}

/// Placeholder: no moat model exists yet.
pub fn moat(_m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    FactorScore::new(Some(PLACEHOLDER_SCORE), "Proxy: fixed placeholder (6.0)")
}

/// Penalizes beta away from 1 in either direction. Missing or zero beta reads as 1.
pub fn risk(m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    let reported = m.beta.filter(|b| *b != 0.0);
    let beta = reported.unwrap_or(1.0);
    let rationale = match reported {
        Some(_) => format!("Beta {:.2}", beta),
        None => "Beta n/a (assumed 1.00)".to_string(),
    };
    FactorScore::new(Some(10.0 - (beta - 1.0).abs() * 5.0), rationale)
}

/// Yield in percent divided by 0.6, so 6% and above score 10. Undefined when the yield is unknown.
pub fn dividend(m: &RawMetrics, _med: &SectorMedians) -> FactorScore {
    match m.div_yield {
        Some(y) => {
            let rationale = if y != 0.0 {
                format!("Yield {:.2}%", y * 100.0)
            } else {
                "No dividend".to_string()
            };
            FactorScore::new(Some(y * 100.0 / YIELD_PCT_DIVISOR), rationale)
        }
        None => FactorScore::new(None, "No dividend"),
    }
}
