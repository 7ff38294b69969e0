use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RatingError;

/// Market an instrument trades in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    US,
    India,
}

impl Market {
    pub fn label(&self) -> &'static str {
        match self {
            Market::US => "US",
            Market::India => "India",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Market {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Market::US),
            "INDIA" | "IN" => Ok(Market::India),
            other => Err(RatingError::InvalidInput(format!("unknown market '{}'", other))),
        }
    }
}

/// Instrument class. Only stocks have a scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Stock,
    #[serde(rename = "ETF")]
    Etf,
    #[serde(rename = "Mutual Fund")]
    MutualFund,
}

impl InstrumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentKind::Stock => "Stock",
            InstrumentKind::Etf => "ETF",
            InstrumentKind::MutualFund => "Mutual Fund",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const INDIA_EXCHANGE_PREFIXES: [&str; 2] = ["NSE:", "BSE:"];

/// A detected instrument identity. Immutable once built by [`Instrument::detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub market: Market,
    pub kind: InstrumentKind,
    /// Normalized (trimmed, upper-cased) code as entered, exchange prefix included
    pub code: String,
}

impl Instrument {
    /// Detect market and instrument class from a free-text code.
    ///
    /// Rules, first match wins:
    /// - `INF...` ISINs are Indian mutual funds, 5-letter codes ending in `X` are US mutual funds
    /// - `NSE:`/`BSE:` prefixed codes are Indian stocks, whatever the symbol
    /// - bare codes ending in `BEES` are Indian ETFs
    /// - anything else is a US stock
    pub fn detect(raw: &str) -> Result<Self, RatingError> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(RatingError::InvalidInput("empty instrument code".to_string()));
        }

        let (market, kind) = if code.starts_with("INF") {
            (Market::India, InstrumentKind::MutualFund)
        } else if code.chars().count() == 5 && code.ends_with('X') {
            (Market::US, InstrumentKind::MutualFund)
        } else if INDIA_EXCHANGE_PREFIXES.iter().any(|p| code.starts_with(p)) {
            (Market::India, InstrumentKind::Stock)
        } else if code.ends_with("BEES") {
            (Market::India, InstrumentKind::Etf)
        } else {
            (Market::US, InstrumentKind::Stock)
        };

        Ok(Self { market, kind, code })
    }

    /// The code with any `NSE:`/`BSE:` prefix removed.
    pub fn exchange_symbol(&self) -> &str {
        INDIA_EXCHANGE_PREFIXES
            .iter()
            .find_map(|p| self.code.strip_prefix(p))
            .unwrap_or(&self.code)
    }
}

/// Fields exposed in the "key metrics" view of a bundle.
pub const KEY_METRIC_FIELDS: [&str; 11] = [
    "price", "pe", "pb", "ps", "pfcf", "div_yield", "beta", "r_1y", "r_3y", "sector", "industry",
];

/// Raw market metrics for one instrument. `None` means unknown, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub price: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub beta: Option<f64>,
    /// Trailing price/earnings
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    /// Price/free-cash-flow proxy (filled from the PEG ratio by the Yahoo client)
    pub pfcf: Option<f64>,
    /// Dividend yield as a fraction (0.02 = 2%)
    pub div_yield: Option<f64>,
    /// 1-year price return as a fraction
    pub r_1y: Option<f64>,
    /// 3-year price return as a fraction
    pub r_3y: Option<f64>,
}

impl RawMetrics {
    /// Drop NaN/infinite values so they read as missing.
    pub fn sanitized(mut self) -> Self {
        for field in [
            &mut self.price,
            &mut self.beta,
            &mut self.pe,
            &mut self.pb,
            &mut self.ps,
            &mut self.pfcf,
            &mut self.div_yield,
            &mut self.r_1y,
            &mut self.r_3y,
        ] {
            *field = field.filter(|v| v.is_finite());
        }
        self.sector = self.sector.filter(|s| !s.trim().is_empty());
        self.industry = self.industry.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn has_price(&self) -> bool {
        self.price.map_or(false, |p| p.is_finite())
    }

    /// Display view restricted to [`KEY_METRIC_FIELDS`]; missing values are `null`.
    pub fn key_metrics(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut all = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        KEY_METRIC_FIELDS
            .iter()
            .map(|k| {
                let v = all.remove(*k).unwrap_or(serde_json::Value::Null);
                (k.to_string(), v)
            })
            .collect()
    }
}

/// Discrete recommendation derived from an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Hold,
    #[serde(rename = "Sell/Avoid")]
    SellAvoid,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::SellAvoid => "Sell/Avoid",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_BUY_THRESHOLD: f64 = 8.0;
pub const DEFAULT_HOLD_THRESHOLD: f64 = 6.0;

/// Buy/hold cut-offs on the 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub buy: f64,
    pub hold: f64,
}

impl Thresholds {
    /// Both thresholds must lie in [0, 10]. `buy >= hold` is expected but not enforced.
    pub fn new(buy: f64, hold: f64) -> Result<Self, RatingError> {
        for (name, value) in [("buy", buy), ("hold", hold)] {
            if !value.is_finite() || !(0.0..=10.0).contains(&value) {
                return Err(RatingError::InvalidConfig(format!(
                    "{} threshold {} outside [0, 10]",
                    name, value
                )));
            }
        }
        if buy < hold {
            tracing::warn!(
                "Buy threshold {:.2} is below hold threshold {:.2}; Hold can never be returned",
                buy,
                hold
            );
        }
        Ok(Self { buy, hold })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            buy: DEFAULT_BUY_THRESHOLD,
            hold: DEFAULT_HOLD_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(code: &str) -> (Market, InstrumentKind) {
        let i = Instrument::detect(code).unwrap();
        (i.market, i.kind)
    }

    #[test]
    fn test_detect_default_us_stock() {
        assert_eq!(detect("aapl"), (Market::US, InstrumentKind::Stock));
        assert_eq!(detect("  msft "), (Market::US, InstrumentKind::Stock));
        assert_eq!(detect("VOO"), (Market::US, InstrumentKind::Stock));
    }

    #[test]
    fn test_detect_mutual_funds() {
        assert_eq!(detect("VFIAX"), (Market::US, InstrumentKind::MutualFund));
        assert_eq!(detect("INF109K01ZB3"), (Market::India, InstrumentKind::MutualFund));
        // 4 letters ending in X is not a fund code
        assert_eq!(detect("ABCX"), (Market::US, InstrumentKind::Stock));
    }

    #[test]
    fn test_detect_india() {
        assert_eq!(detect("NSE:INFY"), (Market::India, InstrumentKind::Stock));
        assert_eq!(detect("bse:tcs"), (Market::India, InstrumentKind::Stock));
        assert_eq!(detect("BANKBEES"), (Market::India, InstrumentKind::Etf));
    }

    #[test]
    fn test_exchange_prefix_wins_over_bees_suffix() {
        assert_eq!(detect("NSE:NIFTYBEES"), (Market::India, InstrumentKind::Stock));
        assert_eq!(detect("bse:juniorbees"), (Market::India, InstrumentKind::Stock));
        assert_eq!(detect("NIFTYBEES"), (Market::India, InstrumentKind::Etf));
    }

    #[test]
    fn test_detect_rejects_empty() {
        assert!(matches!(Instrument::detect("   "), Err(RatingError::InvalidInput(_))));
    }

    #[test]
    fn test_exchange_symbol() {
        let i = Instrument::detect("nse:reliance").unwrap();
        assert_eq!(i.code, "NSE:RELIANCE");
        assert_eq!(i.exchange_symbol(), "RELIANCE");
        assert_eq!(Instrument::detect("AAPL").unwrap().exchange_symbol(), "AAPL");
    }

    #[test]
    fn test_sanitized_drops_non_finite() {
        let m = RawMetrics {
            price: Some(f64::NAN),
            pe: Some(f64::INFINITY),
            pb: Some(3.0),
            sector: Some("  ".to_string()),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(m.price, None);
        assert_eq!(m.pe, None);
        assert_eq!(m.pb, Some(3.0));
        assert_eq!(m.sector, None);
        assert!(!m.has_price());
    }

    #[test]
    fn test_key_metrics_allow_list() {
        let m = RawMetrics {
            price: Some(190.5),
            sector: Some("Technology".to_string()),
            ..Default::default()
        };
        let km = m.key_metrics();
        assert_eq!(km.len(), KEY_METRIC_FIELDS.len());
        assert_eq!(km["price"], serde_json::json!(190.5));
        assert_eq!(km["sector"], serde_json::json!("Technology"));
        assert!(km["beta"].is_null());
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(Thresholds::new(8.0, 6.0).is_ok());
        assert!(Thresholds::new(10.5, 6.0).is_err());
        assert!(Thresholds::new(8.0, -0.5).is_err());
        assert!(Thresholds::new(f64::NAN, 6.0).is_err());
        // inverted order is tolerated
        assert!(Thresholds::new(5.0, 6.0).is_ok());
    }

    #[test]
    fn test_recommendation_serde_label() {
        assert_eq!(
            serde_json::to_value(Recommendation::SellAvoid).unwrap(),
            serde_json::json!("Sell/Avoid")
        );
        assert_eq!(Recommendation::Hold.to_string(), "Hold");
    }

    #[test]
    fn test_market_from_str() {
        assert_eq!("india".parse::<Market>().unwrap(), Market::India);
        assert_eq!("US".parse::<Market>().unwrap(), Market::US);
        assert!("EU".parse::<Market>().is_err());
    }
}
