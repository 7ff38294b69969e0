use chrono::{DateTime, Utc};
use factor_scoring::weights::{etf_weights, fund_weights};
use factor_scoring::{recommend, ReferenceTables, StockScore, StockScoringEngine};
use rating_core::{
    Instrument, InstrumentKind, MetricsProvider, RatingConfig, RatingError, Recommendation, Thresholds,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const UNSCORED_MESSAGE: &str = "ETF/MF scoring not implemented";

/// Outcome of rating one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    Rated {
        score: StockScore,
        /// `None` when no factor had data
        recommendation: Option<Recommendation>,
    },
    /// ETFs and mutual funds: the nominal factor weights are known, the
    /// scoring model is not.
    Unscored {
        kind: InstrumentKind,
        message: String,
        nominal_weights: BTreeMap<String, f64>,
    },
}

impl Assessment {
    pub fn overall(&self) -> Option<f64> {
        match self {
            Assessment::Rated { score, .. } => score.overall,
            Assessment::Unscored { .. } => None,
        }
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            Assessment::Rated { recommendation, .. } => *recommendation,
            Assessment::Unscored { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingReport {
    pub instrument: Instrument,
    pub generated_at: DateTime<Utc>,
    pub thresholds: Thresholds,
    pub assessment: Assessment,
    pub key_metrics: serde_json::Map<String, serde_json::Value>,
}

/// Ties detection, data fetch, scoring and classification together.
#[derive(Clone)]
pub struct RatingOrchestrator {
    provider: Arc<dyn MetricsProvider>,
    engine: StockScoringEngine,
}

impl RatingOrchestrator {
    pub fn new(provider: Arc<dyn MetricsProvider>, engine: StockScoringEngine) -> Self {
        Self { provider, engine }
    }

    /// Scoring engine over the configured reference tables, or the built-in ones.
    pub fn from_config(config: &RatingConfig, provider: Arc<dyn MetricsProvider>) -> Result<Self, RatingError> {
        let tables = match &config.reference_tables_path {
            Some(path) => ReferenceTables::from_path(path)?,
            None => ReferenceTables::builtin(),
        };
        Ok(Self::new(provider, StockScoringEngine::new(Arc::new(tables))))
    }

    pub fn engine(&self) -> &StockScoringEngine {
        &self.engine
    }

    pub async fn rate(&self, raw_code: &str, thresholds: &Thresholds) -> Result<RatingReport, RatingError> {
        let instrument = Instrument::detect(raw_code)?;
        tracing::info!(
            "Rating {} ({} {})",
            instrument.code,
            instrument.market,
            instrument.kind
        );

        let metrics = self.provider.fetch(&instrument).await?.sanitized();
        if !metrics.has_price() {
            return Err(RatingError::NoPriceData(instrument.code.clone()));
        }

        let assessment = match instrument.kind {
            InstrumentKind::Stock => {
                let score = self.engine.score(instrument.market, &instrument.code, &metrics)?;
                let recommendation = recommend(score.overall, thresholds);
                match (score.overall, recommendation) {
                    (Some(overall), Some(rec)) => {
                        tracing::info!("{}: overall {:.2} -> {}", instrument.code, overall, rec)
                    }
                    _ => tracing::warn!("{}: insufficient data for an overall score", instrument.code),
                }
                Assessment::Rated { score, recommendation }
            }
            kind => Assessment::Unscored {
                kind,
                message: UNSCORED_MESSAGE.to_string(),
                nominal_weights: nominal_weights(kind),
            },
        };

        Ok(RatingReport {
            key_metrics: metrics.key_metrics(),
            instrument,
            generated_at: Utc::now(),
            thresholds: *thresholds,
            assessment,
        })
    }
}

fn nominal_weights(kind: InstrumentKind) -> BTreeMap<String, f64> {
    match kind {
        InstrumentKind::Etf => etf_weights().iter().map(|(f, w)| (f.key().to_string(), w)).collect(),
        InstrumentKind::MutualFund => fund_weights().iter().map(|(f, w)| (f.key().to_string(), w)).collect(),
        InstrumentKind::Stock => BTreeMap::new(),
    }
}
