use rating_core::{Market, RatingError, RawMetrics};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::factors::StockFactor;
use crate::normalizer::{self, FactorFn, FactorScore};
use crate::reference::{ReferenceTables, SectorMedians, DEFAULT_BUCKET};
use crate::weights::{stock_weights, WeightSet};

impl StockFactor {
    fn scorer(&self) -> FactorFn {
        match self {
            StockFactor::PeVsSector => normalizer::pe_vs_sector,
            StockFactor::FinancialHealth => normalizer::financial_health,
            StockFactor::Valuation => normalizer::valuation,
            StockFactor::Growth => normalizer::growth,
            StockFactor::Management => normalizer::management,
            StockFactor::Moat => normalizer::moat,
            StockFactor::Risk => normalizer::risk,
            StockFactor::Dividend => normalizer::dividend,
        }
    }

    pub fn evaluate(&self, metrics: &RawMetrics, medians: &SectorMedians) -> FactorScore {
        (self.scorer())(metrics, medians)
    }
}

/// One row of the score breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub factor: StockFactor,
    pub nominal_weight: f64,
    /// Weight after renormalizing over factors that have a score
    pub weight: f64,
    pub score: Option<f64>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockScore {
    pub market: Market,
    pub code: String,
    /// Sector used for the median lookup (`Default` when unknown)
    pub sector: String,
    /// Weighted 0-10 score rounded to 2 decimals; `None` when no factor has a score
    pub overall: Option<f64>,
    pub factors: Vec<FactorBreakdown>,
}

impl StockScore {
    pub fn sub_score(&self, factor: StockFactor) -> Option<f64> {
        self.breakdown(factor).and_then(|b| b.score)
    }

    pub fn rationale(&self, factor: StockFactor) -> Option<&str> {
        self.breakdown(factor).map(|b| b.rationale.as_str())
    }

    pub fn breakdown(&self, factor: StockFactor) -> Option<&FactorBreakdown> {
        self.factors.iter().find(|b| b.factor == factor)
    }
}

/// Scores stocks against sector medians. Holds only read-only data, so one
/// instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct StockScoringEngine {
    tables: Arc<ReferenceTables>,
    weights: WeightSet<StockFactor>,
}

impl StockScoringEngine {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self {
            tables,
            weights: stock_weights(),
        }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn weights(&self) -> &WeightSet<StockFactor> {
        &self.weights
    }

    /// Score a stock. Sparse bundles never fail; missing metrics leave the
    /// matching factors undefined and their weight is spread over the rest.
    /// Non-finite metrics count as missing. The only error is a reference
    /// table without an entry for `market`.
    pub fn score(&self, market: Market, code: &str, metrics: &RawMetrics) -> Result<StockScore, RatingError> {
        let metrics = &metrics.clone().sanitized();
        let sector = metrics
            .sector
            .clone()
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let medians = self.tables.sector_medians(market, &sector)?;

        let scored: Vec<(StockFactor, FactorScore)> = StockFactor::ALL
            .iter()
            .map(|f| (*f, f.evaluate(metrics, medians)))
            .collect();

        let available: BTreeSet<StockFactor> = scored
            .iter()
            .filter(|(_, s)| s.score.is_some())
            .map(|(f, _)| *f)
            .collect();
        let effective = self.weights.resolve(&available);

        let overall = if available.is_empty() {
            None
        } else {
            let sum: f64 = scored
                .iter()
                .filter_map(|(f, s)| s.score.map(|v| effective.get(*f) * v))
                .sum();
            Some(round2(sum))
        };

        for (f, s) in &scored {
            tracing::debug!(
                "{} {}: score={:?} weight={:.3} ({})",
                code,
                f.key(),
                s.score,
                effective.get(*f),
                s.rationale
            );
        }

        let factors = scored
            .into_iter()
            .map(|(factor, s)| FactorBreakdown {
                factor,
                nominal_weight: self.weights.get(factor),
                weight: effective.get(factor),
                score: s.score,
                rationale: s.rationale,
            })
            .collect();

        Ok(StockScore {
            market,
            code: code.to_string(),
            sector,
            overall,
            factors,
        })
    }
}

impl Default for StockScoringEngine {
    fn default() -> Self {
        Self::new(Arc::new(ReferenceTables::builtin()))
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
