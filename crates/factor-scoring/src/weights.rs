//! Factor weights and their renormalization over available factors.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::factors::{EtfFactor, FundFactor, StockFactor};

/// Zero the weight of every factor outside `available`, then scale the rest
/// to sum to 1. If nothing remains, every weight is 0.
pub fn resolve<K: Ord + Copy>(nominal: &BTreeMap<K, f64>, available: &BTreeSet<K>) -> BTreeMap<K, f64> {
    let masked: BTreeMap<K, f64> = nominal
        .iter()
        .map(|(k, w)| {
            let w = if available.contains(k) && w.is_finite() { w.max(0.0) } else { 0.0 };
            (*k, w)
        })
        .collect();

    let total: f64 = masked.values().sum();
    masked
        .into_iter()
        .map(|(k, w)| (k, if total > 0.0 { w / total } else { 0.0 }))
        .collect()
}

/// Per-factor weights for one instrument class, normalized to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSet<K: Ord> {
    weights: BTreeMap<K, f64>,
}

impl<K: Ord + Copy> WeightSet<K> {
    /// Build from hand-authored weights; they are renormalized so they need not sum to 1 exactly.
    pub fn from_nominal(entries: impl IntoIterator<Item = (K, f64)>) -> Self {
        let nominal: BTreeMap<K, f64> = entries.into_iter().collect();
        let every: BTreeSet<K> = nominal.keys().copied().collect();
        Self {
            weights: resolve(&nominal, &every),
        }
    }

    /// Effective weights when only `available` factors have a score.
    pub fn resolve(&self, available: &BTreeSet<K>) -> WeightSet<K> {
        WeightSet {
            weights: resolve(&self.weights, available),
        }
    }

    pub fn get(&self, factor: K) -> f64 {
        self.weights.get(&factor).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.weights.iter().map(|(k, w)| (*k, *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

pub fn stock_weights() -> WeightSet<StockFactor> {
    WeightSet::from_nominal([
        (StockFactor::PeVsSector, 0.125),
        (StockFactor::FinancialHealth, 0.125),
        (StockFactor::Valuation, 0.125),
        (StockFactor::Growth, 0.125),
        (StockFactor::Management, 0.125),
        (StockFactor::Moat, 0.125),
        (StockFactor::Risk, 0.125),
        (StockFactor::Dividend, 0.125),
    ])
}

pub fn etf_weights() -> WeightSet<EtfFactor> {
    WeightSet::from_nominal([
        (EtfFactor::Expense, 0.15),
        (EtfFactor::Liquidity, 0.10),
        (EtfFactor::HoldingsQuality, 0.20),
        (EtfFactor::SectorStrength, 0.15),
        (EtfFactor::ValuationVsBench, 0.10),
        (EtfFactor::Performance, 0.15),
        (EtfFactor::Volatility, 0.10),
        (EtfFactor::YieldStability, 0.05),
    ])
}

pub fn fund_weights() -> WeightSet<FundFactor> {
    WeightSet::from_nominal([
        (FundFactor::Expense, 0.10),
        (FundFactor::AumSize, 0.10),
        (FundFactor::ManagerTrack, 0.15),
        (FundFactor::CatRelPerf, 0.15),
        (FundFactor::RiskAdj, 0.15),
        (FundFactor::Consistency, 0.15),
        (FundFactor::Downside, 0.10),
        (FundFactor::PortfolioQuality, 0.10),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nominal_tables_sum_to_one() {
        assert_relative_eq!(stock_weights().total(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(etf_weights().total(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fund_weights().total(), 1.0, epsilon = 1e-12);
        assert_eq!(stock_weights().len(), 8);
    }

    #[test]
    fn test_from_nominal_renormalizes_loose_weights() {
        let w = WeightSet::from_nominal([(1u8, 2.0), (2u8, 1.0), (3u8, 1.0)]);
        assert_relative_eq!(w.get(1), 0.5);
        assert_relative_eq!(w.get(2), 0.25);
        assert_relative_eq!(w.total(), 1.0);
    }

    #[test]
    fn test_resolve_sums_to_one_for_every_non_empty_subset() {
        let weights = etf_weights();
        let factors: Vec<EtfFactor> = weights.iter().map(|(k, _)| k).collect();

        for mask in 1u32..(1 << factors.len()) {
            let available: BTreeSet<EtfFactor> = factors
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << *i) != 0)
                .map(|(_, f)| *f)
                .collect();
            let derived = weights.resolve(&available);

            let available_sum: f64 = available.iter().map(|f| derived.get(*f)).sum();
            assert_relative_eq!(available_sum, 1.0, epsilon = 1e-12);
            for (f, w) in derived.iter() {
                if !available.contains(&f) {
                    assert_eq!(w, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_resolve_empty_subset_is_all_zero() {
        let derived = stock_weights().resolve(&BTreeSet::new());
        assert_eq!(derived.len(), 8);
        assert!(derived.iter().all(|(_, w)| w == 0.0));
    }

    #[test]
    fn test_resolve_keeps_relative_proportions() {
        let available = BTreeSet::from([EtfFactor::HoldingsQuality, EtfFactor::YieldStability]);
        let derived = etf_weights().resolve(&available);
        // 0.20 : 0.05
        assert_relative_eq!(derived.get(EtfFactor::HoldingsQuality), 0.8, epsilon = 1e-12);
        assert_relative_eq!(derived.get(EtfFactor::YieldStability), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_resolve_seven_of_eight_stock_factors() {
        let mut available: BTreeSet<StockFactor> = StockFactor::ALL.into_iter().collect();
        available.remove(&StockFactor::Dividend);
        let derived = stock_weights().resolve(&available);
        assert_eq!(derived.get(StockFactor::Dividend), 0.0);
        assert_relative_eq!(derived.get(StockFactor::Risk), 1.0 / 7.0, epsilon = 1e-12);
    }
}
