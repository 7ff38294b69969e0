use serde::{Deserialize, Serialize};

/// Factors of the stock model, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFactor {
    PeVsSector,
    FinancialHealth,
    Valuation,
    Growth,
    Management,
    Moat,
    Risk,
    Dividend,
}

impl StockFactor {
    pub const ALL: [StockFactor; 8] = [
        StockFactor::PeVsSector,
        StockFactor::FinancialHealth,
        StockFactor::Valuation,
        StockFactor::Growth,
        StockFactor::Management,
        StockFactor::Moat,
        StockFactor::Risk,
        StockFactor::Dividend,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StockFactor::PeVsSector => "pe_vs_sector",
            StockFactor::FinancialHealth => "financial_health",
            StockFactor::Valuation => "valuation",
            StockFactor::Growth => "growth",
            StockFactor::Management => "management",
            StockFactor::Moat => "moat",
            StockFactor::Risk => "risk",
            StockFactor::Dividend => "dividend",
        }
    }
}

/// ETF factors. Weights exist; no scoring model does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtfFactor {
    Expense,
    Liquidity,
    HoldingsQuality,
    SectorStrength,
    ValuationVsBench,
    Performance,
    Volatility,
    YieldStability,
}

impl EtfFactor {
    pub fn key(&self) -> &'static str {
        match self {
            EtfFactor::Expense => "expense",
            EtfFactor::Liquidity => "liquidity",
            EtfFactor::HoldingsQuality => "holdings_quality",
            EtfFactor::SectorStrength => "sector_strength",
            EtfFactor::ValuationVsBench => "valuation_vs_bench",
            EtfFactor::Performance => "performance",
            EtfFactor::Volatility => "volatility",
            EtfFactor::YieldStability => "yield_stability",
        }
    }
}

/// Mutual fund factors. Weights exist; no scoring model does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundFactor {
    Expense,
    AumSize,
    ManagerTrack,
    CatRelPerf,
    RiskAdj,
    Consistency,
    Downside,
    PortfolioQuality,
}

impl FundFactor {
    pub fn key(&self) -> &'static str {
        match self {
            FundFactor::Expense => "expense",
            FundFactor::AumSize => "aum_size",
            FundFactor::ManagerTrack => "manager_track",
            FundFactor::CatRelPerf => "cat_rel_perf",
            FundFactor::RiskAdj => "risk_adj",
            FundFactor::Consistency => "consistency",
            FundFactor::Downside => "downside",
            FundFactor::PortfolioQuality => "portfolio_quality",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_serde_names() {
        for f in StockFactor::ALL {
            assert_eq!(serde_json::to_value(f).unwrap(), serde_json::json!(f.key()));
        }
        assert_eq!(serde_json::to_value(EtfFactor::ValuationVsBench).unwrap(), "valuation_vs_bench");
        assert_eq!(serde_json::to_value(FundFactor::CatRelPerf).unwrap(), "cat_rel_perf");
        assert_eq!(FundFactor::AumSize.key(), "aum_size");
    }
}
