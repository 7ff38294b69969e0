//! Peer-group median tables.
//!
//! Equities are keyed by (market, sector), funds by (market, category). Every
//! market carries a `Default` bucket used when the key is not listed.

use rating_core::{Market, RatingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_BUCKET: &str = "Default";

/// Sector benchmark ratios for equities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorMedians {
    #[serde(rename = "PE")]
    pub pe: f64,
    #[serde(rename = "EVEBITDA")]
    pub ev_ebitda: f64,
    #[serde(rename = "PS")]
    pub ps: f64,
    #[serde(rename = "PFCF")]
    pub pfcf: f64,
}

/// Category benchmarks for funds (fractions, 0.05 = 5%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryMedians {
    #[serde(rename = "Expense")]
    pub expense: f64,
    #[serde(rename = "Return1Y")]
    pub return_1y: f64,
    #[serde(rename = "Return3Y")]
    pub return_3y: f64,
    #[serde(rename = "Volatility")]
    pub volatility: f64,
    #[serde(rename = "Yield")]
    pub yield_: f64,
}

/// On-disk layout: market names as plain string keys.
#[derive(Deserialize)]
struct TablesFile {
    #[serde(default)]
    sectors: BTreeMap<String, BTreeMap<String, SectorMedians>>,
    #[serde(default)]
    categories: BTreeMap<String, BTreeMap<String, CategoryMedians>>,
}

/// Read-only reference medians, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    sectors: BTreeMap<Market, BTreeMap<String, SectorMedians>>,
    categories: BTreeMap<Market, BTreeMap<String, CategoryMedians>>,
}

impl ReferenceTables {
    pub fn builtin() -> Self {
        let sector = |pe, ev_ebitda, ps, pfcf| SectorMedians { pe, ev_ebitda, ps, pfcf };
        let category = |expense, return_1y, return_3y, volatility, yield_| CategoryMedians {
            expense,
            return_1y,
            return_3y,
            volatility,
            yield_,
        };

        let mut sectors = BTreeMap::new();
        sectors.insert(
            Market::US,
            BTreeMap::from([
                ("Technology".to_string(), sector(28.0, 19.0, 6.0, 25.0)),
                (DEFAULT_BUCKET.to_string(), sector(18.0, 12.0, 2.0, 18.0)),
            ]),
        );
        sectors.insert(
            Market::India,
            BTreeMap::from([
                ("Technology".to_string(), sector(30.0, 20.0, 7.0, 28.0)),
                (DEFAULT_BUCKET.to_string(), sector(22.0, 14.0, 3.0, 22.0)),
            ]),
        );

        let mut categories = BTreeMap::new();
        categories.insert(
            Market::US,
            BTreeMap::from([
                ("US Large Cap Blend".to_string(), category(0.05, 0.22, 0.11, 0.18, 0.013)),
                (DEFAULT_BUCKET.to_string(), category(0.20, 0.14, 0.08, 0.22, 0.02)),
            ]),
        );
        categories.insert(
            Market::India,
            BTreeMap::from([
                ("India Equity Multi Cap".to_string(), category(0.011, 0.28, 0.15, 0.23, 0.008)),
                (DEFAULT_BUCKET.to_string(), category(0.015, 0.20, 0.11, 0.25, 0.01)),
            ]),
        );

        Self { sectors, categories }
    }

    /// Parse a JSON document of the form
    /// `{"sectors": {"US": {"Default": {"PE": 18, ...}}}, "categories": {...}}`.
    pub fn from_json_str(json: &str) -> Result<Self, RatingError> {
        let file: TablesFile = serde_json::from_str(json)
            .map_err(|e| RatingError::InvalidConfig(format!("reference tables: {}", e)))?;

        let sectors = keyed_by_market(file.sectors)?;
        let categories = keyed_by_market(file.categories)?;

        for (market, buckets) in &sectors {
            if !buckets.contains_key(DEFAULT_BUCKET) {
                return Err(RatingError::InvalidConfig(format!(
                    "reference tables: sectors for {} lack a '{}' bucket",
                    market, DEFAULT_BUCKET
                )));
            }
        }
        for (market, buckets) in &categories {
            if !buckets.contains_key(DEFAULT_BUCKET) {
                return Err(RatingError::InvalidConfig(format!(
                    "reference tables: categories for {} lack a '{}' bucket",
                    market, DEFAULT_BUCKET
                )));
            }
        }

        Ok(Self { sectors, categories })
    }

    pub fn from_path(path: &Path) -> Result<Self, RatingError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RatingError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let tables = Self::from_json_str(&json)?;
        tracing::info!(
            "Loaded reference tables from {} ({} sector markets, {} category markets)",
            path.display(),
            tables.sectors.len(),
            tables.categories.len()
        );
        Ok(tables)
    }

    /// Sector medians for `market`, falling back to the market's `Default` bucket.
    pub fn sector_medians(&self, market: Market, sector: &str) -> Result<&SectorMedians, RatingError> {
        lookup(&self.sectors, market, sector, "sector")
    }

    /// Category medians for `market`, falling back to the market's `Default` bucket.
    pub fn category_medians(&self, market: Market, category: &str) -> Result<&CategoryMedians, RatingError> {
        lookup(&self.categories, market, category, "category")
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn lookup<'a, T>(
    table: &'a BTreeMap<Market, BTreeMap<String, T>>,
    market: Market,
    key: &str,
    what: &str,
) -> Result<&'a T, RatingError> {
    let buckets = table
        .get(&market)
        .ok_or_else(|| RatingError::MissingReference(format!("no {} medians for market {}", what, market)))?;

    buckets
        .get(key)
        .or_else(|| buckets.get(DEFAULT_BUCKET))
        .ok_or_else(|| RatingError::MissingReference(format!("no '{}' {} bucket for {}", DEFAULT_BUCKET, what, market)))
}

fn keyed_by_market<T>(
    raw: BTreeMap<String, BTreeMap<String, T>>,
) -> Result<BTreeMap<Market, BTreeMap<String, T>>, RatingError> {
    raw.into_iter()
        .map(|(market, buckets)| {
            let market = market
                .parse::<Market>()
                .map_err(|e| RatingError::InvalidConfig(format!("reference tables: {}", e)))?;
            Ok::<_, RatingError>((market, buckets))
        })
        .collect()
}
