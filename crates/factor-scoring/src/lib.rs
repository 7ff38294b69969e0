//! Factor scoring for single securities.
//!
//! Raw metrics are turned into bounded 0-10 sub-scores against peer-group
//! medians, weighted over whichever factors have data, and mapped to a
//! Buy/Hold/Sell-Avoid recommendation.

pub mod engine;
pub mod factors;
pub mod normalizer;
pub mod recommendation;
pub mod reference;
pub mod weights;

pub use engine::{FactorBreakdown, StockScore, StockScoringEngine};
pub use factors::{EtfFactor, FundFactor, StockFactor};
pub use normalizer::FactorScore;
pub use recommendation::{classify, recommend};
pub use reference::{CategoryMedians, ReferenceTables, SectorMedians, DEFAULT_BUCKET};
pub use weights::{resolve, WeightSet};
