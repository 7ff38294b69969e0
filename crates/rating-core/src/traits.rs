use async_trait::async_trait;
use crate::{Instrument, RatingError, RawMetrics};

/// Source of raw market metrics for an instrument.
///
/// Implementations own exchange suffixing and any fallback between exchanges;
/// callers receive a single bundle per instrument.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch(&self, instrument: &Instrument) -> Result<RawMetrics, RatingError>;
}
