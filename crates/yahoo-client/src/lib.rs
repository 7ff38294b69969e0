use async_trait::async_trait;
use rating_core::{Instrument, Market, MetricsProvider, RatingConfig, RatingError, RawMetrics};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Trading days in a year of daily closes
const TRADING_DAYS_PER_YEAR: usize = 252;

const MAX_ATTEMPTS: u32 = 3;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) rating-bot/0.1";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request leaves the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Price history pulled from the chart endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub regular_market_price: Option<f64>,
    /// Daily closes, oldest first, null bars dropped
    pub closes: Vec<f64>,
}

impl ChartData {
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

/// Ratios and classification pulled from the quoteSummary endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    pub current_price: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub beta: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl YahooClient {
    pub fn new(config: &RatingConfig) -> Self {
        Self::with_base_url(
            &config.yahoo_base_url,
            config.yahoo_rate_limit,
            Duration::from_secs(config.yahoo_timeout_secs),
        )
    }

    pub fn with_base_url(base_url: &str, rate_limit: usize, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
            retry_wait: Duration::from_secs(15),
        }
    }

    /// Pause between retries after an HTTP 429
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, RatingError> {
        let request = builder.build().map_err(|e| RatingError::ApiError(e.to_string()))?;
        tracing::debug!("{} {}", request.method(), request.url());

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| RatingError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| RatingError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            tracing::warn!(
                "Yahoo 429 rate limited, waiting {:.1}s before retry {}/{}",
                self.retry_wait.as_secs_f64(),
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_wait).await;
        }

        Err(RatingError::ApiError(format!(
            "Rate limited by Yahoo after {} retries",
            MAX_ATTEMPTS
        )))
    }

    /// Three years of daily closes. A 404 means the ticker is unknown and yields empty data.
    pub async fn get_chart(&self, ticker: &str) -> Result<ChartData, RatingError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = self
            .send_request(self.client.get(&url).query(&[("range", "3y"), ("interval", "1d")]))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Yahoo chart: {} not found", ticker);
            return Ok(ChartData::default());
        }
        if !status.is_success() {
            return Err(RatingError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| RatingError::ApiError(e.to_string()))?;

        let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(ChartData::default());
        };

        let closes = result
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .map(|q| q.close.into_iter().flatten().filter(|c| c.is_finite()).collect())
            .unwrap_or_default();

        Ok(ChartData {
            regular_market_price: result.meta.regular_market_price,
            closes,
        })
    }

    /// Valuation ratios, beta, yield and sector. `None` when Yahoo refuses or
    /// does not know the ticker; callers fall back to chart-only data.
    pub async fn get_quote_summary(&self, ticker: &str) -> Result<Option<QuoteSummary>, RatingError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);

        let response = self
            .send_request(self.client.get(&url).query(&[(
                "modules",
                "summaryDetail,defaultKeyStatistics,assetProfile,financialData",
            )]))
            .await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            tracing::warn!("Yahoo quoteSummary not available for {} (HTTP {}), using price data only", ticker, status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RatingError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| RatingError::ApiError(e.to_string()))?;

        let Some(r) = body.quote_summary.result.and_then(|r| r.into_iter().next()) else {
            return Ok(None);
        };

        let detail = r.summary_detail.unwrap_or_default();
        let stats = r.default_key_statistics.unwrap_or_default();
        let profile = r.asset_profile.unwrap_or_default();
        let financial = r.financial_data.unwrap_or_default();

        Ok(Some(QuoteSummary {
            current_price: raw(&financial.current_price),
            sector: profile.sector,
            industry: profile.industry,
            beta: raw(&detail.beta),
            trailing_pe: raw(&detail.trailing_pe),
            price_to_book: raw(&stats.price_to_book),
            price_to_sales: raw(&detail.price_to_sales_trailing_12_months),
            peg_ratio: raw(&stats.peg_ratio),
            dividend_yield: raw(&detail.dividend_yield),
        }))
    }

    /// Fetch and merge both endpoints for one exchange-qualified ticker.
    pub async fn fetch_ticker(&self, ticker: &str) -> Result<RawMetrics, RatingError> {
        let (chart, summary) = tokio::join!(self.get_chart(ticker), self.get_quote_summary(ticker));
        let chart = chart?;
        let summary = summary?.unwrap_or_default();
        Ok(merge_metrics(&chart, summary))
    }
}

#[async_trait]
impl MetricsProvider for YahooClient {
    /// US codes are requested as-is. Indian codes go to NSE (`.NS`) first and
    /// fall back to BSE (`.BO`) when NSE has no price.
    async fn fetch(&self, instrument: &Instrument) -> Result<RawMetrics, RatingError> {
        match instrument.market {
            Market::US => self.fetch_ticker(&instrument.code).await,
            Market::India => {
                let symbol = instrument.exchange_symbol();
                let nse = format!("{}.NS", symbol);
                match self.fetch_ticker(&nse).await {
                    Ok(metrics) if metrics.has_price() => return Ok(metrics),
                    Ok(_) => tracing::warn!("No NSE price for {}, trying BSE", symbol),
                    Err(e) => tracing::warn!("NSE lookup for {} failed ({}), trying BSE", symbol, e),
                }
                self.fetch_ticker(&format!("{}.BO", symbol)).await
            }
        }
    }
}

/// Build a metric bundle from chart history and (possibly empty) summary data.
pub fn merge_metrics(chart: &ChartData, summary: QuoteSummary) -> RawMetrics {
    let (r_1y, r_3y) = trailing_returns(&chart.closes);
    RawMetrics {
        price: summary
            .current_price
            .or(chart.regular_market_price)
            .or_else(|| chart.last_close()),
        sector: summary.sector,
        industry: summary.industry,
        beta: summary.beta,
        pe: summary.trailing_pe,
        pb: summary.price_to_book,
        ps: summary.price_to_sales,
        // PEG stands in for price/free-cash-flow
        pfcf: summary.peg_ratio,
        div_yield: summary.dividend_yield,
        r_1y,
        r_3y,
    }
    .sanitized()
}

/// (1-year, full-window) returns from daily closes, oldest first.
pub fn trailing_returns(closes: &[f64]) -> (Option<f64>, Option<f64>) {
    let n = closes.len();
    let ratio = |from: f64, to: f64| if from != 0.0 { Some(to / from - 1.0) } else { None };

    let r_1y = if n > TRADING_DAYS_PER_YEAR {
        ratio(closes[n - TRADING_DAYS_PER_YEAR], closes[n - 1])
    } else {
        None
    };
    let r_3y = if n > 0 { ratio(closes[0], closes[n - 1]) } else { None };
    (r_1y, r_3y)
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|v| v.raw)
}

// Chart response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// quoteSummary response structures
#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
}

/// Yahoo wraps numbers as `{"raw": 1.2, "fmt": "1.20"}`, or `{}` when absent
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default)]
    beta: Option<RawValue>,
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(default, rename = "priceToSalesTrailing12Months")]
    price_to_sales_trailing_12_months: Option<RawValue>,
    #[serde(default)]
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default)]
    price_to_book: Option<RawValue>,
    #[serde(default)]
    peg_ratio: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    current_price: Option<RawValue>,
}
