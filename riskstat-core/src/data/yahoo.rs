//! Yahoo Finance price provider.
//!
//! Pulls the full adjusted-close history from the v8 chart endpoint with
//! `range=max`. Transient failures (timeouts, 429, 5xx) are retried with
//! exponential backoff inside one deadline per fetch. 429 and 5xx count
//! toward the shared circuit breaker; a 403 opens it at once and stops the
//! provider for the rest of the cooldown.
//!
//! The endpoint is unofficial and changes shape without notice. The CSV
//! directory provider is the fallback when it is unavailable.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{finish_series, validate_symbol, DataSource, FetchError, PriceSeriesProvider};
use crate::domain::{Interval, PricePoint, PriceSeries};
use chrono::DateTime;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) riskstat/0.1";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// ── Chart API payload ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartFault>,
}

#[derive(Debug, Deserialize)]
struct ChartFault {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    #[serde(default)]
    meta: Option<ExchangeMeta>,
    #[serde(rename = "timestamp")]
    timestamps: Option<Vec<i64>>,
    indicators: Columns,
}

#[derive(Debug, Deserialize)]
struct ExchangeMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Columns {
    #[serde(default, rename = "quote")]
    quotes: Vec<CloseColumn>,
    #[serde(rename = "adjclose")]
    adjusted: Option<Vec<AdjustedColumn>>,
}

#[derive(Debug, Deserialize)]
struct CloseColumn {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjustedColumn {
    adjclose: Vec<Option<f64>>,
}

/// Outcome of a single HTTP round trip.
enum Attempt {
    Done(PriceSeries),
    Retry(FetchError),
    GiveUp(FetchError),
}

pub struct YahooProvider {
    http: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    timeout: Duration,
    max_retries: u32,
    first_backoff: Duration,
}

impl YahooProvider {
    /// Each `fetch` (retries and backoff included) is bounded by `timeout`.
    pub fn new(breaker: Arc<CircuitBreaker>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            breaker,
            timeout,
            max_retries: 3,
            first_backoff: Duration::from_millis(500),
        })
    }

    /// The symbol is percent-encoded as a single path segment.
    fn chart_url(symbol: &str, interval: Interval) -> Result<Url, FetchError> {
        let mut url = Url::parse(BASE_URL)
            .map_err(|e| FetchError::Other(format!("bad chart endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| FetchError::Other("chart endpoint cannot take a path".into()))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", "max")
            .append_pair("interval", &interval.to_string())
            .append_pair("includeAdjustedClose", "true")
            .append_pair("events", "div,split");
        Ok(url)
    }

    /// Backoff before retry number `retry` (1-based): 1x, 2x, 4x ...
    fn backoff(&self, retry: u32) -> Duration {
        self.first_backoff * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// Sleep before retry `retry`, or `None` if sleeping would run past the
    /// fetch deadline given `elapsed` time already spent.
    fn delay_before(&self, retry: u32, elapsed: Duration) -> Option<Duration> {
        let delay = self.backoff(retry);
        (elapsed + delay < self.timeout).then_some(delay)
    }

    fn timed_out(&self) -> FetchError {
        FetchError::Timeout {
            secs: self.timeout.as_secs(),
        }
    }

    /// Decode a chart payload into a price series.
    ///
    /// Prefers `adjclose`; falls back to the raw close when Yahoo omits it.
    fn decode(symbol: &str, envelope: Envelope) -> Result<PriceSeries, FetchError> {
        let not_found = || FetchError::SymbolNotFound {
            symbol: symbol.to_string(),
        };

        let Chart { result, error } = envelope.chart;
        let series = match (result, error) {
            (Some(list), _) => list
                .into_iter()
                .next()
                .ok_or_else(|| FetchError::ResponseFormatChanged("result array is empty".into()))?,
            (None, Some(fault)) if fault.code == "Not Found" => return Err(not_found()),
            (None, Some(fault)) => {
                return Err(FetchError::ResponseFormatChanged(format!(
                    "{}: {}",
                    fault.code, fault.description
                )))
            }
            (None, None) => {
                return Err(FetchError::ResponseFormatChanged("empty result with no error".into()))
            }
        };

        // Valid-looking but unknown symbols come back without timestamps.
        let timestamps = series.timestamps.ok_or_else(not_found)?;
        // Bars are stamped at the session open; date them on the exchange clock.
        let offset = series.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let Columns { quotes, adjusted } = series.indicators;
        let prices = match adjusted.and_then(|cols| cols.into_iter().next()) {
            Some(col) => col.adjclose,
            None => quotes
                .into_iter()
                .next()
                .map(|q| q.close)
                .ok_or_else(|| FetchError::ResponseFormatChanged("no price column".into()))?,
        };

        let rows = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| {
                let date = DateTime::from_timestamp(ts.saturating_add(offset), 0)
                    .map(|dt| dt.date_naive())
                    .ok_or_else(|| FetchError::ResponseFormatChanged(format!("bad timestamp {ts}")))?;
                // Nulls mark holidays and halted sessions.
                let value = prices.get(i).copied().flatten().unwrap_or(f64::NAN);
                Ok(PricePoint::new(date, value))
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        finish_series(symbol, rows)
    }

    fn retry_after(headers: &HeaderMap) -> u64 {
        headers
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
    }

    /// One request, bounded by whatever is left of the fetch deadline.
    ///
    /// Timeouts are retried but not reported to the breaker: one slow symbol
    /// must not shut the provider down for every other ticker.
    fn attempt(&self, url: &Url, symbol: &str, budget: Duration) -> Attempt {
        let resp = match self.http.get(url.as_str()).timeout(budget).send() {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => return Attempt::Retry(self.timed_out()),
            Err(e) if e.is_connect() => return Attempt::Retry(FetchError::NetworkUnreachable(e.to_string())),
            Err(e) => return Attempt::GiveUp(FetchError::NetworkUnreachable(e.to_string())),
        };

        match resp.status() {
            StatusCode::FORBIDDEN => {
                self.breaker.open_now();
                Attempt::GiveUp(FetchError::CircuitBreakerTripped)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.breaker.note_failure();
                Attempt::Retry(FetchError::RateLimited {
                    retry_after_secs: Self::retry_after(resp.headers()),
                })
            }
            StatusCode::UNAUTHORIZED => Attempt::GiveUp(FetchError::AuthenticationRequired(
                "Yahoo Finance rejected the request without a session".into(),
            )),
            StatusCode::NOT_FOUND => Attempt::GiveUp(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            status if !status.is_success() => {
                self.breaker.note_failure();
                Attempt::Retry(FetchError::Other(format!("HTTP {status} for {symbol}")))
            }
            _ => match resp.json::<Envelope>() {
                Ok(envelope) => match Self::decode(symbol, envelope) {
                    Ok(series) => Attempt::Done(series),
                    Err(e) => Attempt::GiveUp(e),
                },
                Err(e) => Attempt::GiveUp(FetchError::ResponseFormatChanged(format!(
                    "undecodable chart payload for {symbol}: {e}"
                ))),
            },
        }
    }

    fn fetch_with_retry(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError> {
        let url = Self::chart_url(symbol, interval)?;
        let started = Instant::now();
        let mut last_error = FetchError::Other(format!("no attempt made for {symbol}"));

        for retry in 0..=self.max_retries {
            if retry > 0 {
                let Some(delay) = self.delay_before(retry, started.elapsed()) else {
                    tracing::debug!(symbol, error = %last_error, "fetch deadline reached");
                    return Err(self.timed_out());
                };
                tracing::debug!(symbol, retry, delay_ms = delay.as_millis() as u64, "backing off");
                std::thread::sleep(delay);
            }
            if !self.breaker.allows_request() {
                tracing::debug!(
                    symbol,
                    cooldown_secs = self.breaker.cooldown_left().as_secs(),
                    "circuit breaker open, skipping request"
                );
                return Err(FetchError::CircuitBreakerTripped);
            }

            let budget = self.timeout.saturating_sub(started.elapsed());
            if budget.is_zero() {
                return Err(self.timed_out());
            }
            match self.attempt(&url, symbol, budget) {
                Attempt::Done(series) => {
                    self.breaker.note_success();
                    return Ok(series);
                }
                Attempt::Retry(e) => {
                    tracing::debug!(symbol, error = %e, "transient fetch failure");
                    last_error = e;
                }
                Attempt::GiveUp(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}

impl PriceSeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError> {
        let symbol = validate_symbol(symbol)?;
        self.fetch_with_retry(symbol, interval)
    }
}
