//! A-share daily summary SDK for Rust.
//!
//! Fetches daily closes and turnover rates for a ticker from TuShare or
//! Eastmoney, selects a date window (explicit range or last N trading days),
//! and reduces it to a [`Summary`]: extremes with their dates, mean, position
//! in range, drawdown/rise ratios and an optional comparison against a
//! purchase price. Finished reports are cached in memory for a few minutes.
//!
//! # Quick start
//!
//! ```no_run
//! use ashare_summary::{StockRequest, StockSummarySdk};
//!
//! let sdk = StockSummarySdk::builder().eastmoney().build().unwrap();
//!
//! let report = sdk.query(&StockRequest::last_n("600519", 60)).unwrap();
//! if let Some(summary) = &report.summary {
//!     println!("{} high {} ({})", summary.ts_code, summary.high, summary.high_dates.short());
//! }
//! ```

pub mod aggregate;
pub mod api;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod providers;
pub mod ticker;
pub mod window;

#[cfg(feature = "async")]
pub use async_client::AsyncStockSummarySdk;
pub use cache::{CacheKey, ResponseCache};
pub use error::{Result, SummaryError};
pub use models::{
    BuyComparison, BuyReference, DailyRecord, ExtremeDates, RecordWindow, StockReport,
    StockRequest, Summary,
};
pub use providers::{DataProvider, EastmoneyProvider, TuShareProvider};
pub use window::{WindowMode, WindowPolicy, WindowSelector};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use window::{format_date, ResolvedWindow};

// ---------------------------------------------------------------------------
// StockSummarySdkBuilder
// ---------------------------------------------------------------------------

enum ProviderChoice {
    Eastmoney,
    TuShare(String),
    Custom(Box<dyn DataProvider>),
}

/// Builder for configuring and constructing a [`StockSummarySdk`].
///
/// Use [`StockSummarySdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](StockSummarySdkBuilder::build).
pub struct StockSummarySdkBuilder {
    provider: ProviderChoice,
    timeout: Duration,
    cache_enabled: bool,
    cache_ttl: Duration,
    empty_cache_ttl: Duration,
    policy: WindowPolicy,
}

impl Default for StockSummarySdkBuilder {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Eastmoney,
            timeout: config::DEFAULT_TIMEOUT,
            cache_enabled: true,
            cache_ttl: config::RESULT_CACHE_TTL,
            empty_cache_ttl: config::EMPTY_CACHE_TTL,
            policy: WindowPolicy::default(),
        }
    }
}

impl StockSummarySdkBuilder {
    /// Use TuShare when `TUSHARE_TOKEN` is set and non-empty, Eastmoney otherwise.
    pub fn from_env() -> Self {
        let builder = Self::default();
        match std::env::var(config::TUSHARE_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => builder.tushare(token),
            _ => builder.eastmoney(),
        }
    }

    /// Fetch from Eastmoney (no token needed). This is the default.
    pub fn eastmoney(mut self) -> Self {
        self.provider = ProviderChoice::Eastmoney;
        self
    }

    /// Fetch from TuShare Pro with the given token.
    pub fn tushare(mut self, token: impl Into<String>) -> Self {
        self.provider = ProviderChoice::TuShare(token.into());
        self
    }

    /// Fetch from a caller-supplied provider.
    pub fn provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.provider = ProviderChoice::Custom(provider);
        self
    }

    /// Set the HTTP request timeout for upstream calls.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the response cache. Defaults to enabled.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Lifetime of cached reports with data. Defaults to 15 minutes.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Lifetime of cached "no data" reports. Defaults to 5 minutes.
    pub fn empty_cache_ttl(mut self, ttl: Duration) -> Self {
        self.empty_cache_ttl = ttl;
        self
    }

    pub fn policy(mut self, policy: WindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the SDK.
    ///
    /// Fails with [`SummaryError::Config`] when TuShare is selected without a
    /// token, or [`SummaryError::Http`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<StockSummarySdk> {
        let provider: Box<dyn DataProvider> = match self.provider {
            ProviderChoice::Eastmoney => Box::new(EastmoneyProvider::new(self.timeout)?),
            ProviderChoice::TuShare(token) => Box::new(TuShareProvider::new(token, self.timeout)?),
            ProviderChoice::Custom(p) => p,
        };
        let cache = self
            .cache_enabled
            .then(|| ResponseCache::new(self.cache_ttl, self.empty_cache_ttl));
        Ok(StockSummarySdk {
            provider,
            cache,
            policy: self.policy,
        })
    }
}

// ---------------------------------------------------------------------------
// StockSummarySdk
// ---------------------------------------------------------------------------

/// The main entry point: fetch, select, summarize, cache.
///
/// Created via [`StockSummarySdk::builder()`]. Holds no per-request state, so
/// one instance can serve concurrent requests.
pub struct StockSummarySdk {
    provider: Box<dyn DataProvider>,
    cache: Option<ResponseCache>,
    policy: WindowPolicy,
}

impl StockSummarySdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> StockSummarySdkBuilder {
        StockSummarySdkBuilder::default()
    }

    /// Run a request against today's local date.
    pub fn query(&self, request: &StockRequest) -> Result<Arc<StockReport>> {
        self.query_as_of(request, chrono::Local::now().date_naive())
    }

    /// Run a request with `today` as the reference date for default windows.
    ///
    /// # Errors
    ///
    /// - Parameter errors ([`SummaryError::MissingParameters`],
    ///   [`SummaryError::InvalidArgument`]) before any upstream call.
    /// - Upstream errors from the provider, passed through unchanged.
    /// - [`SummaryError::InsufficientData`] when a last-N request finds fewer
    ///   than N valid closes.
    ///
    /// An empty provider result is not an error: it yields a report with no
    /// items and no summary.
    pub fn query_as_of(&self, request: &StockRequest, today: NaiveDate) -> Result<Arc<StockReport>> {
        let ts_code = ticker::normalize(&request.code)?;
        let resolved = self.policy.resolve(&request.window, today);
        let key = CacheKey::new(&ts_code, request.window.mode(), &resolved, request.buy.as_ref());

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(hit);
        }
        debug!(ts_code = %ts_code, "cache miss");

        let report = Arc::new(self.build_report(&ts_code, request, &resolved)?);
        if let Some(cache) = &self.cache {
            cache.insert(key, report.clone());
        }
        Ok(report)
    }

    fn build_report(
        &self,
        ts_code: &str,
        request: &StockRequest,
        resolved: &ResolvedWindow,
    ) -> Result<StockReport> {
        let mut report = StockReport {
            ts_code: ts_code.to_string(),
            name_cn: None,
            mode: request.window.mode(),
            start: format_date(resolved.start),
            end: format_date(resolved.end),
            n: None,
            items: Vec::new(),
            summary: None,
        };

        info!(
            provider = self.provider.name(),
            ts_code,
            start = %report.start,
            end = %report.end,
            "fetching daily records"
        );
        let raw = match self.provider.fetch_daily(ts_code, resolved.start, resolved.end) {
            Ok(raw) => raw,
            Err(SummaryError::EmptyResult { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        if raw.is_empty() {
            info!(ts_code, "provider returned no data");
            return Ok(report);
        }

        let window = RecordWindow::new(raw).and_then(RecordWindow::price_valid);
        let window = match (window, resolved.expected_count) {
            (Some(w), Some(n)) => w.last_n(n)?,
            (Some(w), None) => w,
            (None, Some(n)) => {
                return Err(SummaryError::InsufficientData {
                    available: 0,
                    requested: n,
                })
            }
            (None, None) => {
                info!(ts_code, "no record with a valid close");
                return Ok(report);
            }
        };

        report.name_cn = match self.provider.fetch_name(ts_code) {
            Ok(name) => name,
            Err(e) => {
                warn!(ts_code, error = %e, "name lookup failed");
                None
            }
        };
        report.summary = Some(aggregate::summarize(ts_code, &window, request.buy.as_ref())?);
        report.n = resolved.expected_count.map(|_| window.len());
        report.items = window.into_records();
        Ok(report)
    }

    /// Name of the configured provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The response cache, if enabled.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn policy(&self) -> &WindowPolicy {
        &self.policy
    }
}

impl fmt::Debug for StockSummarySdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StockSummarySdk")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for StockSummarySdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StockSummarySdk(provider={}, cache={}, lookback_days={})",
            self.provider.name(),
            self.cache
                .as_ref()
                .map(|c| format!("{} entries", c.len()))
                .unwrap_or_else(|| "off".to_string()),
            self.policy.n_mode_lookback_days
        )
    }
}
