//! Async wrapper around [`StockSummarySdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP client waits on the provider.
//!
//! # Example
//!
//! ```no_run
//! use ashare_summary::{AsyncStockSummarySdk, StockRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncStockSummarySdk::builder().build().await.unwrap();
//!     let report = sdk.query(StockRequest::last_n("000001", 20)).await.unwrap();
//!     println!("{} records", report.items.len());
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SummaryError};
use crate::models::{StockReport, StockRequest};
use crate::{DataProvider, StockSummarySdk, StockSummarySdkBuilder, WindowPolicy};

// ---------------------------------------------------------------------------
// AsyncStockSummarySdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncStockSummarySdk`].
///
/// Wraps a [`StockSummarySdkBuilder`]; the build itself runs on the blocking
/// pool.
pub struct AsyncStockSummarySdkBuilder {
    inner: StockSummarySdkBuilder,
}

impl Default for AsyncStockSummarySdkBuilder {
    fn default() -> Self {
        Self {
            inner: StockSummarySdkBuilder::default(),
        }
    }
}

impl AsyncStockSummarySdkBuilder {
    /// Start from the environment: TuShare if `TUSHARE_TOKEN` is set.
    pub fn from_env() -> Self {
        Self {
            inner: StockSummarySdkBuilder::from_env(),
        }
    }

    pub fn eastmoney(mut self) -> Self {
        self.inner = self.inner.eastmoney();
        self
    }

    pub fn tushare(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.tushare(token);
        self
    }

    pub fn provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.inner = self.inner.provider(provider);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.inner = self.inner.cache(enabled);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.inner = self.inner.cache_ttl(ttl);
        self
    }

    pub fn empty_cache_ttl(mut self, ttl: Duration) -> Self {
        self.inner = self.inner.empty_cache_ttl(ttl);
        self
    }

    pub fn policy(mut self, policy: WindowPolicy) -> Self {
        self.inner = self.inner.policy(policy);
        self
    }

    /// Build the async SDK.
    ///
    /// Construction of the blocking HTTP client runs on the blocking thread
    /// pool so it won't stall the async event loop.
    pub async fn build(self) -> Result<AsyncStockSummarySdk> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let sdk = inner.build()?;
            Ok(AsyncStockSummarySdk {
                inner: Arc::new(sdk),
            })
        })
        .await
        .map_err(|e| SummaryError::Config(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncStockSummarySdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`StockSummarySdk`].
///
/// The SDK holds no per-request mutable state (its cache is internally
/// locked), so it is shared through an [`Arc`] without an outer mutex.
#[derive(Clone)]
pub struct AsyncStockSummarySdk {
    inner: Arc<StockSummarySdk>,
}

impl AsyncStockSummarySdk {
    pub fn builder() -> AsyncStockSummarySdkBuilder {
        AsyncStockSummarySdkBuilder::default()
    }

    /// Wrap an already-built SDK.
    pub fn from_sdk(sdk: StockSummarySdk) -> Self {
        Self {
            inner: Arc::new(sdk),
        }
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&StockSummarySdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&sdk))
            .await
            .map_err(|e| SummaryError::Config(format!("Task join error: {e}")))?
    }

    /// Async [`StockSummarySdk::query`].
    pub async fn query(&self, request: StockRequest) -> Result<Arc<StockReport>> {
        self.run(move |s| s.query(&request)).await
    }

    pub fn inner(&self) -> &StockSummarySdk {
        &self.inner
    }
}
