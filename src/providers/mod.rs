//! Market-data providers.
//!
//! The [`DataProvider`] trait abstracts over upstream sources so the SDK can
//! swap TuShare for Eastmoney, and tests can substitute a canned provider.
//! Providers know nothing about caching or aggregation; they return raw,
//! possibly unsorted daily records.

pub mod eastmoney;
pub mod tushare;

pub use eastmoney::EastmoneyProvider;
pub use tushare::TuShareProvider;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::models::DailyRecord;

/// A source of daily close/turnover records.
pub trait DataProvider: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetch daily records for `ts_code` between `start` and `end` inclusive.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::Http`](crate::SummaryError::Http) /
    ///   [`SummaryError::UpstreamStatus`](crate::SummaryError::UpstreamStatus)
    ///   on transport failure.
    /// - [`SummaryError::Provider`](crate::SummaryError::Provider) when the
    ///   provider reports an application-level error.
    /// - [`SummaryError::EmptyResult`](crate::SummaryError::EmptyResult) when
    ///   the provider has no rows for the range.
    fn fetch_daily(&self, ts_code: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<DailyRecord>>;

    /// Display name of the security, where the provider offers one.
    fn fetch_name(&self, _ts_code: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Join a close series with a turnover series on trade date.
///
/// Every price row is kept; dates missing from `turnover` get no turnover.
pub fn merge_turnover(
    prices: Vec<(String, Option<f64>)>,
    turnover: &HashMap<String, Option<f64>>,
) -> Vec<DailyRecord> {
    prices
        .into_iter()
        .map(|(date, close)| {
            let tor = turnover.get(&date).copied().flatten();
            DailyRecord::new(date, close, tor)
        })
        .collect()
}

/// Read a JSON number or numeric string as a finite `f64`.
pub fn num_or_none(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// `2024-01-02` or `20240102` -> `20240102`; `None` if not a date.
pub fn compact_date(s: &str) -> Option<String> {
    let d: String = s.trim().chars().filter(|c| *c != '-').collect();
    (d.len() == 8 && d.bytes().all(|b| b.is_ascii_digit())).then_some(d)
}
