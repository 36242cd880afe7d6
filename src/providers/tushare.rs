//! TuShare Pro provider.
//!
//! TuShare exposes a single JSON-RPC style endpoint: every call POSTs
//! `{api_name, token, params, fields}` and gets back `{code, msg, data}` where
//! `data` is a column-oriented table (`fields` plus row arrays). Closes come
//! from the `daily` API and turnover rates from `daily_basic`.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{compact_date, merge_turnover, num_or_none, DataProvider};
use crate::config;
use crate::error::{Result, SummaryError};
use crate::models::DailyRecord;
use crate::window::format_date;

const PROVIDER: &str = "TuShare";

#[derive(Debug, Serialize)]
struct TuShareRequest<'a> {
    api_name: &'a str,
    token: &'a str,
    params: TuShareParams<'a>,
    fields: &'a str,
}

#[derive(Debug, Serialize)]
struct TuShareParams<'a> {
    ts_code: &'a str,
    start_date: String,
    end_date: String,
}

/// Envelope returned by every TuShare API.
#[derive(Debug, Clone, Deserialize)]
pub struct TuShareResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<TuShareTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuShareTable {
    pub fields: Vec<String>,
    #[serde(default)]
    pub items: Option<Vec<Vec<Value>>>,
}

/// Unpack a response into one map per row, keyed by field name.
///
/// A non-zero `code` becomes [`SummaryError::Provider`]; a missing `data`
/// block is read as zero rows.
pub fn parse_table(resp: TuShareResponse) -> Result<Vec<HashMap<String, Value>>> {
    if resp.code != 0 {
        return Err(SummaryError::Provider {
            provider: PROVIDER.to_string(),
            code: resp.code,
            msg: resp.msg.unwrap_or_default(),
        });
    }
    let Some(table) = resp.data else {
        return Ok(Vec::new());
    };
    let rows = table.items.unwrap_or_default();
    Ok(rows
        .into_iter()
        .map(|row| {
            table
                .fields
                .iter()
                .cloned()
                .zip(row.into_iter().chain(std::iter::repeat(Value::Null)))
                .collect()
        })
        .collect())
}

fn row_date(row: &HashMap<String, Value>) -> Option<String> {
    row.get("trade_date")
        .and_then(|v| v.as_str())
        .and_then(compact_date)
}

/// Merge `daily` rows (closes) with `daily_basic` rows (turnover).
///
/// Rows without a parsable trade date are dropped.
pub fn records_from_rows(
    daily: &[HashMap<String, Value>],
    basic: &[HashMap<String, Value>],
) -> Vec<DailyRecord> {
    let turnover: HashMap<String, Option<f64>> = basic
        .iter()
        .filter_map(|row| {
            let date = row_date(row)?;
            Some((date, row.get("turnover_rate").and_then(num_or_none)))
        })
        .collect();

    let mut skipped = 0usize;
    let prices: Vec<(String, Option<f64>)> = daily
        .iter()
        .filter_map(|row| match row_date(row) {
            Some(date) => Some((date, row.get("close").and_then(num_or_none))),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        warn!(skipped, "TuShare rows without a trade date dropped");
    }

    merge_turnover(prices, &turnover)
}

// ---------------------------------------------------------------------------
// TuShareProvider
// ---------------------------------------------------------------------------

pub struct TuShareProvider {
    client: Client,
    token: String,
    endpoint: String,
}

impl TuShareProvider {
    /// Create a provider with the given API token.
    ///
    /// Fails with [`SummaryError::Config`] if the token is blank.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SummaryError::Config(format!(
                "{} is not set",
                config::TUSHARE_TOKEN_ENV
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token,
            endpoint: config::TUSHARE_URL.to_string(),
        })
    }

    /// Point the provider at a different endpoint (mirrors, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn call(
        &self,
        api_name: &str,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
        fields: &str,
    ) -> Result<Vec<HashMap<String, Value>>> {
        let body = TuShareRequest {
            api_name,
            token: &self.token,
            params: TuShareParams {
                ts_code,
                start_date: format_date(start),
                end_date: format_date(end),
            },
            fields,
        };
        info!(api_name, ts_code, "calling TuShare");

        let resp = self.client.post(&self.endpoint).json(&body).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SummaryError::UpstreamStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
            });
        }
        let parsed: TuShareResponse = resp.json().map_err(|e| {
            SummaryError::MalformedResponse(format!("TuShare {api_name} for {ts_code}: {e}"))
        })?;
        parse_table(parsed)
    }
}

impl DataProvider for TuShareProvider {
    fn name(&self) -> &str {
        "tushare"
    }

    fn fetch_daily(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>> {
        let daily = self.call("daily", ts_code, start, end, "trade_date,close")?;
        if daily.is_empty() {
            return Err(SummaryError::EmptyResult {
                ts_code: ts_code.to_string(),
            });
        }
        let basic = self.call("daily_basic", ts_code, start, end, "trade_date,turnover_rate")?;
        Ok(records_from_rows(&daily, &basic))
    }
}
