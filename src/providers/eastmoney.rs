//! Eastmoney provider.
//!
//! Uses the public daily-kline endpoint, which returns each trading day as a
//! comma-separated string `"YYYY-MM-DD,open,close,high,low,volume,amount,turnover"`
//! (fields `f51..f57,f61`). No token is required. A second endpoint supplies the
//! Chinese display name of the security (field `f14`).

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{compact_date, DataProvider};
use crate::config;
use crate::error::{Result, SummaryError};
use crate::models::DailyRecord;
use crate::ticker;
use crate::window::format_date;

const PROVIDER: &str = "Eastmoney";

const CLOSE_FIELD: usize = 2;
const TURNOVER_FIELD: usize = 7;

#[derive(Debug, Clone, Deserialize)]
pub struct KlineResponse {
    #[serde(default)]
    pub rc: Option<i64>,
    #[serde(default)]
    pub data: Option<KlineData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KlineData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub klines: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub data: Option<QuoteData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteData {
    #[serde(default)]
    pub f14: Option<Value>,
}

fn field(parts: &[&str], idx: usize) -> Option<f64> {
    parts
        .get(idx)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse kline strings into records. Lines without a date are dropped;
/// unparsable numbers become absent values.
pub fn parse_klines<S: AsRef<str>>(lines: &[S]) -> Vec<DailyRecord> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let line: &str = line.as_ref();
        let parts: Vec<&str> = line.split(',').collect();
        let Some(date) = parts.first().and_then(|d| compact_date(d)) else {
            warn!(line, "kline without a trade date dropped");
            continue;
        };
        out.push(DailyRecord::new(
            date,
            field(&parts, CLOSE_FIELD),
            field(&parts, TURNOVER_FIELD),
        ));
    }
    out
}

/// Extract records from a kline response.
///
/// A non-zero `rc` is a provider error; no klines is [`SummaryError::EmptyResult`].
pub fn parse_kline_response(ts_code: &str, resp: KlineResponse) -> Result<Vec<DailyRecord>> {
    if let Some(rc) = resp.rc.filter(|rc| *rc != 0) {
        return Err(SummaryError::Provider {
            provider: PROVIDER.to_string(),
            code: rc,
            msg: format!("kline request for {ts_code} rejected"),
        });
    }
    let lines = resp.data.and_then(|d| d.klines).unwrap_or_default();
    let records = parse_klines(&lines);
    if records.is_empty() {
        return Err(SummaryError::EmptyResult {
            ts_code: ts_code.to_string(),
        });
    }
    Ok(records)
}

/// Extract a trimmed, non-empty display name.
pub fn parse_name(resp: QuoteResponse) -> Option<String> {
    resp.data
        .and_then(|d| d.f14)
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// EastmoneyProvider
// ---------------------------------------------------------------------------

pub struct EastmoneyProvider {
    client: Client,
    kline_url: String,
    quote_url: String,
}

impl EastmoneyProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(config::EASTMONEY_REFERER));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config::USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            kline_url: config::EASTMONEY_KLINE_URL.to_string(),
            quote_url: config::EASTMONEY_QUOTE_URL.to_string(),
        })
    }

    /// Override both endpoints (mirrors, test servers).
    pub fn with_endpoints(mut self, kline_url: impl Into<String>, quote_url: impl Into<String>) -> Self {
        self.kline_url = kline_url.into();
        self.quote_url = quote_url.into();
        self
    }

    fn get<T: serde::de::DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self.client.get(url).query(query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SummaryError::UpstreamStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
            });
        }
        resp.json()
            .map_err(|e| SummaryError::MalformedResponse(format!("{PROVIDER} {url}: {e}")))
    }
}

impl DataProvider for EastmoneyProvider {
    fn name(&self) -> &str {
        "eastmoney"
    }

    fn fetch_daily(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>> {
        let secid = ticker::eastmoney_secid(ts_code);
        info!(ts_code, secid = secid.as_str(), "fetching Eastmoney klines");
        let query = [
            ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
            ("fields2", "f51,f52,f53,f54,f55,f56,f57,f61".to_string()),
            ("ut", config::EASTMONEY_KLINE_UT.to_string()),
            // daily bars, unadjusted
            ("klt", "101".to_string()),
            ("fqt", "0".to_string()),
            ("beg", format_date(start)),
            ("end", format_date(end)),
            ("secid", secid),
        ];
        let resp: KlineResponse = self.get(&self.kline_url, &query)?;
        parse_kline_response(ts_code, resp)
    }

    fn fetch_name(&self, ts_code: &str) -> Result<Option<String>> {
        let query = [
            ("ut", config::EASTMONEY_QUOTE_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fields", "f14".to_string()),
            ("secid", ticker::eastmoney_secid(ts_code)),
        ];
        let resp: QuoteResponse = self.get(&self.quote_url, &query)?;
        Ok(parse_name(resp))
    }
}
