//! HTTP boundary: query-string parameters in, JSON envelope out.
//!
//! This is the only place that knows about legacy parameter aliases
//! (`start_date`/`end_date`) and dashed dates. Everything behind it works on
//! the canonical [`StockRequest`] and [`StockReport`] shapes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SummaryError};
use crate::models::{BuyReference, DailyRecord, StockReport, StockRequest, Summary};
use crate::window::{WindowMode, WindowSelector};

// ---------------------------------------------------------------------------
// StockQueryParams
// ---------------------------------------------------------------------------

/// Raw `GET /api/stock` query parameters, all as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockQueryParams {
    pub code: Option<String>,
    pub mode: Option<String>,
    pub n: Option<String>,
    #[serde(alias = "start_date")]
    pub start: Option<String>,
    #[serde(alias = "end_date")]
    pub end: Option<String>,
    pub buy: Option<String>,
    pub shares: Option<String>,
}

fn parse_optional_f64(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| SummaryError::InvalidArgument(format!("{name} must be a number, got '{s}'"))),
    }
}

impl StockQueryParams {
    /// Validate into a [`StockRequest`].
    ///
    /// A missing `code` or range bounds is [`SummaryError::MissingParameters`];
    /// malformed numbers and dates are [`SummaryError::InvalidArgument`]. A
    /// `buy` that is zero or negative is ignored rather than rejected.
    pub fn into_request(self) -> Result<StockRequest> {
        let code = self
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SummaryError::MissingParameters("code is required".into()))?
            .to_string();

        let window = WindowSelector::from_parts(
            self.mode.as_deref(),
            self.n.as_deref(),
            self.start.as_deref(),
            self.end.as_deref(),
        )?;

        let buy = parse_optional_f64("buy", self.buy.as_deref())?;
        let shares = parse_optional_f64("shares", self.shares.as_deref())?;
        let buy = buy.and_then(|price| BuyReference::new(price, shares));

        Ok(StockRequest { code, window, buy })
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// JSON envelope returned by `/api/stock`.
///
/// Callers must check `ok`: a "no data" result is `ok: true` with empty
/// `items` and a `null` summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<WindowMode>,
    /// Bounds the provider was asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Number of trading days returned, for last-N requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DailyRecord>>,
    /// Absent on failure; `null` on success without data.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub summary: Option<Option<Summary>>,
}

/// Any value for a present key, `null` included, maps to `Some`. Missing keys
/// fall back to `default` (`None`).
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ApiResponse {
    pub fn success(report: &StockReport) -> Self {
        Self {
            ok: true,
            msg: None,
            ts_code: Some(report.ts_code.clone()),
            name_cn: report.name_cn.clone(),
            mode: Some(report.mode),
            start: Some(report.start.clone()),
            end: Some(report.end.clone()),
            n: report.n,
            items: Some(report.items.clone()),
            summary: Some(report.summary.clone()),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
            ts_code: None,
            name_cn: None,
            mode: None,
            start: None,
            end: None,
            n: None,
            items: None,
            summary: None,
        }
    }

    /// Map a query outcome to `(status, body)`.
    pub fn from_result<R: AsRef<StockReport>>(result: &Result<R>) -> (u16, Self) {
        match result {
            Ok(report) => (200, Self::success(report.as_ref())),
            Err(e) => (e.http_status(), Self::failure(e.to_string())),
        }
    }
}
