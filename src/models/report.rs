use serde::{Deserialize, Serialize};

use super::record::DailyRecord;
use super::summary::{BuyReference, Summary};
use crate::window::{WindowMode, WindowSelector};

// ---------------------------------------------------------------------------
// StockRequest — What the caller asked for
// ---------------------------------------------------------------------------

/// A summary request: ticker, window selector, optional buy reference.
///
/// `code` may be a raw six-digit code or an exchange-suffixed one; the SDK
/// normalizes it before fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRequest {
    pub code: String,
    pub window: WindowSelector,
    pub buy: Option<BuyReference>,
}

impl StockRequest {
    pub fn last_n(code: impl Into<String>, n: usize) -> Self {
        Self {
            code: code.into(),
            window: WindowSelector::LastN { n, bounds: None },
            buy: None,
        }
    }

    pub fn range(code: impl Into<String>, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        Self {
            code: code.into(),
            window: WindowSelector::Range { start, end },
            buy: None,
        }
    }

    pub fn with_buy(mut self, buy: Option<BuyReference>) -> Self {
        self.buy = buy;
        self
    }
}

// ---------------------------------------------------------------------------
// StockReport — The resolved window plus its summary
// ---------------------------------------------------------------------------

/// Result of one request: the selected records and their summary.
///
/// `summary` is `None` exactly when `items` is empty (the provider had no data
/// for the requested range). `start`/`end` are the bounds the provider was
/// asked for; the summary carries the bounds actually covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub ts_code: String,
    pub name_cn: Option<String>,
    pub mode: WindowMode,
    pub start: String,
    pub end: String,
    pub n: Option<usize>,
    pub items: Vec<DailyRecord>,
    pub summary: Option<Summary>,
}

impl StockReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
