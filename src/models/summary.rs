use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExtremeDates — Date attribution for a min/max value
// ---------------------------------------------------------------------------

/// Every date on which an extreme value occurred.
///
/// `first` is the earliest such date and `count` how many days share the
/// value; `dates` keeps the full ascending list for detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremeDates {
    pub first: String,
    pub count: usize,
    pub dates: Vec<String>,
}

impl ExtremeDates {
    /// Build from the dates sharing an extreme. `None` if `dates` is empty.
    pub fn from_dates<I, S>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dates: Vec<String> = dates.into_iter().map(Into::into).collect();
        dates.retain(|d| !d.is_empty());
        dates.sort();
        dates.dedup();
        let first = dates.first()?.clone();
        Some(Self {
            first,
            count: dates.len(),
            dates,
        })
    }

    pub fn last(&self) -> &str {
        self.dates.last().map(String::as_str).unwrap_or(&self.first)
    }

    pub fn is_tied(&self) -> bool {
        self.count > 1
    }

    /// Compact label: the date itself, or `"<earliest> (+N more)"` when tied.
    pub fn short(&self) -> String {
        if self.is_tied() {
            format!("{} (+{} more)", display_date(&self.first), self.count - 1)
        } else {
            display_date(&self.first)
        }
    }

    /// Longer label listing the span of tied dates.
    pub fn detail(&self) -> String {
        if self.is_tied() {
            format!(
                "{} days; earliest {}; latest {}",
                self.count,
                display_date(&self.first),
                display_date(self.last())
            )
        } else {
            format!("on {}", display_date(&self.first))
        }
    }
}

/// `20240102` -> `2024-01-02`; other strings are returned unchanged.
pub fn display_date(yyyymmdd: &str) -> String {
    if yyyymmdd.len() == 8 && yyyymmdd.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &yyyymmdd[..4], &yyyymmdd[4..6], &yyyymmdd[6..])
    } else {
        yyyymmdd.to_string()
    }
}

// ---------------------------------------------------------------------------
// BuyReference / BuyComparison — Position relative to a purchase price
// ---------------------------------------------------------------------------

/// Caller-supplied purchase price and optional share count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyReference {
    pub price: f64,
    pub shares: Option<f64>,
}

impl BuyReference {
    /// `Some` only for a finite, positive price. A non-finite share count is
    /// dropped rather than rejecting the whole reference.
    pub fn new(price: f64, shares: Option<f64>) -> Option<Self> {
        if !(price.is_finite() && price > 0.0) {
            return None;
        }
        Some(Self {
            price,
            shares: shares.filter(|s| s.is_finite()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyComparison {
    pub buy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<f64>,
    /// `today_close - buy`.
    pub diff: f64,
    /// `diff / buy`.
    pub pct: f64,
    /// `diff * shares`, present only when shares were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_pnl: Option<f64>,
}

// ---------------------------------------------------------------------------
// Summary — Aggregate statistics over one window
// ---------------------------------------------------------------------------

/// Aggregate statistics for one record window.
///
/// Ratio fields are `None` where the value is undefined (zero denominator or
/// non-finite operand); they serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub ts_code: String,
    pub start: String,
    pub end: String,
    pub count: usize,

    pub today_close: f64,
    pub mean: f64,
    pub high: f64,
    pub low: f64,
    pub high_dates: ExtremeDates,
    pub low_dates: ExtremeDates,

    pub dev_vs_mean: Option<f64>,
    pub amplitude: Option<f64>,
    pub rise_from_low: Option<f64>,
    pub drawdown_from_high: Option<f64>,
    /// Raw position in the `[low, high]` range, in percent. Use
    /// [`Summary::pos_pct_clamped`] for display.
    pub pos_pct: Option<f64>,

    pub turnover_latest: Option<f64>,
    pub turnover_mean: Option<f64>,
    pub turnover_max: Option<f64>,
    pub turnover_max_dates: Option<ExtremeDates>,
    pub turnover_min: Option<f64>,
    pub turnover_min_dates: Option<ExtremeDates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy: Option<BuyComparison>,
}

impl Summary {
    /// `pos_pct` clamped to `[0, 100]`.
    pub fn pos_pct_clamped(&self) -> Option<f64> {
        self.pos_pct.map(|p| p.clamp(0.0, 100.0))
    }
}
