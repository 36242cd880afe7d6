//! Window selection: turns a caller's selector into concrete fetch bounds.
//!
//! A selector is either an explicit date range or "the last N trading days".
//! Last-N requests fetch a generous calendar lookback and are trimmed to N
//! price-valid records after the fetch (see [`crate::models::RecordWindow::last_n`]).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config;
use crate::error::{Result, SummaryError};

// ---------------------------------------------------------------------------
// WindowMode / WindowSelector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowMode {
    #[serde(rename = "n")]
    LastN,
    #[serde(rename = "range")]
    Range,
}

impl WindowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowMode::LastN => "n",
            WindowMode::Range => "range",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "n" => Ok(WindowMode::LastN),
            "range" => Ok(WindowMode::Range),
            other => Err(SummaryError::InvalidArgument(format!(
                "mode must be 'n' or 'range', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSelector {
    /// The last `n` trading days. `bounds` overrides the default lookback.
    LastN {
        n: usize,
        bounds: Option<(NaiveDate, NaiveDate)>,
    },
    Range { start: NaiveDate, end: NaiveDate },
}

impl WindowSelector {
    pub fn mode(&self) -> WindowMode {
        match self {
            WindowSelector::LastN { .. } => WindowMode::LastN,
            WindowSelector::Range { .. } => WindowMode::Range,
        }
    }

    /// Build a selector from raw request parts.
    ///
    /// `mode` defaults to last-N and `n` to [`config::DEFAULT_LAST_N`]. Range
    /// mode requires both `start` and `end`; last-N mode accepts both or
    /// neither. Fails before any upstream call is made.
    pub fn from_parts(
        mode: Option<&str>,
        n: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self> {
        let mode = WindowMode::parse(mode.unwrap_or(""))?;
        let start = non_empty(start).map(parse_date).transpose()?;
        let end = non_empty(end).map(parse_date).transpose()?;

        match mode {
            WindowMode::Range => match (start, end) {
                (Some(start), Some(end)) => WindowSelector::range(start, end),
                _ => Err(SummaryError::MissingParameters(
                    "mode=range requires start and end".into(),
                )),
            },
            WindowMode::LastN => {
                let n = match non_empty(n) {
                    Some(raw) => parse_n(raw)?,
                    None => config::DEFAULT_LAST_N,
                };
                let bounds = match (start, end) {
                    (Some(s), Some(e)) => {
                        check_order(s, e)?;
                        Some((s, e))
                    }
                    (None, None) => None,
                    _ => {
                        return Err(SummaryError::MissingParameters(
                            "mode=n takes both start and end, or neither".into(),
                        ))
                    }
                };
                Ok(WindowSelector::LastN { n, bounds })
            }
        }
    }

    /// Build a selector from typed options with no defaults applied.
    ///
    /// `n` wins when present (with `start`/`end` as optional lookback
    /// bounds); otherwise both `start` and `end` are required.
    pub fn from_options(
        n: Option<usize>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self> {
        match (n, start, end) {
            (Some(0), _, _) => Err(SummaryError::InvalidArgument("n must be positive".into())),
            (Some(n), Some(s), Some(e)) => {
                check_order(s, e)?;
                Ok(WindowSelector::LastN {
                    n,
                    bounds: Some((s, e)),
                })
            }
            (Some(n), None, None) => Ok(WindowSelector::LastN { n, bounds: None }),
            (None, Some(s), Some(e)) => WindowSelector::range(s, e),
            (None, None, None) => Err(SummaryError::MissingParameters(
                "either n or start/end is required".into(),
            )),
            _ => Err(SummaryError::MissingParameters(
                "start and end must be given together".into(),
            )),
        }
    }

    /// An explicit range, rejecting `start > end`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        check_order(start, end)?;
        Ok(WindowSelector::Range { start, end })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_n(raw: &str) -> Result<usize> {
    let n: i64 = raw
        .parse()
        .map_err(|_| SummaryError::InvalidArgument(format!("n must be an integer, got '{raw}'")))?;
    if n <= 0 {
        return Err(SummaryError::InvalidArgument(format!(
            "n must be positive, got {n}"
        )));
    }
    Ok(n as usize)
}

fn check_order(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(SummaryError::InvalidArgument(format!(
            "start {} is after end {}",
            format_date(start),
            format_date(end)
        )));
    }
    Ok(())
}

/// Parse `YYYYMMDD`, also accepting `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, config::TRADE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| SummaryError::InvalidArgument(format!("invalid date '{s}', expected YYYYMMDD")))
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(config::TRADE_DATE_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// WindowPolicy / ResolvedWindow
// ---------------------------------------------------------------------------

/// Concrete bounds handed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of trading days to keep after the fetch, for last-N requests.
    pub expected_count: Option<usize>,
}

/// Calendar defaults for window resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
    pub default_display_window_days: i64,
    pub n_mode_lookback_days: i64,
    pub max_last_n: usize,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            default_display_window_days: config::DEFAULT_DISPLAY_WINDOW_DAYS,
            n_mode_lookback_days: config::N_MODE_LOOKBACK_DAYS,
            max_last_n: config::MAX_LAST_N,
        }
    }
}

impl WindowPolicy {
    /// Resolve `selector` against `today`.
    ///
    /// Last-N requests without explicit bounds look back
    /// `n_mode_lookback_days` calendar days; `n` is clamped to `max_last_n`.
    pub fn resolve(&self, selector: &WindowSelector, today: NaiveDate) -> ResolvedWindow {
        let resolved = match *selector {
            WindowSelector::Range { start, end } => ResolvedWindow {
                start,
                end,
                expected_count: None,
            },
            WindowSelector::LastN { n, bounds } => {
                let (start, end) = bounds.unwrap_or_else(|| {
                    (today - Duration::days(self.n_mode_lookback_days), today)
                });
                ResolvedWindow {
                    start,
                    end,
                    expected_count: Some(n.clamp(1, self.max_last_n)),
                }
            }
        };
        debug!(
            start = %format_date(resolved.start),
            end = %format_date(resolved.end),
            expected = ?resolved.expected_count,
            "resolved window"
        );
        resolved
    }

    /// The display default: the last `default_display_window_days` up to `today`.
    pub fn default_display_range(&self, today: NaiveDate) -> WindowSelector {
        WindowSelector::Range {
            start: today - Duration::days(self.default_display_window_days),
            end: today,
        }
    }
}
