//! Reduction of a record window into a [`Summary`].
//!
//! Price statistics use records with a valid close; turnover statistics use
//! every record with a finite turnover rate, independently. Ratios whose
//! denominator is zero or whose operands are not finite come out as `None`.
//! Extremes keep every date on which they occur.

use tracing::debug;

use crate::error::{Result, SummaryError};
use crate::models::{BuyComparison, BuyReference, ExtremeDates, RecordWindow, Summary};

// ---------------------------------------------------------------------------
// RunningStats
// ---------------------------------------------------------------------------

/// Single-pass count / mean / min / max accumulator.
///
/// The mean is updated incrementally so that a series of very large closes
/// never overflows an intermediate sum.
#[derive(Debug, Clone, Copy)]
struct RunningStats {
    count: usize,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, v: f64) {
        self.count += 1;
        self.mean += (v - self.mean) / self.count as f64;
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }

    /// Mean, clamped into `[min, max]` to absorb rounding.
    fn mean(&self) -> Option<f64> {
        if self.count == 0 || !self.mean.is_finite() {
            return None;
        }
        Some(self.mean.clamp(self.min, self.max))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `num / den`, or `None` when `den` is zero or either side (or the result)
/// is not finite.
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if !num.is_finite() || !den.is_finite() || den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

/// Dates of every point whose value is exactly `value`.
pub fn extreme_dates(points: &[(&str, f64)], value: f64) -> Option<ExtremeDates> {
    ExtremeDates::from_dates(
        points
            .iter()
            .filter(|(_, v)| *v == value)
            .map(|(d, _)| *d),
    )
}

struct SeriesStats {
    mean: f64,
    high: f64,
    low: f64,
    high_dates: ExtremeDates,
    low_dates: ExtremeDates,
}

fn series_stats(points: &[(&str, f64)]) -> Option<SeriesStats> {
    let mut stats = RunningStats::new();
    for (_, v) in points {
        stats.push(*v);
    }
    let mean = stats.mean()?;
    Some(SeriesStats {
        mean,
        high: stats.max,
        low: stats.min,
        high_dates: extreme_dates(points, stats.max)?,
        low_dates: extreme_dates(points, stats.min)?,
    })
}

// ---------------------------------------------------------------------------
// summarize
// ---------------------------------------------------------------------------

/// Reduce `window` into a [`Summary`].
///
/// # Errors
///
/// [`SummaryError::EmptyPriceSeries`] when no record carries a valid close.
/// Individual malformed values never fail the call; they are skipped.
pub fn summarize(
    ts_code: &str,
    window: &RecordWindow,
    buy: Option<&BuyReference>,
) -> Result<Summary> {
    let records = window.records();

    let prices: Vec<(&str, f64)> = records
        .iter()
        .filter_map(|r| r.valid_close().map(|c| (r.trade_date.as_str(), c)))
        .collect();
    let price = series_stats(&prices).ok_or(SummaryError::EmptyPriceSeries)?;
    let today_close = prices[prices.len() - 1].1;

    let turnovers: Vec<(&str, f64)> = records
        .iter()
        .filter_map(|r| r.valid_turnover().map(|t| (r.trade_date.as_str(), t)))
        .collect();
    let turnover = series_stats(&turnovers);

    if prices.len() < records.len() {
        debug!(
            ts_code,
            skipped = records.len() - prices.len(),
            "records without a valid close left out of price stats"
        );
    }

    let buy = buy.map(|b| {
        let diff = today_close - b.price;
        BuyComparison {
            buy: b.price,
            shares: b.shares,
            diff,
            pct: diff / b.price,
            floating_pnl: b.shares.map(|s| diff * s).filter(|p| p.is_finite()),
        }
    });

    Ok(Summary {
        ts_code: ts_code.to_string(),
        start: window.first().trade_date.clone(),
        end: window.last().trade_date.clone(),
        count: window.len(),

        today_close,
        mean: price.mean,
        high: price.high,
        low: price.low,

        dev_vs_mean: ratio(today_close - price.mean, price.mean),
        amplitude: ratio(price.high - price.low, price.low),
        rise_from_low: ratio(today_close - price.low, price.low),
        drawdown_from_high: ratio(today_close - price.high, price.high),
        pos_pct: ratio(today_close - price.low, price.high - price.low).map(|p| p * 100.0),

        high_dates: price.high_dates,
        low_dates: price.low_dates,

        turnover_latest: window.last().valid_turnover(),
        turnover_mean: turnover.as_ref().map(|t| t.mean),
        turnover_max: turnover.as_ref().map(|t| t.high),
        turnover_min: turnover.as_ref().map(|t| t.low),
        turnover_max_dates: turnover.as_ref().map(|t| t.high_dates.clone()),
        turnover_min_dates: turnover.map(|t| t.low_dates),

        buy,
    })
}
