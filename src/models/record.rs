use serde::{Deserialize, Serialize};

use crate::error::{Result, SummaryError};

// ---------------------------------------------------------------------------
// DailyRecord — One trading day's observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyRecord {
    /// `YYYYMMDD`; lexicographic order is chronological order.
    pub trade_date: String,
    pub close: Option<f64>,
    /// Percentage of outstanding shares traded that day.
    pub turnover_rate: Option<f64>,
}

impl DailyRecord {
    pub fn new(trade_date: impl Into<String>, close: Option<f64>, turnover_rate: Option<f64>) -> Self {
        Self {
            trade_date: trade_date.into(),
            close,
            turnover_rate,
        }
    }

    /// The close, if it is usable for price statistics (finite and positive).
    pub fn valid_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite() && *c > 0.0)
    }

    /// The turnover rate, if finite.
    pub fn valid_turnover(&self) -> Option<f64> {
        self.turnover_rate.filter(|t| t.is_finite())
    }
}

// ---------------------------------------------------------------------------
// RecordWindow — Sorted, date-unique, non-empty run of records
// ---------------------------------------------------------------------------

/// An ascending, de-duplicated-by-date, non-empty sequence of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordWindow {
    records: Vec<DailyRecord>,
}

impl RecordWindow {
    /// Sort and de-duplicate `records` into a window.
    ///
    /// Returns `None` when there are no records. When several records share a
    /// trade date the one supplied last wins.
    pub fn new(records: Vec<DailyRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let mut indexed: Vec<(usize, DailyRecord)> = records.into_iter().enumerate().collect();
        // Stable on the original index so "last supplied" is well defined.
        indexed.sort_by(|(ia, a), (ib, b)| a.trade_date.cmp(&b.trade_date).then(ia.cmp(ib)));

        let mut out: Vec<DailyRecord> = Vec::with_capacity(indexed.len());
        for (_, rec) in indexed {
            match out.last_mut() {
                Some(prev) if prev.trade_date == rec.trade_date => *prev = rec,
                _ => out.push(rec),
            }
        }
        Some(Self { records: out })
    }

    /// Keep only records carrying a valid close. `None` if none survive.
    pub fn price_valid(self) -> Option<Self> {
        let records: Vec<DailyRecord> = self
            .records
            .into_iter()
            .filter(|r| r.valid_close().is_some())
            .collect();
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    /// Keep the final `n` records.
    ///
    /// Fails with [`SummaryError::InsufficientData`] when the window is
    /// shorter than `n`.
    pub fn last_n(self, n: usize) -> Result<Self> {
        let available = self.records.len();
        if available < n {
            return Err(SummaryError::InsufficientData {
                available,
                requested: n,
            });
        }
        let mut records = self.records;
        records.drain(..available - n);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> &DailyRecord {
        &self.records[0]
    }

    pub fn last(&self) -> &DailyRecord {
        &self.records[self.records.len() - 1]
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }
}
