//! Shared test fixtures for the summary SDK integration tests.
//!
//! Provides record builders and `MockProvider`, a canned [`DataProvider`]
//! that counts calls and remembers the last requested range.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ashare_summary::{DailyRecord, DataProvider, RecordWindow, Result, SummaryError};
use chrono::{Duration, NaiveDate};

pub fn rec(date: &str, close: Option<f64>, turnover: Option<f64>) -> DailyRecord {
    DailyRecord::new(date, close, turnover)
}

pub fn window(records: Vec<DailyRecord>) -> RecordWindow {
    RecordWindow::new(records).expect("non-empty window")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y%m%d").unwrap()
}

/// `count` weekday records starting at `first`, closes 10.0, 10.1, ...
pub fn trading_days(first: &str, count: usize) -> Vec<DailyRecord> {
    let mut d = date(first);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let wd = d.format("%u").to_string();
        if wd != "6" && wd != "7" {
            let i = out.len() as f64;
            out.push(DailyRecord::new(
                d.format("%Y%m%d").to_string(),
                Some(10.0 + i / 10.0),
                Some(1.0 + i / 100.0),
            ));
        }
        d += Duration::days(1);
    }
    out
}

/// The three-day window used throughout: high 12.0 on 0103, low 10.0 on 0102.
pub fn example_window() -> RecordWindow {
    window(vec![
        rec("20240102", Some(10.0), Some(1.0)),
        rec("20240103", Some(12.0), Some(2.0)),
        rec("20240104", Some(11.0), Some(1.5)),
    ])
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum MockResponse {
    Records(Vec<DailyRecord>),
    Empty,
    ProviderError(i64, String),
    Status(u16),
}

pub struct MockProvider {
    response: MockResponse,
    name: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub last_range: Arc<Mutex<Option<(NaiveDate, NaiveDate)>>>,
}

impl MockProvider {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            name: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_range: Arc::new(Mutex::new(None)),
        }
    }

    pub fn records(records: Vec<DailyRecord>) -> Self {
        Self::new(MockResponse::Records(records))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn call_count(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_daily(&self, ts_code: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock().unwrap() = Some((start, end));
        match &self.response {
            MockResponse::Records(r) => Ok(r.clone()),
            MockResponse::Empty => Err(SummaryError::EmptyResult {
                ts_code: ts_code.to_string(),
            }),
            MockResponse::ProviderError(code, msg) => Err(SummaryError::Provider {
                provider: "mock".to_string(),
                code: *code,
                msg: msg.clone(),
            }),
            MockResponse::Status(status) => Err(SummaryError::UpstreamStatus {
                provider: "mock".to_string(),
                status: *status,
            }),
        }
    }

    fn fetch_name(&self, _ts_code: &str) -> Result<Option<String>> {
        Ok(self.name.clone())
    }
}
