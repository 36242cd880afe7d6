//! CSV and spreadsheet export of a finished [`StockReport`].
//!
//! Export only formats values already computed by the aggregator. The daily
//! CSV starts with a UTF-8 byte-order mark so spreadsheet applications pick
//! the right encoding; the workbook is written as a single `.xlsx` file.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet};
use tracing::info;

use crate::error::Result;
use crate::models::{DailyRecord, ExtremeDates, StockReport, Summary};

pub const BOM: &[u8] = b"\xEF\xBB\xBF";

fn num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Daily CSV
// ---------------------------------------------------------------------------

/// Write `trade_date,close,turnover_rate` rows, BOM first. Absent values are
/// empty cells.
pub fn write_csv<W: Write>(items: &[DailyRecord], mut writer: W) -> Result<()> {
    writer.write_all(BOM)?;
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["trade_date", "close", "turnover_rate"])?;
    for r in items {
        wtr.write_record([r.trade_date.clone(), num(r.close), num(r.turnover_rate)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `write_csv` into a byte buffer.
pub fn csv_bytes(items: &[DailyRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(items, &mut buf)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// One spreadsheet cell. Absent values stay blank.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn number(v: Option<f64>) -> Self {
        v.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Empty => Ok(()),
        }
    }
}

/// One row-oriented worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn write_to(&self, ws: &mut Worksheet) -> Result<()> {
        ws.set_name(&self.name)?;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => {
                        ws.write_string(r as u32, c as u16, s)?;
                    }
                    Cell::Number(n) => {
                        ws.write_number(r as u32, c as u16, *n)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
        Ok(())
    }
}

/// A summary sheet plus a per-day sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_report(report: &StockReport) -> Self {
        let mut summary_rows = vec![
            row("Code", Cell::text(&report.ts_code)),
            row("Name", Cell::text(report.name_cn.clone().unwrap_or_default())),
            row("Mode", Cell::text(report.mode.as_str())),
        ];
        match &report.summary {
            Some(s) => summary_rows.extend(summary_rows_for(s)),
            None => {
                summary_rows.push(row("Requested start", Cell::text(&report.start)));
                summary_rows.push(row("Requested end", Cell::text(&report.end)));
                summary_rows.push(row("Trading days", Cell::Number(0.0)));
            }
        }

        let mut daily_rows = vec![vec![
            Cell::text("trade_date"),
            Cell::text("close"),
            Cell::text("turnover_rate"),
        ]];
        daily_rows.extend(report.items.iter().map(|r| {
            vec![
                Cell::text(&r.trade_date),
                Cell::number(r.close),
                Cell::number(r.turnover_rate),
            ]
        }));

        Self {
            sheets: vec![
                Sheet {
                    name: "summary".to_string(),
                    rows: summary_rows,
                },
                Sheet {
                    name: "daily".to_string(),
                    rows: daily_rows,
                },
            ],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn to_xlsx(&self) -> Result<XlsxWorkbook> {
        let mut book = XlsxWorkbook::new();
        for sheet in &self.sheets {
            sheet.write_to(book.add_worksheet())?;
        }
        Ok(book)
    }

    /// Serialize as an `.xlsx` file in memory.
    pub fn xlsx_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_xlsx()?.save_to_buffer()?)
    }

    pub fn save_xlsx(&self, path: &Path) -> Result<()> {
        self.to_xlsx()?.save(path)?;
        Ok(())
    }
}

fn row(label: &str, value: Cell) -> Vec<Cell> {
    vec![Cell::text(label), value]
}

fn dates(d: Option<&ExtremeDates>) -> Cell {
    match d {
        Some(d) => Cell::Text(d.dates.join(" ")),
        None => Cell::Empty,
    }
}

fn summary_rows_for(s: &Summary) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        row("Start", Cell::text(&s.start)),
        row("End", Cell::text(&s.end)),
        row("Trading days", Cell::Number(s.count as f64)),
        row("Latest close", Cell::Number(s.today_close)),
        row("Mean close", Cell::Number(s.mean)),
        row("High", Cell::Number(s.high)),
        row("High dates", dates(Some(&s.high_dates))),
        row("Low", Cell::Number(s.low)),
        row("Low dates", dates(Some(&s.low_dates))),
        row("Deviation from mean", Cell::number(s.dev_vs_mean)),
        row("Amplitude", Cell::number(s.amplitude)),
        row("Rise from low", Cell::number(s.rise_from_low)),
        row("Drawdown from high", Cell::number(s.drawdown_from_high)),
        row("Position in range (%)", Cell::number(s.pos_pct_clamped())),
        row("Turnover latest (%)", Cell::number(s.turnover_latest)),
        row("Turnover mean (%)", Cell::number(s.turnover_mean)),
        row("Turnover max (%)", Cell::number(s.turnover_max)),
        row("Turnover max dates", dates(s.turnover_max_dates.as_ref())),
        row("Turnover min (%)", Cell::number(s.turnover_min)),
        row("Turnover min dates", dates(s.turnover_min_dates.as_ref())),
    ];
    if let Some(b) = &s.buy {
        rows.push(row("Buy price", Cell::Number(b.buy)));
        rows.push(row("Shares", Cell::number(b.shares)));
        rows.push(row("Diff to buy", Cell::Number(b.diff)));
        rows.push(row("Return vs buy", Cell::Number(b.pct)));
        rows.push(row("Floating P&L", Cell::number(b.floating_pnl)));
    }
    rows
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// `{ts_code}_{start}-{end}`, using the covered window when there is one.
pub fn file_stem(report: &StockReport) -> String {
    let (start, end) = match &report.summary {
        Some(s) => (s.start.as_str(), s.end.as_str()),
        None => (report.start.as_str(), report.end.as_str()),
    };
    format!("{}_{}-{}", report.ts_code, start, end)
}

/// Write `<stem>.csv` and `<stem>.xlsx` into `dir` (the platform download
/// directory when `None`). Returns the paths written.
pub fn save(report: &StockReport, dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let dir = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(crate::config::default_export_dir);
    std::fs::create_dir_all(&dir)?;
    let stem = file_stem(report);

    let csv_path = dir.join(format!("{stem}.csv"));
    write_csv(&report.items, BufWriter::new(File::create(&csv_path)?))?;

    let xlsx_path = dir.join(format!("{stem}.xlsx"));
    Workbook::from_report(report).save_xlsx(&xlsx_path)?;

    info!(dir = %dir.display(), stem = %stem, "report exported");
    Ok(vec![csv_path, xlsx_path])
}
