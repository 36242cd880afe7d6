//! CSV and workbook export tests.

mod common;

use ashare_summary::export::{self, Cell, Workbook, BOM};
use calamine::{open_workbook, Data, Reader, Xlsx};
use ashare_summary::{BuyReference, StockReport, StockRequest, StockSummarySdk};
use common::{date, rec, MockProvider, MockResponse};

fn report(provider: MockProvider, buy: Option<BuyReference>) -> StockReport {
    let sdk = StockSummarySdk::builder()
        .provider(Box::new(provider))
        .cache(false)
        .build()
        .unwrap();
    let req = StockRequest::range("600519", date("20240101"), date("20240131")).with_buy(buy);
    (*sdk.query_as_of(&req, date("20241019")).unwrap()).clone()
}

fn example_report() -> StockReport {
    report(
        MockProvider::records(vec![
            rec("20240102", Some(10.0), Some(1.0)),
            rec("20240103", Some(12.0), None),
            rec("20240104", Some(11.0), Some(1.5)),
        ])
        .with_name("贵州茅台"),
        BuyReference::new(10.0, Some(100.0)),
    )
}

fn text_without_bom(bytes: &[u8]) -> String {
    assert!(bytes.starts_with(BOM), "missing byte-order mark");
    String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap()
}

fn value(wb: &Workbook, label: &str) -> String {
    wb.sheet("summary")
        .unwrap()
        .rows
        .iter()
        .find(|r| r[0] == Cell::text(label))
        .map(|r| r[1].to_string())
        .unwrap_or_else(|| panic!("no row {label}"))
}

// ---------------------------------------------------------------------------
// Daily CSV
// ---------------------------------------------------------------------------

#[test]
fn csv_has_bom_header_and_empty_cells() {
    let r = example_report();
    let text = text_without_bom(&export::csv_bytes(&r.items).unwrap());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "trade_date,close,turnover_rate");
    assert_eq!(lines[1], "20240102,10,1");
    assert_eq!(lines[2], "20240103,12,");
    assert_eq!(lines[3], "20240104,11,1.5");
    assert_eq!(lines.len(), 4);
}

#[test]
fn csv_of_nothing_is_just_the_header() {
    let text = text_without_bom(&export::csv_bytes(&[]).unwrap());
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["trade_date,close,turnover_rate"]);
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

#[test]
fn workbook_has_summary_and_daily_sheets() {
    let wb = Workbook::from_report(&example_report());
    let names: Vec<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["summary", "daily"]);

    assert_eq!(value(&wb, "Code"), "600519.SH");
    assert_eq!(value(&wb, "Name"), "贵州茅台");
    assert_eq!(value(&wb, "Mode"), "range");
    assert_eq!(value(&wb, "Trading days"), "3");
    assert_eq!(value(&wb, "High"), "12");
    assert_eq!(value(&wb, "High dates"), "20240103");
    assert_eq!(value(&wb, "Position in range (%)"), "50");
    assert_eq!(value(&wb, "Buy price"), "10");
    assert_eq!(value(&wb, "Floating P&L"), "100");

    let daily = wb.sheet("daily").unwrap();
    assert_eq!(daily.rows.len(), 4);
    assert_eq!(
        daily.rows[2],
        vec![Cell::text("20240103"), Cell::Number(12.0), Cell::Empty]
    );
}

#[test]
fn workbook_without_buy_has_no_buy_rows() {
    let r = report(
        MockProvider::records(vec![rec("20240102", Some(10.0), Some(1.0))]),
        None,
    );
    let wb = Workbook::from_report(&r);
    let summary = wb.sheet("summary").unwrap();
    assert!(summary.rows.iter().all(|row| row[0] != Cell::text("Buy price")));
    assert_eq!(value(&wb, "Name"), "");
}

#[test]
fn workbook_for_empty_report() {
    let r = report(MockProvider::new(MockResponse::Empty), None);
    let wb = Workbook::from_report(&r);
    assert_eq!(value(&wb, "Trading days"), "0");
    assert_eq!(value(&wb, "Requested start"), "20240101");
    assert_eq!(wb.sheet("daily").unwrap().rows.len(), 1);
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_stem_uses_covered_window() {
    let r = example_report();
    assert_eq!(export::file_stem(&r), "600519.SH_20240102-20240104");

    let empty = report(MockProvider::new(MockResponse::Empty), None);
    assert_eq!(export::file_stem(&empty), "600519.SH_20240101-20240131");
}

#[test]
fn save_writes_csv_and_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let r = example_report();
    let written = export::save(&r, Some(dir.path())).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "600519.SH_20240102-20240104.csv",
            "600519.SH_20240102-20240104.xlsx",
        ]
    );
    assert!(std::fs::read(&written[0]).unwrap().starts_with(BOM));

    let mut book: Xlsx<_> = open_workbook(&written[1]).unwrap();
    assert_eq!(book.sheet_names(), vec!["summary", "daily"]);

    let summary = book.worksheet_range("summary").unwrap();
    assert_eq!(summary.get_value((0, 0)), Some(&Data::String("Code".into())));
    assert_eq!(
        summary.get_value((0, 1)),
        Some(&Data::String("600519.SH".into()))
    );

    let daily = book.worksheet_range("daily").unwrap();
    assert_eq!(daily.get_value((1, 0)), Some(&Data::String("20240102".into())));
    assert_eq!(daily.get_value((1, 1)), Some(&Data::Float(10.0)));
    assert_eq!(daily.get_value((3, 2)), Some(&Data::Float(1.5)));
}

#[test]
fn xlsx_bytes_is_a_zip_archive() {
    let bytes = Workbook::from_report(&example_report()).xlsx_bytes().unwrap();
    assert!(bytes.starts_with(b"PK"));
}
