//! Aggregation tests: statistics, date attribution, undefined ratios.

mod common;

use ashare_summary::aggregate::{ratio, summarize};
use ashare_summary::{BuyReference, ExtremeDates, SummaryError};
use common::{example_window, rec, window};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

// ---------------------------------------------------------------------------
// price statistics
// ---------------------------------------------------------------------------

#[test]
fn three_day_window_statistics() {
    let s = summarize("600519.SH", &example_window(), None).unwrap();

    assert_eq!(s.ts_code, "600519.SH");
    assert_eq!(s.start, "20240102");
    assert_eq!(s.end, "20240104");
    assert_eq!(s.count, 3);
    assert_eq!(s.high, 12.0);
    assert_eq!(s.high_dates.first, "20240103");
    assert_eq!(s.high_dates.count, 1);
    assert_eq!(s.low, 10.0);
    assert_eq!(s.low_dates.first, "20240102");
    assert_eq!(s.mean, 11.0);
    assert_eq!(s.today_close, 11.0);
    assert_eq!(s.pos_pct, Some(50.0));
}

#[test]
fn derived_ratios() {
    let s = summarize("600519.SH", &example_window(), None).unwrap();

    assert_eq!(s.dev_vs_mean, Some(0.0));
    assert!(approx(s.amplitude.unwrap(), 0.2));
    assert!(approx(s.rise_from_low.unwrap(), 0.1));
    assert!(approx(s.drawdown_from_high.unwrap(), -1.0 / 12.0));
}

#[test]
fn single_record_window() {
    let w = window(vec![rec("20240102", Some(8.5), Some(0.7))]);
    let s = summarize("000001.SZ", &w, None).unwrap();

    assert_eq!(s.high, 8.5);
    assert_eq!(s.low, 8.5);
    assert_eq!(s.mean, 8.5);
    assert_eq!(s.today_close, 8.5);
    assert_eq!(s.amplitude, Some(0.0));
    assert_eq!(s.dev_vs_mean, Some(0.0));
    assert_eq!(s.rise_from_low, Some(0.0));
    assert_eq!(s.drawdown_from_high, Some(0.0));
    // high == low: position in range has a zero denominator
    assert_eq!(s.pos_pct, None);
    assert_eq!(s.pos_pct_clamped(), None);
}

#[test]
fn mean_of_identical_values_stays_inside_range() {
    let w = window(vec![
        rec("20240102", Some(0.1), None),
        rec("20240103", Some(0.1), None),
        rec("20240104", Some(0.1), None),
    ]);
    let s = summarize("X", &w, None).unwrap();
    assert!(s.low <= s.mean && s.mean <= s.high);
    assert_eq!(s.mean, 0.1);
}

#[test]
fn huge_closes_do_not_overflow_the_mean() {
    let w = window(vec![
        rec("20240102", Some(1e308), None),
        rec("20240103", Some(1e308), None),
        rec("20240104", Some(1.5e308), None),
    ]);
    let s = summarize("X", &w, None).unwrap();
    assert!(s.mean.is_finite());
    assert!(s.low <= s.mean && s.mean <= s.high);
    assert_eq!(s.low, 1e308);
    assert_eq!(s.high, 1.5e308);
    assert_eq!(s.pos_pct, Some(100.0));
}

#[test]
fn today_close_skips_trailing_record_without_close() {
    let w = window(vec![
        rec("20240102", Some(10.0), Some(1.0)),
        rec("20240103", Some(12.0), Some(2.0)),
        rec("20240104", None, Some(3.0)),
    ]);
    let s = summarize("X", &w, None).unwrap();
    assert_eq!(s.today_close, 12.0);
    assert_eq!(s.end, "20240104");
    assert_eq!(s.turnover_latest, Some(3.0));
}

#[test]
fn no_valid_close_is_empty_price_series() {
    let w = window(vec![
        rec("20240102", None, Some(1.0)),
        rec("20240103", Some(f64::NAN), Some(2.0)),
        rec("20240104", Some(-1.0), None),
    ]);
    let err = summarize("X", &w, None).unwrap_err();
    assert!(matches!(err, SummaryError::EmptyPriceSeries));
}

// ---------------------------------------------------------------------------
// date attribution
// ---------------------------------------------------------------------------

#[test]
fn tied_high_reports_every_date() {
    let w = window(vec![
        rec("20240102", Some(14.0), None),
        rec("20240103", Some(15.0), None),
        rec("20240104", Some(13.0), None),
        rec("20240105", Some(15.0), None),
    ]);
    let s = summarize("X", &w, None).unwrap();

    assert_eq!(s.high, 15.0);
    assert_eq!(s.high_dates.first, "20240103");
    assert_eq!(s.high_dates.count, 2);
    assert_eq!(s.high_dates.dates, vec!["20240103", "20240105"]);
    assert!(s.high_dates.is_tied());
    assert_eq!(s.high_dates.short(), "2024-01-03 (+1 more)");
    assert_eq!(s.low_dates.dates, vec!["20240104"]);
}

#[test]
fn tied_turnover_extremes_report_every_date() {
    let w = window(vec![
        rec("20240102", Some(10.0), Some(0.5)),
        rec("20240103", Some(10.5), Some(0.9)),
        rec("20240104", Some(10.2), Some(0.5)),
    ]);
    let s = summarize("X", &w, None).unwrap();

    let min_dates = s.turnover_min_dates.unwrap();
    assert_eq!(s.turnover_min, Some(0.5));
    assert_eq!(min_dates.dates, vec!["20240102", "20240104"]);
    assert_eq!(s.turnover_max_dates.unwrap().first, "20240103");
}

#[test]
fn extreme_dates_sorts_and_dedups() {
    let d = ExtremeDates::from_dates(["20240105", "20240103", "20240105", ""]).unwrap();
    assert_eq!(d.first, "20240103");
    assert_eq!(d.count, 2);
    assert_eq!(d.last(), "20240105");
    assert_eq!(d.detail(), "2 days; earliest 2024-01-03; latest 2024-01-05");
    assert!(ExtremeDates::from_dates(Vec::<String>::new()).is_none());
}

// ---------------------------------------------------------------------------
// turnover
// ---------------------------------------------------------------------------

#[test]
fn turnover_statistics() {
    let s = summarize("X", &example_window(), None).unwrap();
    assert_eq!(s.turnover_latest, Some(1.5));
    assert_eq!(s.turnover_mean, Some(1.5));
    assert_eq!(s.turnover_max, Some(2.0));
    assert_eq!(s.turnover_min, Some(1.0));
}

#[test]
fn turnover_entirely_absent_is_undefined_not_error() {
    let w = window(vec![
        rec("20240102", Some(10.0), None),
        rec("20240103", Some(11.0), Some(f64::NAN)),
    ]);
    let s = summarize("X", &w, None).unwrap();

    assert_eq!(s.turnover_latest, None);
    assert_eq!(s.turnover_mean, None);
    assert_eq!(s.turnover_max, None);
    assert_eq!(s.turnover_min, None);
    assert!(s.turnover_max_dates.is_none());
    assert!(s.turnover_min_dates.is_none());
}

#[test]
fn record_with_bad_close_still_contributes_turnover() {
    let w = window(vec![
        rec("20240102", Some(10.0), Some(1.0)),
        rec("20240103", Some(f64::INFINITY), Some(5.0)),
        rec("20240104", Some(11.0), Some(2.0)),
    ]);
    let s = summarize("X", &w, None).unwrap();

    assert_eq!(s.high, 11.0);
    assert_eq!(s.mean, 10.5);
    assert_eq!(s.count, 3);
    assert_eq!(s.turnover_max, Some(5.0));
    assert_eq!(s.turnover_max_dates.unwrap().first, "20240103");
}

// ---------------------------------------------------------------------------
// buy comparison
// ---------------------------------------------------------------------------

#[test]
fn buy_comparison_with_shares() {
    let buy = BuyReference::new(10.0, Some(100.0)).unwrap();
    let s = summarize("X", &example_window(), Some(&buy)).unwrap();
    let b = s.buy.unwrap();

    assert_eq!(b.diff, 1.0);
    assert!(approx(b.pct, 0.10));
    assert_eq!(b.floating_pnl, Some(100.0));
}

#[test]
fn buy_comparison_without_shares_has_no_pnl() {
    let buy = BuyReference::new(12.5, None).unwrap();
    let s = summarize("X", &example_window(), Some(&buy)).unwrap();
    let b = s.buy.unwrap();

    assert_eq!(b.diff, -1.5);
    assert!(approx(b.pct, -0.12));
    assert_eq!(b.floating_pnl, None);
}

#[test]
fn invalid_buy_reference_is_rejected() {
    assert!(BuyReference::new(0.0, Some(100.0)).is_none());
    assert!(BuyReference::new(-3.0, None).is_none());
    assert!(BuyReference::new(f64::NAN, None).is_none());
    assert_eq!(BuyReference::new(5.0, Some(f64::NAN)).unwrap().shares, None);
}

#[test]
fn absent_buy_is_omitted_from_json() {
    let s = summarize("X", &example_window(), None).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    assert!(v.get("buy").is_none());

    let buy = BuyReference::new(10.0, None).unwrap();
    let s = summarize("X", &example_window(), Some(&buy)).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["buy"]["diff"], 1.0);
    assert!(v["buy"].get("floating_pnl").is_none());
}

// ---------------------------------------------------------------------------
// undefined values and purity
// ---------------------------------------------------------------------------

#[test]
fn undefined_ratios_serialize_as_null() {
    let w = window(vec![rec("20240102", Some(8.5), None)]);
    let s = summarize("X", &w, None).unwrap();
    let v = serde_json::to_value(&s).unwrap();

    assert!(v["pos_pct"].is_null());
    assert!(v["turnover_mean"].is_null());
    assert_eq!(v["amplitude"], 0.0);
}

#[test]
fn ratio_guards_zero_and_non_finite() {
    assert_eq!(ratio(1.0, 0.0), None);
    assert_eq!(ratio(f64::NAN, 1.0), None);
    assert_eq!(ratio(1.0, f64::INFINITY), None);
    assert_eq!(ratio(1e308, 1e-308), None);
    assert_eq!(ratio(3.0, 4.0), Some(0.75));
}

#[test]
fn clamped_position_for_display() {
    let mut s = summarize("X", &example_window(), None).unwrap();
    s.pos_pct = Some(130.0);
    assert_eq!(s.pos_pct_clamped(), Some(100.0));
    s.pos_pct = Some(-5.0);
    assert_eq!(s.pos_pct_clamped(), Some(0.0));
}

#[test]
fn aggregation_is_deterministic() {
    let w = window(common::trading_days("20240102", 40));
    let buy = BuyReference::new(11.0, Some(300.0)).unwrap();
    let a = summarize("X", &w, Some(&buy)).unwrap();
    let b = summarize("X", &w, Some(&buy)).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
