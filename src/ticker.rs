//! Ticker normalization to the `<code>.<exchange>` form both providers use.

use crate::error::{Result, SummaryError};

const EXCHANGES: [&str; 3] = ["SH", "SZ", "BJ"];

/// Normalize a raw ticker into `600519.SH` form.
///
/// Six-digit codes get an exchange suffix from their leading digit
/// (`6`/`9` Shanghai, `0`/`3` Shenzhen, `4`/`8` Beijing). Codes that already
/// carry a suffix, and codes matching no rule, are returned uppercased.
pub fn normalize(code: &str) -> Result<String> {
    let c = code.trim().to_ascii_uppercase();
    if c.is_empty() {
        return Err(SummaryError::MissingParameters("code is required".into()));
    }
    if !c.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '.') {
        return Err(SummaryError::InvalidArgument(format!(
            "code '{}' contains invalid characters",
            code.trim()
        )));
    }
    if c.contains('.') {
        return Ok(c);
    }
    if c.len() == 6 && c.bytes().all(|b| b.is_ascii_digit()) {
        let suffix = match c.as_bytes()[0] {
            b'6' | b'9' => Some("SH"),
            b'0' | b'3' => Some("SZ"),
            b'4' | b'8' => Some("BJ"),
            _ => None,
        };
        if let Some(ex) = suffix {
            return Ok(format!("{c}.{ex}"));
        }
    }
    Ok(c)
}

/// Split `600519.SH` into `("600519", Some("SH"))`.
pub fn split(ts_code: &str) -> (&str, Option<&str>) {
    match ts_code.split_once('.') {
        Some((code, ex)) if EXCHANGES.contains(&ex) => (code, Some(ex)),
        Some((code, _)) => (code, None),
        None => (ts_code, None),
    }
}

/// Eastmoney `secid`: market `1` for Shanghai, `0` for everything else.
pub fn eastmoney_secid(ts_code: &str) -> String {
    let (code, ex) = split(ts_code);
    let market = if ex == Some("SH") { "1" } else { "0" };
    format!("{market}.{code}")
}
