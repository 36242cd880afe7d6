use std::path::PathBuf;
use std::time::Duration;

pub const TUSHARE_URL: &str = "https://api.tushare.pro";
pub const EASTMONEY_KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
pub const EASTMONEY_QUOTE_URL: &str = "https://push2.eastmoney.com/api/qt/stock/get";
pub const EASTMONEY_REFERER: &str = "https://quote.eastmoney.com/";
pub const EASTMONEY_KLINE_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
pub const EASTMONEY_QUOTE_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Environment variable holding the TuShare API token.
pub const TUSHARE_TOKEN_ENV: &str = "TUSHARE_TOKEN";

/// Calendar days shown when the caller gives no window at all.
pub const DEFAULT_DISPLAY_WINDOW_DAYS: i64 = 180;
/// Calendar lookback used to find the last N trading days.
pub const N_MODE_LOOKBACK_DAYS: i64 = 900;
pub const DEFAULT_LAST_N: usize = 60;
pub const MAX_LAST_N: usize = 2000;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Lifetime of a cached populated result.
pub const RESULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
/// Lifetime of a cached "no data" result.
pub const EMPTY_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Date format used by both providers and by `DailyRecord::trade_date`.
pub const TRADE_DATE_FORMAT: &str = "%Y%m%d";

pub fn default_export_dir() -> PathBuf {
    if let Some(downloads) = dirs::download_dir() {
        downloads
    } else if let Some(home) = dirs::home_dir() {
        home
    } else {
        PathBuf::from(".")
    }
}
