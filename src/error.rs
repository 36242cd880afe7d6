#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} HTTP {status}")]
    UpstreamStatus { provider: String, status: u16 },

    #[error("{provider} error {code}: {msg}")]
    Provider {
        provider: String,
        code: i64,
        msg: String,
    },

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("No data for {ts_code}: check the code and date range")]
    EmptyResult { ts_code: String },

    #[error("Missing parameters: {0}")]
    MissingParameters(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient data: only {available} records, fewer than N={requested}")]
    InsufficientData { available: usize, requested: usize },

    #[error("Empty price series: no record carries a valid close")]
    EmptyPriceSeries,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl SummaryError {
    /// HTTP status class for the failure: 400 for caller mistakes, 500 for
    /// upstream and configuration faults.
    pub fn http_status(&self) -> u16 {
        match self {
            SummaryError::MissingParameters(_)
            | SummaryError::InvalidArgument(_)
            | SummaryError::InsufficientData { .. } => 400,
            _ => 500,
        }
    }

    /// True for errors raised before any upstream call was made.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            SummaryError::MissingParameters(_) | SummaryError::InvalidArgument(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;
