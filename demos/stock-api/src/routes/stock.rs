use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use ashare_summary::api::{ApiResponse, StockQueryParams};
use ashare_summary::export;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stock?code=600519&mode=n&n=60&buy=1500&shares=100
///
/// Fetch, summarize and return the window as the JSON envelope. "No data" is
/// `ok: true` with empty `items` and a `null` summary.
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StockQueryParams>,
) -> Result<Response, AppError> {
    let request = params.into_request()?;
    let result = state.sdk.query(request).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "stock query failed");
    }
    let (status, body) = ApiResponse::from_result(&result);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok((status, Json(body)).into_response())
}

/// GET /api/stock.csv?code=600519&mode=range&start=20240101&end=20240630
///
/// Same parameters as `/api/stock`; returns the daily rows as a BOM-prefixed
/// CSV attachment.
pub async fn get_stock_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StockQueryParams>,
) -> Result<Response, AppError> {
    let request = params.into_request()?;
    let report = state.sdk.query(request).await?;
    let body = export::csv_bytes(&report.items)?;
    let disposition = format!(
        "attachment; filename=\"{}.csv\"",
        export::file_stem(&report)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/stock.xlsx?code=600519&n=60
///
/// Same parameters as `/api/stock`; returns a workbook with a `summary` and a
/// `daily` worksheet.
pub async fn get_stock_xlsx(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StockQueryParams>,
) -> Result<Response, AppError> {
    let request = params.into_request()?;
    let report = state.sdk.query(request).await?;
    let body = export::Workbook::from_report(&report).xlsx_bytes()?;
    let disposition = format!(
        "attachment; filename=\"{}.xlsx\"",
        export::file_stem(&report)
    );
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
