mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use ashare_summary::async_client::AsyncStockSummarySdkBuilder;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // TuShare when TUSHARE_TOKEN is set, Eastmoney otherwise.
    let sdk = AsyncStockSummarySdkBuilder::from_env()
        .build()
        .await
        .expect("Failed to initialize SDK");
    tracing::info!(provider = sdk.inner().provider_name(), "SDK ready");

    let state = Arc::new(AppState { sdk });

    let app = Router::new()
        .route("/api/health", get(routes::health::get_health))
        .route("/api/stock", get(routes::stock::get_stock))
        .route("/api/stock.csv", get(routes::stock::get_stock_csv))
        .route("/api/stock.xlsx", get(routes::stock::get_stock_xlsx))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
