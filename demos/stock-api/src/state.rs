/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The async SDK. Dispatches blocking provider calls to a thread pool and
    /// owns the response cache, so handlers never cache on their own.
    pub sdk: ashare_summary::AsyncStockSummarySdk,
}
