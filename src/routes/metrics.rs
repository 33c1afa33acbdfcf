use axum::http::StatusCode;
use prometheus::{Encoder, TextEncoder};

/// Text exposition of every registered collector.
pub async fn metrics_handler() -> Result<String, StatusCode> {
    let mut body = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(body).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
