// HTTP response utilities with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_SVG: &str = "image/svg+xml";

/// Whether the client advertised Brotli support.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}

pub async fn brotli_compress(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    let cursor = std::io::Cursor::new(bytes);
    let mut encoder = BrotliEncoder::new(cursor);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Build a response, Brotli-compressing the body when `compress` is set.
pub async fn encoded_response(
    bytes: Vec<u8>,
    content_type: &'static str,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let original_len = bytes.len();
    let (body_bytes, content_encoding) = if compress {
        let compressed = brotli_compress(bytes).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::trace!("Compressed response {} -> {} bytes", original_len, compressed.len());
        (compressed, Some("br"))
    } else {
        (bytes, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()))
        .header(header::CACHE_CONTROL, "no-store");

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn json_response<T: Serialize>(
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let bytes = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    encoded_response(bytes, CONTENT_TYPE_JSON, compress).await
}
