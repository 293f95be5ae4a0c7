// Chunked snapshot streaming utilities
use crate::domain::dashboard::DashboardSnapshot;
use crate::infrastructure::http_response::{CONTENT_TYPE_JSON, brotli_compress};
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Stream every published snapshot as a length-prefixed JSON chunk.
pub fn chunked_snapshot_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Arc<DashboardSnapshot>> + Send + 'static,
{
    let byte_stream = stream.then(move |snapshot| async move { serialize_chunk(&snapshot, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually; Content-Encoding would make clients
    // try to decompress the framing as well.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header("X-Chunk-Content-Type", CONTENT_TYPE_JSON)
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one snapshot into `[u32 big-endian length][payload]`.
pub async fn serialize_chunk(snapshot: &DashboardSnapshot, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(snapshot).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current snapshot followed by every later one.
pub fn stream_from_watch(
    rx: watch::Receiver<Arc<DashboardSnapshot>>,
    compress: bool,
) -> impl IntoResponse {
    let mut snapshots = WatchStream::new(rx);
    let stream = async_stream::stream! {
        while let Some(snapshot) = snapshots.next().await {
            yield snapshot;
        }
    };

    match chunked_snapshot_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
