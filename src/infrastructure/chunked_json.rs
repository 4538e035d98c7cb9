// Chunked JSON streaming utilities
use crate::domain::dashboard::DashboardSnapshot;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub const FRAMED_JSON_CONTENT_TYPE: &str = "application/x-sensor-frames";

/// Create a chunked response where every item becomes one length-prefixed frame.
pub async fn chunked_json_stream<S, T>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    // Serialize before the first await so the future owns bytes, not `&T`.
    let byte_stream = stream.then(move |item| {
        let json = serde_json::to_vec(&item).map_err(std::io::Error::other);
        async move {
            match json {
                Ok(json) => build_frame(json, compress).await,
                Err(e) => Err(e),
            }
        }
    });

    let body = Body::from_stream(byte_stream);

    // Frames are compressed individually, so no Content-Encoding here.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, FRAMED_JSON_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Wrap serialized JSON in a frame: 4-byte big-endian length, then the payload.
pub async fn build_frame(json: Vec<u8>, compress: bool) -> Result<Bytes, std::io::Error> {
    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);

    Ok(frame.freeze())
}

/// Stream the current snapshot, then one frame per published change.
pub async fn stream_from_watch(
    rx: watch::Receiver<DashboardSnapshot>,
    compress: bool,
) -> impl IntoResponse {
    let mut snapshots = WatchStream::new(rx);
    let stream = async_stream::stream! {
        while let Some(snapshot) = snapshots.next().await {
            tracing::trace!("Streaming snapshot ({:?})", snapshot.status);
            yield snapshot;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
