use axum::body::{Body, Bytes};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::domain::conversion::DeferredCleanup;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A body stream that keeps a [`DeferredCleanup`] alive until the stream
/// itself is dropped.
///
/// hyper drops the body once the last frame has been written (or the
/// connection is gone), so the guarded directory outlives the transfer.
pub struct GuardedStream {
    inner: BoxStream<'static, std::io::Result<Bytes>>,
    _cleanup: DeferredCleanup,
}

impl GuardedStream {
    pub fn new(
        inner: BoxStream<'static, std::io::Result<Bytes>>,
        cleanup: DeferredCleanup,
    ) -> Self {
        Self {
            inner,
            _cleanup: cleanup,
        }
    }
}

impl Stream for GuardedStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Read `file` in fixed-size chunks
pub fn file_stream(file: File) -> BoxStream<'static, std::io::Result<Bytes>> {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    })
    .boxed()
}

/// Response body streaming `file`, running `cleanup` after the body is released
pub fn file_body_with_cleanup(file: File, cleanup: DeferredCleanup) -> Body {
    Body::from_stream(GuardedStream::new(file_stream(file), cleanup))
}
