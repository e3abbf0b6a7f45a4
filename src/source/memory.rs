use std::fmt;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

use super::ByteSource;

/// An in-memory byte source with an observable open/released state.
///
/// Reading drains the contained bytes in order; once drained, reads return
/// end-of-stream. Releasing flips the shared [`SourceState`], after which
/// the source reports closed and further reads fail. Handy wherever a real
/// descriptor would be overkill, and the vehicle for asserting release
/// behavior in tests.
pub struct MemorySource {
    cursor: Cursor<Bytes>,
    state: Arc<SourceState>,
}

/// Shared view of a [`MemorySource`] lifecycle.
///
/// Obtained from [`MemorySource::state`] before the source is handed off,
/// so the release can be observed after the source itself is gone.
#[derive(Debug, Default)]
pub struct SourceState {
    released: AtomicBool,
}

impl SourceState {
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn mark_released(&self) {
        self.released.store(true, Ordering::Release);
    }
}

impl MemorySource {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self { cursor: Cursor::new(content.into()), state: Arc::new(SourceState::default()) }
    }

    /// Handle for observing the release state independently of the source.
    pub fn state(&self) -> Arc<SourceState> {
        Arc::clone(&self.state)
    }

    /// Number of bytes not yet read.
    pub fn remaining(&self) -> u64 {
        let consumed = self.cursor.position();
        self.cursor.get_ref().len() as u64 - consumed
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("remaining", &self.remaining())
            .field("released", &self.state.is_released())
            .finish()
    }
}

impl AsyncRead for MemorySource {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        if self.state.is_released() {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "source has been released")));
        }
        Pin::new(&mut self.cursor).poll_read(cx, buf)
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    fn is_open(&self) -> bool {
        !self.state.is_released()
    }

    async fn release(&mut self) -> io::Result<()> {
        self.state.mark_released();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_read_drains_content() {
        let mut source = MemorySource::new("0123456789");
        assert_eq!(source.remaining(), 10);

        let mut content = Vec::new();
        source.read_to_end(&mut content).await.unwrap();

        assert_eq!(&content[..], b"0123456789");
        assert_eq!(source.remaining(), 0);

        // drained but still open: further reads are a clean end-of-stream
        assert!(source.is_open());
        let mut rest = Vec::new();
        source.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_release_closes_the_source() {
        let mut source = MemorySource::new("abc");
        let state = source.state();
        assert!(!state.is_released());

        source.release().await.unwrap();

        assert!(state.is_released());
        assert!(!source.is_open());

        let mut rest = Vec::new();
        let err = source.read_to_end(&mut rest).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
