//! The readable byte-source capability.
//!
//! A response body is copied from a [`ByteSource`]: an externally owned
//! sequential byte stream supporting read-to-end, an open-state query and an
//! explicit release operation. The trait replaces a dynamic "resource"
//! handle with a capability any native stream type can satisfy, so files,
//! pipes, sockets and in-memory buffers all plug into the same dispatch
//! pipeline.
//!
//! Implementations are provided for the common tokio types. For byte streams
//! arriving as a `futures::Stream` of buffers, go through
//! [`tokio_util::io::StreamReader`], which is covered by a blanket
//! implementation here.

mod memory;
pub use memory::MemorySource;
pub use memory::SourceState;

use std::io;

use async_trait::async_trait;
use bytes::Buf;
use futures::Stream;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt, DuplexStream};
use tokio::net::tcp::OwnedReadHalf;
use tokio::process::ChildStdout;
use tokio_util::io::StreamReader;

/// A sequential byte source a response body can be copied from.
///
/// The source is read to end-of-stream exactly once during dispatch. It is
/// externally owned: the response only takes over the release when its
/// close-on-complete policy says so.
#[async_trait]
pub trait ByteSource: AsyncRead + Send + Unpin {
    /// Whether the source can still produce bytes.
    ///
    /// Checked once, at attachment time. Most OS-backed handles cannot
    /// report a closed state and keep the default.
    fn is_open(&self) -> bool {
        true
    }

    /// Releases the underlying resource.
    ///
    /// Performs whatever protocol-level shutdown the transport has; handing
    /// the descriptor back to the OS is the job of `Drop`. On the
    /// close-on-complete path the caller treats failures as best-effort:
    /// they are logged and never mask the copy outcome.
    async fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSource for File {}

impl ByteSource for ChildStdout {}

impl ByteSource for OwnedReadHalf {}

#[async_trait]
impl ByteSource for DuplexStream {
    async fn release(&mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

impl<S, B> ByteSource for StreamReader<S, B>
where
    S: Stream<Item = io::Result<B>> + Send + Unpin,
    B: Buf + Send + Unpin,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::io::AsyncReadExt;

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_stream_reader_source() {
        let chunks: Vec<io::Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
        let mut source = StreamReader::new(futures::stream::iter(chunks));

        assert!(source.is_open());

        let mut content = Vec::new();
        source.read_to_end(&mut content).await.unwrap();
        assert_eq!(&content[..], b"abcd");

        source.release().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_duplex_source_release_shuts_down() {
        let (mut near, far) = tokio::io::duplex(64);
        near.write_all(b"ping").await.unwrap();
        drop(near);

        let mut source: Box<dyn ByteSource> = Box::new(far);
        let mut content = Vec::new();
        source.read_to_end(&mut content).await.unwrap();
        assert_eq!(&content[..], b"ping");

        source.release().await.unwrap();
    }
}
