//! The buffered dispatch pipeline.
//!
//! [`ResponseWriter`] wraps an output sink and drives the two halves of a
//! dispatch: the encoded head goes through an internal buffer, the body is
//! written straight to the sink. [`ResponseWriter::send`] runs the generic
//! pipeline for any `http::Response<ResponseBody>`; stream-backed responses
//! plug into the same writer through
//! [`StreamResponse::send`](crate::StreamResponse::send).

use bytes::BytesMut;
use http::Response;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::codec::HeadEncoder;
use crate::protocol::body::Kind;
use crate::protocol::{BodySize, ResponseBody, ResponseError, ResponseHead};
use crate::source::ByteSource;

/// Initial capacity of the head buffer
const INIT_BUFFER_SIZE: usize = 8 * 1024;

/// Scratch buffer size for the body copy
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// A buffered writer for dispatching responses over an output sink.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: HeadEncoder,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, INIT_BUFFER_SIZE)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: HeadEncoder }
    }

    /// The raw sink, for writing body bytes after the head is flushed.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes the head into the internal buffer. Nothing reaches the sink
    /// until [`flush`](Self::flush).
    pub fn write_head(&mut self, head: ResponseHead, body_size: BodySize) -> Result<(), ResponseError> {
        self.encoder.encode((head, body_size), &mut self.buffer)
    }

    /// Drains the internal buffer to the sink and flushes it.
    pub async fn flush(&mut self) -> Result<(), ResponseError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(self.writer.flush().await?)
    }

    /// Dispatches a complete response: head first, then the body according
    /// to its mode. Returns the number of body bytes written.
    pub async fn send(&mut self, response: Response<ResponseBody>) -> Result<u64, ResponseError> {
        let (parts, body) = response.into_parts();
        let body_size = body.size();

        self.write_head(ResponseHead::from_parts(parts, ()), body_size)?;
        self.flush().await?;

        match body.into_kind() {
            Kind::Once(None) => Ok(0),
            Kind::Once(Some(bytes)) => {
                self.writer.write_all(bytes.as_ref()).await?;
                self.writer.flush().await?;
                Ok(bytes.len() as u64)
            }
            Kind::Stream(mut stream) => {
                let copied = copy_to_end(&mut stream.source, &mut self.writer).await;
                if stream.close_on_complete {
                    release_source(stream.source.as_mut()).await;
                }
                Ok(copied?)
            }
        }
    }
}

/// Copies all remaining bytes from `source` to `sink`, verbatim and in
/// order, until end-of-stream. Returns the number of bytes copied.
pub(crate) async fn copy_to_end<S, W>(source: &mut S, sink: &mut W) -> std::io::Result<u64>
where
    S: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::with_capacity(COPY_BUFFER_SIZE);
    let mut copied = 0u64;

    loop {
        buffer.clear();
        let n = source.read_buf(&mut buffer).await?;
        if n == 0 {
            break;
        }

        sink.write_all(buffer.as_ref()).await?;
        copied += n as u64;
        trace!(bytes = n, "copied source chunk");
    }

    sink.flush().await?;
    Ok(copied)
}

/// Best-effort release: a failure here must never mask the copy outcome.
pub(crate) async fn release_source<S>(source: &mut S)
where
    S: ByteSource + ?Sized,
{
    if let Err(e) = source.release().await {
        warn!(cause = %e, "failed to release body source");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use http::{HeaderValue, StatusCode, header};

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_send_once_body() {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(ResponseBody::from("hello"))
            .unwrap();

        let mut writer = ResponseWriter::new(Vec::new());
        let written = writer.send(response).await.unwrap();
        assert_eq!(written, 5);

        let wire = writer.into_inner();
        let expected = "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 5\r\n\r\nhello";
        assert_eq!(&wire[..], expected.as_bytes());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_send_empty_body() {
        let response = Response::builder().status(StatusCode::NO_CONTENT).body(ResponseBody::empty()).unwrap();

        let mut writer = ResponseWriter::new(Vec::new());
        let written = writer.send(response).await.unwrap();
        assert_eq!(written, 0);

        let wire = writer.into_inner();
        let expected = "HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n";
        assert_eq!(&wire[..], expected.as_bytes());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_send_stream_body_releases_source() {
        let source = MemorySource::new("0123456789");
        let state = source.state();

        let response = Response::builder().status(StatusCode::OK).body(ResponseBody::stream(source, true)).unwrap();

        let mut writer = ResponseWriter::new(Vec::new());
        let written = writer.send(response).await.unwrap();
        assert_eq!(written, 10);

        let wire = writer.into_inner();
        let expected = "HTTP/1.1 200 OK\r\n\r\n0123456789";
        assert_eq!(&wire[..], expected.as_bytes());
        assert!(state.is_released());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_write_head_buffers_until_flush() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_head(ResponseHead::new(()), BodySize::Unbounded).unwrap();

        assert!(writer.get_mut().is_empty());

        writer.flush().await.unwrap();
        assert_eq!(&writer.into_inner()[..], b"HTTP/1.1 200 OK\r\n\r\n");
    }
}
