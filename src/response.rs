//! The stream-backed response component.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio::io::AsyncWrite;
use tracing::trace;

use crate::ensure;
use crate::protocol::{BodySize, ResponseError, ResponseHead};
use crate::sink::{ResponseWriter, copy_to_end, release_source};
use crate::source::ByteSource;

/// A response whose body is copied from an attached [`ByteSource`].
///
/// The body is defined exclusively by the source: direct byte content cannot
/// be set, and [`content`](Self::content) always reports that no in-memory
/// content exists. Transmission is single-shot — the first
/// [`send_body`](Self::send_body) copies the source to the sink and flips a
/// one-way latch; later calls are no-ops.
///
/// # Source ownership
///
/// The source is externally owned. With the default close-on-complete
/// policy the response takes over the release and performs it after the copy
/// attempt, success or failure. With the policy disabled the source stays
/// attached after the send and can be reclaimed through
/// [`take_source`](Self::take_source).
///
/// # Replaying a failed send
///
/// Dispatching with no source attached fails before any byte is copied and
/// does not consume the send: attaching a source afterwards and sending
/// again succeeds. Every other failure happens after the latch is set and
/// permanently consumes the one allowed transmission, because the source may
/// already be partially drained.
pub struct StreamResponse {
    status: StatusCode,
    headers: HeaderMap,
    source: Option<Box<dyn ByteSource>>,
    close_on_complete: bool,
    sent: bool,
}

impl StreamResponse {
    /// Builds a response around `source` with status 200 and no headers.
    ///
    /// The source is validated immediately; a closed source is rejected with
    /// [`ResponseError::InvalidSource`].
    pub fn new<S>(source: S) -> Result<Self, ResponseError>
    where
        S: ByteSource + 'static,
    {
        let mut response = Self::unattached();
        response.attach(source)?;
        Ok(response)
    }

    pub fn builder() -> StreamResponseBuilder {
        StreamResponseBuilder::new()
    }

    fn unattached() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            source: None,
            close_on_complete: true,
            sent: false,
        }
    }

    /// Attaches `source` as the response body, replacing any previously
    /// attached source.
    ///
    /// Validation happens here, not at send time: a source whose
    /// [`is_open`](ByteSource::is_open) reports false is rejected and the
    /// previous attachment stays in place. The replaced source is handed
    /// back untouched — releasing it is the caller's concern.
    pub fn attach<S>(&mut self, source: S) -> Result<Option<Box<dyn ByteSource>>, ResponseError>
    where
        S: ByteSource + 'static,
    {
        ensure!(source.is_open(), ResponseError::invalid_source("source is not open for reading"));
        Ok(self.source.replace(Box::new(source)))
    }

    /// Sets whether the source is released after the copy attempt.
    pub fn close_on_complete(&mut self, close: bool) -> &mut Self {
        self.close_on_complete = close;
        self
    }

    /// Rejects direct content: the body of this response is defined by the
    /// attached source alone.
    ///
    /// Passing `None` is a harmless no-op, kept so the type can stand in
    /// wherever the generic response shape is expected.
    pub fn set_content(&mut self, content: Option<Bytes>) -> Result<(), ResponseError> {
        ensure!(content.is_none(), ResponseError::ContentNotSupported);
        Ok(())
    }

    /// Always `None`: content must be retrieved by consuming the stream,
    /// not by reading a buffer.
    pub fn content(&self) -> Option<&Bytes> {
        None
    }

    /// Detaches and returns the source, if one is still attached.
    pub fn take_source(&mut self) -> Option<Box<dyn ByteSource>> {
        self.source.take()
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Whether the one allowed transmission has been consumed.
    #[inline]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    fn head(&self) -> ResponseHead {
        let mut head = ResponseHead::new(());
        *head.status_mut() = self.status;
        *head.headers_mut() = self.headers.clone();
        head
    }

    /// Dispatches the full response: head through the writer's encoder, then
    /// the body copy. Returns the number of body bytes written.
    ///
    /// A response that has already been sent writes nothing and returns
    /// `Ok(0)`.
    pub async fn send<W>(&mut self, writer: &mut ResponseWriter<W>) -> Result<u64, ResponseError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.sent {
            return Ok(0);
        }

        writer.write_head(self.head(), BodySize::Unbounded)?;
        writer.flush().await?;
        self.send_body(writer.get_mut()).await
    }

    /// Copies the source's remaining bytes to `sink`, exactly once.
    ///
    /// The latch is set before the first byte is copied, so a copy that
    /// fails midway still consumes the send. The missing-source check
    /// precedes the latch: failing before any I/O leaves the send
    /// replayable. When close-on-complete is set, the source is released
    /// after the copy attempt regardless of the copy outcome.
    pub async fn send_body<W>(&mut self, sink: &mut W) -> Result<u64, ResponseError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.sent {
            trace!("body already sent, skipping");
            return Ok(0);
        }

        let Some(mut source) = self.source.take() else {
            return Err(ResponseError::MissingSource);
        };

        self.sent = true;

        let copied = copy_to_end(&mut source, sink).await;

        if self.close_on_complete {
            release_source(source.as_mut()).await;
        } else {
            self.source = Some(source);
        }

        Ok(copied?)
    }
}

impl fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("source", &self.source.is_some())
            .field("close_on_complete", &self.close_on_complete)
            .field("sent", &self.sent)
            .finish()
    }
}

/// Builder for [`StreamResponse`].
///
/// Source validation is deferred to [`build`](Self::build), which attaches
/// the configured source the same way [`StreamResponse::attach`] does.
pub struct StreamResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    close_on_complete: bool,
    source: Option<Box<dyn ByteSource>>,
}

impl StreamResponseBuilder {
    fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), close_on_complete: true, source: None }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn close_on_complete(mut self, close: bool) -> Self {
        self.close_on_complete = close;
        self
    }

    pub fn source<S>(mut self, source: S) -> Self
    where
        S: ByteSource + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Builds the response, validating the configured source if any.
    ///
    /// A builder without a source yields an unattached response: dispatching
    /// it fails with [`ResponseError::MissingSource`] until a source is
    /// attached.
    pub fn build(self) -> Result<StreamResponse, ResponseError> {
        if let Some(source) = &self.source {
            ensure!(source.is_open(), ResponseError::invalid_source("source is not open for reading"));
        }

        let mut response = StreamResponse::unattached();
        response.status = self.status;
        response.headers = self.headers;
        response.close_on_complete = self.close_on_complete;
        response.source = self.source;
        Ok(response)
    }
}

impl fmt::Debug for StreamResponseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResponseBuilder")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("close_on_complete", &self.close_on_complete)
            .field("source", &self.source.is_some())
            .finish()
    }
}
