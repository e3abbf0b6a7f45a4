use std::fmt;

use bytes::Bytes;

use crate::source::ByteSource;

/// Size classification of a response body.
///
/// Drives `Content-Length` handling in the head encoder:
/// - Known length: declared in the header block
/// - Unbounded: end-of-stream delimited, delimitation is the transport's concern
/// - Empty: declared as zero
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodySize {
    /// No body bytes at all
    Empty,
    /// Body with a known length in bytes
    Length(u64),
    /// Body delimited by the end of the underlying stream
    Unbounded,
}

impl BodySize {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodySize::Empty)
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, BodySize::Unbounded)
    }
}

/// A response body: in-memory bytes or an attached byte source.
///
/// The two modes are mutually exclusive by construction. A body built from
/// bytes can never grow a source, and a stream-backed body can never carry
/// direct content.
pub struct ResponseBody {
    kind: Kind,
}

pub(crate) enum Kind {
    /// in-memory content, written in a single pass
    Once(Option<Bytes>),

    /// content copied from an attached source until end-of-stream
    Stream(StreamBody),
}

/// The stream side of a [`ResponseBody`]: the source handle together with
/// the release policy applied after the copy.
pub(crate) struct StreamBody {
    pub(crate) source: Box<dyn ByteSource>,
    pub(crate) close_on_complete: bool,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { kind: Kind::Once(None) }
    }

    pub fn once(bytes: Bytes) -> Self {
        Self { kind: Kind::Once(Some(bytes)) }
    }

    /// Builds a body that copies `source` to the sink at dispatch time.
    ///
    /// When `close_on_complete` is true the source is released after the
    /// copy attempt, whether the copy succeeded or not.
    pub fn stream<S>(source: S, close_on_complete: bool) -> Self
    where
        S: ByteSource + 'static,
    {
        Self { kind: Kind::Stream(StreamBody { source: Box::new(source), close_on_complete }) }
    }

    pub fn size(&self) -> BodySize {
        match &self.kind {
            Kind::Once(None) => BodySize::Empty,
            Kind::Once(Some(bytes)) if bytes.is_empty() => BodySize::Empty,
            Kind::Once(Some(bytes)) => BodySize::Length(bytes.len() as u64),
            Kind::Stream(_) => BodySize::Unbounded,
        }
    }

    #[inline]
    pub fn is_stream(&self) -> bool {
        matches!(self.kind, Kind::Stream(_))
    }

    pub(crate) fn into_kind(self) -> Kind {
        self.kind
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Once(bytes) => f.debug_tuple("Once").field(&bytes.as_ref().map(Bytes::len)).finish(),
            Kind::Stream(stream) => {
                f.debug_struct("Stream").field("close_on_complete", &stream.close_on_complete).finish()
            }
        }
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        if value.is_empty() { Self::empty() } else { Self::once(Bytes::from(value)) }
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        if value.is_empty() { Self::empty() } else { Self::once(value.as_bytes().into()) }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<Option<Bytes>> for ResponseBody {
    fn from(option: Option<Bytes>) -> Self {
        match option {
            Some(bytes) => Self::once(bytes),
            None => Self::empty(),
        }
    }
}

impl From<()> for ResponseBody {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_once_body_size() {
        assert_eq!(ResponseBody::empty().size(), BodySize::Empty);
        assert_eq!(ResponseBody::from("").size(), BodySize::Empty);
        assert_eq!(ResponseBody::from("hello").size(), BodySize::Length(5));
        assert_eq!(ResponseBody::from(Some(Bytes::from_static(b"abc"))).size(), BodySize::Length(3));
        assert_eq!(ResponseBody::from(None).size(), BodySize::Empty);
        assert_eq!(ResponseBody::from(()).size(), BodySize::Empty);
    }

    #[test]
    fn test_stream_body_size_is_unbounded() {
        let body = ResponseBody::stream(MemorySource::new("0123456789"), true);

        assert!(body.is_stream());
        assert_eq!(body.size(), BodySize::Unbounded);
        assert!(body.size().is_unbounded());
    }

    #[test]
    fn test_once_body_is_not_stream() {
        assert!(!ResponseBody::from("hello").is_stream());
        assert!(!ResponseBody::empty().is_stream());
    }
}
