//! Response head encoder.
//!
//! Serializes the status line and header block of a response into raw bytes
//! and manages the `Content-Length` header according to the body size
//! classification. Bodies copied from a byte source are end-of-stream
//! delimited and declare nothing; framing them is the transport's concern.

use std::io;
use std::io::ErrorKind;

use bytes::{BufMut, BytesMut};
use http::{HeaderValue, Version, header};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{BodySize, ResponseError, ResponseHead};

/// Initial buffer space reserved for head serialization
const INIT_HEAD_SIZE: usize = 4 * 1024;

/// Encoder for response heads implementing the [`Encoder`] trait.
///
/// Serializes a [`ResponseHead`] plus [`BodySize`] into the HTTP/1.1 status
/// line, the header block and the terminating blank line. Only HTTP/1.1 is
/// supported; any other version is rejected.
#[derive(Debug, Default)]
pub struct HeadEncoder;

impl Encoder<(ResponseHead, BodySize)> for HeadEncoder {
    type Error = ResponseError;

    fn encode(&mut self, item: (ResponseHead, BodySize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, body_size) = item;

        dst.reserve(INIT_HEAD_SIZE);
        match head.version() {
            Version::HTTP_11 => {
                dst.put_slice(b"HTTP/1.1 ");
                dst.put_slice(head.status().as_str().as_bytes());
                dst.put_slice(b" ");
                dst.put_slice(head.status().canonical_reason().unwrap_or("").as_bytes());
                dst.put_slice(b"\r\n");
            }
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        }

        // Declare the body length when it is known; a caller-supplied value
        // is overwritten so the head never contradicts the body
        match body_size {
            BodySize::Length(n) => match head.headers_mut().get_mut(header::CONTENT_LENGTH) {
                Some(value) => *value = n.into(),
                None => {
                    head.headers_mut().insert(header::CONTENT_LENGTH, n.into());
                }
            },
            BodySize::Empty => match head.headers_mut().get_mut(header::CONTENT_LENGTH) {
                Some(value) => *value = 0.into(),
                None => {
                    const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");
                    head.headers_mut().insert(header::CONTENT_LENGTH, ZERO_VALUE);
                }
            },
            BodySize::Unbounded => {}
        }

        for (header_name, header_value) in head.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
