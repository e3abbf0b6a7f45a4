//! Streaming HTTP responses copied from external byte sources
//!
//! This crate provides a response abstraction whose body is not an in-memory
//! buffer but an externally supplied readable resource: an open file, a pipe,
//! a duplex channel, a child process stdout, or any other sequential byte
//! source. At dispatch time the body is copied verbatim from the source to
//! the output sink, exactly once.
//!
//! # Features
//!
//! - Body bytes are streamed, never buffered whole in memory
//! - One-shot transmission guarded by a sent latch: re-dispatch is a no-op
//! - Deterministic resource cleanup via a close-on-complete policy
//! - A capability trait ([`source::ByteSource`]) satisfied by the common
//!   tokio stream types out of the box
//! - Response head serialization through a [`tokio_util::codec::Encoder`]
//! - Clean error handling
//!
//! # Example
//!
//! ```no_run
//! use std::error::Error;
//! use http::{header, HeaderValue};
//! use stream_response::{ResponseWriter, StreamResponse};
//! use tokio::fs::File;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = listener.accept().await?;
//!
//!         tokio::spawn(async move {
//!             let file = File::open("large-report.csv").await.expect("open source file");
//!
//!             let mut response = StreamResponse::builder()
//!                 .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
//!                 .source(file)
//!                 .build()
//!                 .expect("attach source file");
//!
//!             let mut writer = ResponseWriter::new(tcp_stream);
//!             if let Err(e) = response.send(&mut writer).await {
//!                 eprintln!("send response error: {e}");
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`source`]: The readable byte-source capability and its implementations
//! - [`protocol`]: Response head, body and error types
//! - [`codec`]: Response head serialization
//! - [`sink`]: The buffered dispatch pipeline driving head-then-body writes
//!
//! The core component, [`StreamResponse`], ties these together: it owns the
//! status code, the header map, the attached source and the release policy,
//! and performs the single-shot body copy.
//!
//! # Sending semantics
//!
//! A [`StreamResponse`] transmits its body at most once. The latch is set
//! immediately before the first byte is copied, so a copy that fails midway
//! still consumes the send: the source may have been partially drained and a
//! blind retry would corrupt the output. The one failure that does *not*
//! consume the send is dispatching with no source attached, which happens
//! strictly before any I/O; attaching a source afterwards and sending again
//! succeeds.
//!
//! # Limitations
//!
//! - HTTP/1.1 head serialization only
//! - Streamed bodies are end-of-stream delimited; chunked transfer encoding
//!   is the hosting framework's concern
//! - No request parsing, routing or connection keep-alive: this crate is the
//!   response side of a pipeline, not a server

pub mod codec;
pub mod protocol;
pub mod sink;
pub mod source;

mod response;
mod utils;

pub(crate) use utils::ensure;

pub use protocol::{BodySize, ResponseBody, ResponseError, ResponseHead};
pub use response::StreamResponse;
pub use response::StreamResponseBuilder;
pub use sink::ResponseWriter;
