//! Core response abstractions.
//!
//! This module provides the building blocks the dispatch pipeline operates
//! on:
//!
//! - **Head** ([`ResponseHead`]): status code and header map, represented by
//!   the standard `http::Response` type with an empty body placeholder.
//!
//! - **Body** ([`ResponseBody`]): the body-mode variant. A response body is
//!   *either* in-memory bytes ([`ResponseBody::once`]) *or* an attached byte
//!   source ([`ResponseBody::stream`]), never both. Modeling the two modes
//!   as an enum makes the mixed state unrepresentable instead of guarding it
//!   at runtime.
//!
//! - **Errors** ([`ResponseError`]): the error taxonomy covering source
//!   attachment, state misuse and transmission I/O.

pub(crate) mod body;
pub use body::BodySize;
pub use body::ResponseBody;

mod error;
pub use error::ResponseError;

use http::Response;

/// Type alias for the header portion of a response.
///
/// The status line and header block are serialized from this value by
/// [`crate::codec::HeadEncoder`]; the body travels separately through the
/// dispatch pipeline.
pub type ResponseHead = Response<()>;
