//! Wire serialization for the response head.
//!
//! The body of a streamed response is copied verbatim and needs no encoding;
//! the head is the only part of the response with a wire format of its own.

mod head_encoder;
pub use head_encoder::HeadEncoder;
