//! The wsldb wire protocol.
//!
//! A frame is one message on the wire: a single ascii tag byte, a `u32`
//! little-endian length, then the payload. The length counts its own four
//! bytes plus the payload, so a complete frame occupies `length + 1` bytes
//! and the payload is `length - 4` bytes. Both sides of the codec treat
//! `length = payload + 4` as the invariant.
use bytes::BytesMut;
use std::ops::ControlFlow;

pub mod backend;
pub mod frontend;

mod datum;
mod error;

pub use datum::DatumType;
pub use error::{DecodeError, ProtocolError};

pub(crate) use error::protocol_err;

/// Buffered protocol encoding.
///
/// The message should write itself into the provided `buf`.
pub trait ProtocolEncode {
    fn encode(self, buf: &mut BytesMut) -> Result<(), ProtocolError>;
}

/// Buffered protocol decoding.
///
/// If decode returns [`ControlFlow::Continue`], the buffer does not yet
/// hold one complete frame; the caller must read from the transport until
/// at least the *total length* in `Continue` is buffered, then call again.
/// In that case the given `BytesMut` is not modified in any way, so more
/// reads append without shuffling byte order.
///
/// If decode returns [`ControlFlow::Break`], exactly one frame has been
/// split off the buffer and the leftover bytes are the next frame's.
pub trait ProtocolDecode: Sized {
    fn decode(buf: &mut BytesMut) -> crate::Result<ControlFlow<Self, usize>>;
}

#[cfg(test)]
mod tests;
