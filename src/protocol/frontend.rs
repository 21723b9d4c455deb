//! wsldb frontend messages.
use bytes::{BufMut, BytesMut};

use super::{ProtocolEncode, ProtocolError};

/// Write the message length over the first 4 bytes of `buf`.
///
/// The length field counts itself plus the payload that follows it,
/// which is `buf.len()` when `buf` starts at the reserved 4 bytes.
fn write_msg_len(mut buf: &mut [u8]) -> Result<(), ProtocolError> {
    let size = buf.len();
    let Ok(size) = u32::try_from(size) else {
        return Err(super::protocol_err!("message size out of range for protocol: {size}"));
    };

    buf.put_u32_le(size);

    Ok(())
}

/// Identifies the message as a simple query.
///
/// The query text may hold multiple semicolon delimited statements;
/// the server replies with one `C` frame per statement and a single
/// terminating `Z` frame.
#[derive(Debug)]
pub struct Query<'a> {
    /// The query string itself, no terminator.
    query: &'a str,
}

impl<'a> Query<'a> {
    pub fn new(query: &'a str) -> Self {
        Self { query }
    }

    pub const TAG: u8 = b'Q';
}

impl ProtocolEncode for Query<'_> {
    fn encode(self, buf: &mut BytesMut) -> Result<(), ProtocolError> {
        let offset = buf.len();

        // Byte1('Q') identifies the message as a simple query
        buf.put_u8(Self::TAG);

        // UInt32 length of message contents in bytes, including self.
        // reserve 4 bytes for length
        buf.put_u32_le(0);

        // the utf8 query string, no terminator
        buf.put(self.query.as_bytes());

        // write the length, excluding the tag
        write_msg_len(&mut buf[offset + 1..])
    }
}
