//! Extension traits for buffer codec operations.
//!
//! Everything on the wsldb wire is little-endian, and variable-width
//! values (text, bytea) are length-prefixed with a `u32`. The read side
//! is checked: a buffer shorter than the value requested is a
//! [`DecodeError`], never a panic.
use bytes::{Buf, BufMut, Bytes};

use crate::{common::ByteStr, protocol::DecodeError};

/// Checked reads over [`Bytes`] with cursor advancement.
pub(crate) trait BufExt {
    /// Read a single byte.
    fn try_get_u8(&mut self) -> Result<u8, DecodeError>;

    /// Read an unsigned 32-bit little-endian integer.
    fn try_get_u32_le(&mut self) -> Result<u32, DecodeError>;

    /// Read a signed 64-bit little-endian integer.
    fn try_get_i64_le(&mut self) -> Result<i64, DecodeError>;

    /// Read a 32-bit IEEE-754 little-endian float.
    fn try_get_f32_le(&mut self) -> Result<f32, DecodeError>;

    /// Read a length-prefixed byte string without copying.
    fn try_get_lp_bytes(&mut self) -> Result<Bytes, DecodeError>;

    /// Read a length-prefixed utf8 string without copying.
    ///
    /// There is no trailing terminator on the wire.
    fn try_get_lp_str(&mut self) -> Result<ByteStr, DecodeError>;
}

macro_rules! check_remaining {
    ($buf:ident, $n:expr) => {
        if $buf.remaining() < $n {
            return Err(DecodeError::UnexpectedEnd {
                expected: $n,
                remaining: $buf.remaining(),
            });
        }
    };
}

impl BufExt for Bytes {
    fn try_get_u8(&mut self) -> Result<u8, DecodeError> {
        check_remaining!(self, 1);
        Ok(self.get_u8())
    }

    fn try_get_u32_le(&mut self) -> Result<u32, DecodeError> {
        check_remaining!(self, 4);
        Ok(self.get_u32_le())
    }

    fn try_get_i64_le(&mut self) -> Result<i64, DecodeError> {
        check_remaining!(self, 8);
        Ok(self.get_i64_le())
    }

    fn try_get_f32_le(&mut self) -> Result<f32, DecodeError> {
        check_remaining!(self, 4);
        Ok(self.get_f32_le())
    }

    fn try_get_lp_bytes(&mut self) -> Result<Bytes, DecodeError> {
        let len = BufExt::try_get_u32_le(self)? as usize;
        check_remaining!(self, len);
        Ok(self.split_to(len))
    }

    fn try_get_lp_str(&mut self) -> Result<ByteStr, DecodeError> {
        Ok(ByteStr::from_utf8(self.try_get_lp_bytes()?)?)
    }
}

/// Length is `usize` in rust, while the wire wants `u32`,
/// this will panic when overflow instead of wrapping.
pub(crate) trait UsizeExt {
    fn to_u32(self) -> u32;
}

impl UsizeExt for usize {
    fn to_u32(self) -> u32 {
        match u32::try_from(self) {
            Ok(ok) => ok,
            Err(err) => panic!("message size too large for protocol: {err}"),
        }
    }
}

/// Length-prefixed string operation in [`BufMut`].
pub(crate) trait BufMutExt {
    /// Write a `u32` length prefix followed by the bytes.
    fn put_lp_slice(&mut self, slice: &[u8]);
}

impl<B: BufMut> BufMutExt for B {
    fn put_lp_slice(&mut self, slice: &[u8]) {
        self.put_u32_le(slice.len().to_u32());
        self.put_slice(slice);
    }
}

/// Helper trait to [`Display`][std::fmt::Display] bytes.
pub(crate) trait FmtExt {
    /// Lossy [`Display`][std::fmt::Display] bytes.
    fn lossy(&self) -> LossyFmt<'_>;
}

/// Lossy [`Display`][std::fmt::Display] implementation for bytes.
pub(crate) struct LossyFmt<'a>(pub &'a [u8]);

impl FmtExt for [u8] {
    fn lossy(&self) -> LossyFmt<'_> {
        LossyFmt(self)
    }
}

impl std::fmt::Display for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in self.0 {
            if b.is_ascii_graphic() || b.is_ascii_whitespace() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:x}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b\"{self}\"")
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, Bytes, BytesMut};

    use super::{BufExt, BufMutExt};
    use crate::protocol::DecodeError;

    #[test]
    fn fixed_width_reads_advance_cursor() {
        let mut buf = BytesMut::new();
        buf.put_i64_le(-7);
        buf.put_f32_le(2.5);
        buf.put_u8(1);
        let mut buf = buf.freeze();

        assert_eq!(buf.try_get_i64_le().unwrap(), -7);
        assert_eq!(buf.try_get_f32_le().unwrap(), 2.5);
        assert_eq!(buf.try_get_u8().unwrap(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn truncated_read_is_an_error_not_a_panic() {
        let mut buf = Bytes::from_static(&[1, 2, 3]);
        let err = buf.try_get_i64_le().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedEnd { expected: 8, remaining: 3 },
        ));
        // the failed read must not consume anything
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn length_prefixed_string_round_trip() {
        let mut buf = BytesMut::new();
        buf.put_lp_slice("hello, wsldb".as_bytes());
        let mut buf = buf.freeze();

        let s = buf.try_get_lp_str().unwrap();
        assert_eq!(s, "hello, wsldb");
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_string_is_a_value() {
        let mut buf = BytesMut::new();
        buf.put_lp_slice(b"");
        let mut buf = buf.freeze();

        assert_eq!(buf.try_get_lp_str().unwrap(), "");
    }

    #[test]
    fn length_prefix_beyond_buffer_is_an_error() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(10);
        buf.put_slice(b"abc");
        let mut buf = buf.freeze();

        assert!(matches!(
            buf.try_get_lp_bytes().unwrap_err(),
            DecodeError::UnexpectedEnd { expected: 10, remaining: 3 },
        ));
    }

    #[test]
    fn non_utf8_text_is_an_error() {
        let mut buf = BytesMut::new();
        buf.put_lp_slice(&[0xff, 0xfe]);
        let mut buf = buf.freeze();

        assert!(matches!(
            buf.try_get_lp_str().unwrap_err(),
            DecodeError::NonUtf8(_),
        ));
    }
}
