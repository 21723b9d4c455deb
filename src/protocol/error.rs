use crate::common::BoxError;

/// An error when translating a frame buffer.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ProtocolError {
    source: BoxError,
}

impl ProtocolError {
    /// Create new [`ProtocolError`].
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self { source: source.into() }
    }

    /// Frame tag is not one of `T`, `D`, `C`, `E`, `Z`.
    pub(crate) fn unknown(tag: u8) -> Self {
        Self::new(crate::common::general!(
            "unknown frame tag: {:?}",
            char::from(tag),
        ))
    }

    /// Frame tag differs from the message being decoded.
    pub(crate) fn unexpected(name: &str, expect: u8, found: u8) -> Self {
        Self::new(crate::common::general!(
            "expected {name} frame ({:?}), found {:?}",
            char::from(expect),
            char::from(found),
        ))
    }
}

macro_rules! protocol_err {
    ($($tt:tt)*) => {
        crate::protocol::ProtocolError::new(crate::common::general!($($tt)*))
    };
}

pub(crate) use protocol_err;

/// An error when reading a value out of a byte buffer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Buffer is shorter than the value requires.
    #[error("buffer ended with {remaining} bytes left, {expected} required")]
    UnexpectedEnd {
        expected: usize,
        remaining: usize,
    },
    /// Type tag is not one of the wire datum types.
    #[error("unknown datum type tag: {0}")]
    UnknownDatumType(u32),
    /// Text payload is not valid utf8.
    #[error("non utf8 text: {0}")]
    NonUtf8(#[from] std::str::Utf8Error),
}
