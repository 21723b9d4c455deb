//! wsldb backend messages.
use bytes::{Buf, Bytes, BytesMut};
use std::ops::ControlFlow;

use super::{DatumType, ProtocolDecode, ProtocolError};
use crate::{
    common::ByteStr,
    ext::{BufExt, FmtExt},
};

/// Tag byte plus the 4-byte length field.
const HEADER: usize = 5;

/// A type that can be decoded from a wsldb backend frame payload.
pub trait BackendProtocol: Sized {
    fn decode(tag: u8, body: Bytes) -> crate::Result<Self>;
}

/// Incremental framing for any backend message.
///
/// A frame is complete once `length + 1` bytes are buffered, where
/// `length` is read from bytes `[1..5]` and counts itself. The payload
/// is handed to [`BackendProtocol::decode`] without copying; the
/// residual stays in `buf` for the next frame.
impl<B: BackendProtocol> ProtocolDecode for B {
    fn decode(buf: &mut BytesMut) -> crate::Result<ControlFlow<Self, usize>> {
        let Some(mut header) = buf.get(..HEADER) else {
            return Ok(ControlFlow::Continue(HEADER));
        };

        let tag = header.get_u8();
        let len = header.get_u32_le() as usize;

        if len < 4 {
            return Err(super::protocol_err!(
                "frame length field is {len}, the 4 bytes of the field itself are the minimum",
            ).into());
        }

        if buf.len() < len + 1 {
            return Ok(ControlFlow::Continue(len + 1));
        }

        buf.advance(HEADER);
        let body = buf.split_to(len - 4).freeze();

        Ok(ControlFlow::Break(B::decode(tag, body)?))
    }
}

/// Any message the server sends within a query conversation.
#[derive(Debug)]
pub enum BackendMessage {
    RowDescription(RowDescription),
    DataRow(DataRow),
    CommandComplete(CommandComplete),
    ErrorResponse(ErrorResponse),
    ReadyForQuery(ReadyForQuery),
}

macro_rules! match_backend {
    ($($name:ident,)*) => {
        impl BackendMessage {
            pub fn tag(&self) -> u8 {
                match self {
                    $(Self::$name(_) => $name::TAG,)*
                }
            }
        }

        impl BackendProtocol for BackendMessage {
            fn decode(tag: u8, body: Bytes) -> crate::Result<Self> {
                let message = match tag {
                    $($name::TAG => Self::$name(<$name as BackendProtocol>::decode(tag, body)?),)*
                    _ => return Err(ProtocolError::unknown(tag).into()),
                };
                Ok(message)
            }
        }
    };
}

match_backend! {
    RowDescription,
    DataRow,
    CommandComplete,
    ErrorResponse,
    ReadyForQuery,
}

macro_rules! assert_tag {
    ($self:ident, $tag:ident) => {
        if $self::TAG != $tag {
            return Err(ProtocolError::unexpected(stringify!($self), $self::TAG, $tag).into());
        }
    };
}

/// One column of a row descriptor.
#[derive(Debug, Clone)]
pub struct ColumnDesc {
    /// Declared type of every cell in this column.
    pub datum: DatumType,
    /// Column name, a slice of the frame buffer.
    pub name: ByteStr,
}

/// Identifies the message as a row description.
///
/// Describes the shape of subsequent data rows until replaced by the
/// next descriptor or the end of the request.
#[derive(Debug)]
pub struct RowDescription {
    cols: Vec<ColumnDesc>,
}

impl RowDescription {
    pub const TAG: u8 = b'T';

    pub fn col_count(&self) -> usize {
        self.cols.len()
    }

    pub fn cols(&self) -> &[ColumnDesc] {
        &self.cols
    }

    pub(crate) fn into_cols(self) -> Vec<ColumnDesc> {
        self.cols
    }
}

impl BackendProtocol for RowDescription {
    fn decode(tag: u8, mut body: Bytes) -> crate::Result<Self> {
        assert_tag!(RowDescription, tag);

        // UInt32 the number of columns in a row
        let col_count = BufExt::try_get_u32_le(&mut body)?;

        let mut cols = Vec::with_capacity(col_count as usize);
        for _ in 0..col_count {
            // UInt32 the column type tag
            let datum = DatumType::from_code(BufExt::try_get_u32_le(&mut body)?)?;
            // UInt32 name length, then the name bytes
            let name = body.try_get_lp_str()?;
            cols.push(ColumnDesc { datum, name });
        }

        Ok(Self { cols })
    }
}

/// Identifies the message as a data row.
///
/// The payload cannot be decoded on its own: each cell is a null flag
/// followed by a bare value whose width only the active row descriptor
/// knows. It is kept raw here and consumed against the descriptor when
/// the row is appended to the result set in flight.
#[derive(Debug)]
pub struct DataRow {
    pub body: Bytes,
}

impl DataRow {
    pub const TAG: u8 = b'D';
}

impl BackendProtocol for DataRow {
    fn decode(tag: u8, body: Bytes) -> crate::Result<Self> {
        assert_tag!(DataRow, tag);
        Ok(Self { body })
    }
}

/// Identifies the message as a server error.
///
/// The payload is the error message text.
#[derive(thiserror::Error)]
#[error("server error: {}", self.body.lossy())]
pub struct ErrorResponse {
    body: Bytes,
}

impl ErrorResponse {
    pub const TAG: u8 = b'E';

    /// The error message text sent by the server.
    pub fn message(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl BackendProtocol for ErrorResponse {
    fn decode(tag: u8, body: Bytes) -> crate::Result<Self> {
        assert_tag!(ErrorResponse, tag);
        Ok(Self { body })
    }
}

impl std::fmt::Debug for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

macro_rules! unit_msg {
    ($(
        $(#[$doc:meta])* struct $name:ident, $tag:literal;
    )*) => {$(
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name;

        impl $name {
            pub const TAG: u8 = $tag;
        }

        impl BackendProtocol for $name {
            fn decode(tag: u8, _: Bytes) -> crate::Result<Self> {
                assert_tag!($name, tag);
                Ok(Self)
            }
        }
    )*};
}

unit_msg! {
    /// Identifies the message as a statement-completed response.
    ///
    /// The server emits one per statement in the request batch;
    /// the payload is ignored.
    struct CommandComplete, b'C';

    /// Identifies the message as the request terminator.
    ///
    /// Sent once the whole request batch has been processed and the
    /// server is ready for the next query.
    struct ReadyForQuery, b'Z';
}
