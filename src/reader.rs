//! Buffered result sets.
//!
//! - [`Reader`]
//! - [`Datum`]
//! - [`ReadError`]
//!
//! A [`Reader`] holds one result set in a compact self-describing buffer:
//! for each cell, a `u32` little-endian type tag followed by the payload
//! bytes for that tag (`Null` is tag only). Cells appear row-major, all
//! columns of row 0, then all of row 1, and so on. A positional cursor
//! walks the buffer forward; every typed read is checked against the tag
//! the cursor sits on.
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    common::ByteStr,
    ext::{BufExt, BufMutExt},
    protocol::{
        DatumType, DecodeError,
        backend::{ColumnDesc, RowDescription},
    },
};

/// One decoded cell: a type tag plus (optionally) a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int8(i64),
    Float4(f32),
    Text(ByteStr),
    Bool(bool),
    Null,
    Bytea(Bytes),
}

impl Datum {
    /// The type tag of this cell.
    pub const fn datum_type(&self) -> DatumType {
        match self {
            Self::Int8(_) => DatumType::Int8,
            Self::Float4(_) => DatumType::Float4,
            Self::Text(_) => DatumType::Text,
            Self::Bool(_) => DatumType::Bool,
            Self::Null => DatumType::Null,
            Self::Bytea(_) => DatumType::Bytea,
        }
    }
}

/// One buffered result set with a positional cursor.
///
/// The canonical traversal is a nested loop over rows and columns. For
/// each cell, call [`next_type`][Reader::next_type] first, then either
/// skip (on [`Null`][DatumType::Null]) or call the matching typed read:
///
/// ```no_run
/// # fn app(reader: &mut wsldb::Reader) -> Result<(), wsldb::reader::ReadError> {
/// use wsldb::DatumType;
///
/// for _row in 0..reader.row_count() {
///     for _col in 0..reader.col_count() {
///         match reader.next_type()? {
///             DatumType::Int8 => println!("{}", reader.next_int8()?),
///             DatumType::Text => println!("{}", reader.next_text()?),
///             DatumType::Null => println!("null"),
///             other => println!("({other})"),
///         }
///     }
/// }
/// assert!(reader.at_end());
/// # Ok(())
/// # }
/// ```
///
/// Alternatively [`next`][Reader::next] folds the tag and payload read
/// into one call returning a [`Datum`].
pub struct Reader {
    row_count: usize,
    col_count: usize,
    names: Vec<ByteStr>,
    bytes: Bytes,
    cursor: usize,
    pending: Option<DatumType>,
}

impl Reader {
    /// Number of rows in this result set, at least 1.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns per row.
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Name of the `idx`th column, as declared by the row descriptor.
    pub fn column_name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(ByteStr::as_str)
    }

    /// Returns `true` once the cursor has consumed every cell.
    pub fn at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Read the type tag at the cursor and advance past it.
    ///
    /// A non-null tag must be followed by the matching typed read
    /// before the next call.
    pub fn next_type(&mut self) -> Result<DatumType, ReadError> {
        match self.pending.take() {
            None => {}
            Some(DatumType::Null) => {}
            Some(unread) => {
                self.pending = Some(unread);
                return Err(ReadError::PendingPayload { unread });
            }
        }

        if self.at_end() {
            return Err(ReadError::AtEnd);
        }

        let mut tail = self.bytes.slice(self.cursor..);
        let datum = DatumType::from_code(tail.try_get_u32_le()?)?;
        self.cursor += 4;
        self.pending = Some(datum);
        Ok(datum)
    }

    /// Read the next cell in one call, tag and payload together.
    ///
    /// Null cells come back as [`Datum::Null`] with no payload read.
    pub fn next(&mut self) -> Result<Datum, ReadError> {
        let datum = match self.pending {
            Some(datum) => datum,
            None => self.next_type()?,
        };
        match datum {
            DatumType::Int8 => self.next_int8().map(Datum::Int8),
            DatumType::Float4 => self.next_float4().map(Datum::Float4),
            DatumType::Text => self.next_text().map(Datum::Text),
            DatumType::Bool => self.next_bool().map(Datum::Bool),
            DatumType::Bytea => self.next_bytea().map(Datum::Bytea),
            DatumType::Null => {
                self.pending = None;
                Ok(Datum::Null)
            }
        }
    }

    /// Read an `Int8` payload.
    pub fn next_int8(&mut self) -> Result<i64, ReadError> {
        self.expect(DatumType::Int8)?;
        let mut tail = self.bytes.slice(self.cursor..);
        let value = tail.try_get_i64_le()?;
        self.cursor += 8;
        Ok(value)
    }

    /// Read a `Float4` payload.
    pub fn next_float4(&mut self) -> Result<f32, ReadError> {
        self.expect(DatumType::Float4)?;
        let mut tail = self.bytes.slice(self.cursor..);
        let value = tail.try_get_f32_le()?;
        self.cursor += 4;
        Ok(value)
    }

    /// Read a `Bool` payload.
    pub fn next_bool(&mut self) -> Result<bool, ReadError> {
        self.expect(DatumType::Bool)?;
        let mut tail = self.bytes.slice(self.cursor..);
        let value = tail.try_get_u8()?;
        self.cursor += 1;
        Ok(value != 0)
    }

    /// Read a `Text` payload without copying.
    pub fn next_text(&mut self) -> Result<ByteStr, ReadError> {
        self.expect(DatumType::Text)?;
        let mut tail = self.bytes.slice(self.cursor..);
        let before = tail.len();
        let value = tail.try_get_lp_str()?;
        self.cursor += before - tail.len();
        Ok(value)
    }

    /// Read a `Bytea` payload without copying.
    pub fn next_bytea(&mut self) -> Result<Bytes, ReadError> {
        self.expect(DatumType::Bytea)?;
        let mut tail = self.bytes.slice(self.cursor..);
        let before = tail.len();
        let value = tail.try_get_lp_bytes()?;
        self.cursor += before - tail.len();
        Ok(value)
    }

    /// Rewind the cursor to the first cell.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.pending = None;
    }

    fn expect(&mut self, requested: DatumType) -> Result<(), ReadError> {
        match self.pending.take() {
            Some(at_cursor) if at_cursor == requested => Ok(()),
            Some(at_cursor) => {
                self.pending = Some(at_cursor);
                Err(ReadError::TypeMismatch { requested, at_cursor })
            }
            None => Err(ReadError::MissingTag { requested }),
        }
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("row_count", &self.row_count)
            .field("col_count", &self.col_count)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

/// An error when reading cells out of a [`Reader`].
pub enum ReadError {
    /// A typed read does not match the tag at the cursor.
    TypeMismatch {
        requested: DatumType,
        at_cursor: DatumType,
    },
    /// A typed read with no preceding [`next_type`][Reader::next_type].
    MissingTag { requested: DatumType },
    /// A tag read while the previous cell payload is still unread.
    PendingPayload { unread: DatumType },
    /// The cursor already consumed every cell.
    AtEnd,
    /// The buffer ended mid-cell.
    Decode(DecodeError),
}

impl std::error::Error for ReadError { }

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { requested, at_cursor } => {
                write!(f, "{requested} read requested but the cursor is at a {at_cursor} cell")
            }
            Self::MissingTag { requested } => {
                write!(f, "{requested} read requested before reading the cell type tag")
            }
            Self::PendingPayload { unread } => {
                write!(f, "type tag read while a {unread} payload is still unread")
            }
            Self::AtEnd => f.write_str("cursor is already at the end of the result set"),
            Self::Decode(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl From<DecodeError> for ReadError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

/// Accumulates data rows for the result set currently in flight.
///
/// Cells arrive on the wire untagged, a null flag then a bare payload;
/// the builder re-encodes each one into the reader's self-describing
/// format using the active row descriptor.
pub(crate) struct ReaderBuilder {
    described: bool,
    cols: Vec<ColumnDesc>,
    row_count: usize,
    bytes: BytesMut,
}

impl ReaderBuilder {
    /// State before any row descriptor arrived.
    pub(crate) fn unbound() -> Self {
        Self {
            described: false,
            cols: Vec::new(),
            row_count: 0,
            bytes: BytesMut::new(),
        }
    }

    /// Bind to a freshly received row descriptor, dropping anything
    /// accumulated under the previous one.
    pub(crate) fn describe(&mut self, desc: RowDescription) {
        self.described = true;
        self.cols = desc.into_cols();
        self.row_count = 0;
        self.bytes.clear();
    }

    pub(crate) fn is_described(&self) -> bool {
        self.described
    }

    /// Append one `D` frame payload as a row.
    pub(crate) fn push_row(&mut self, mut body: Bytes) -> Result<(), DecodeError> {
        for col in &self.cols {
            // Byte1 null flag, a null cell has no payload
            if body.try_get_u8()? != 0 {
                self.bytes.put_u32_le(DatumType::Null.code());
                continue;
            }

            self.bytes.put_u32_le(col.datum.code());
            match col.datum {
                DatumType::Int8 => self.bytes.put_i64_le(body.try_get_i64_le()?),
                DatumType::Float4 => self.bytes.put_f32_le(body.try_get_f32_le()?),
                DatumType::Bool => self.bytes.put_u8(body.try_get_u8()?),
                DatumType::Text | DatumType::Bytea => {
                    let value = body.try_get_lp_bytes()?;
                    self.bytes.put_lp_slice(&value);
                }
                DatumType::Null => {}
            }
        }
        self.row_count += 1;
        Ok(())
    }

    /// Finalize the result set in flight on a completion frame.
    ///
    /// Returns a [`Reader`] only when at least one row accumulated;
    /// empty result sets are discarded. The descriptor binding stays
    /// in place either way.
    pub(crate) fn complete(&mut self) -> Option<Reader> {
        if self.row_count == 0 {
            self.bytes.clear();
            return None;
        }

        let reader = Reader {
            row_count: std::mem::take(&mut self.row_count),
            col_count: self.cols.len(),
            names: self.cols.iter().map(|c| c.name.clone()).collect(),
            bytes: self.bytes.split().freeze(),
            cursor: 0,
            pending: None,
        };
        Some(reader)
    }
}
