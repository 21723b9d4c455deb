use super::DecodeError;

/// The type tag of one result cell, shared between server and client.
///
/// Inside a `D` frame a cell carries no tag of its own, the active
/// row descriptor declares it. Inside a [`Reader`][crate::Reader]
/// buffer every cell is prefixed with its tag as a `u32` little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatumType {
    /// 8-byte little-endian signed integer.
    Int8,
    /// 4-byte IEEE-754 little-endian float.
    Float4,
    /// Length-prefixed utf8 text.
    Text,
    /// Single byte, `0` or `1`.
    Bool,
    /// No payload.
    Null,
    /// Length-prefixed raw bytes.
    Bytea,
}

impl DatumType {
    /// The wire code of this type tag.
    pub const fn code(self) -> u32 {
        match self {
            Self::Int8 => 0,
            Self::Float4 => 1,
            Self::Text => 2,
            Self::Bool => 3,
            Self::Null => 4,
            Self::Bytea => 5,
        }
    }

    /// Translate a wire code back to a type tag.
    pub const fn from_code(code: u32) -> Result<Self, DecodeError> {
        Ok(match code {
            0 => Self::Int8,
            1 => Self::Float4,
            2 => Self::Text,
            3 => Self::Bool,
            4 => Self::Null,
            5 => Self::Bytea,
            _ => return Err(DecodeError::UnknownDatumType(code)),
        })
    }

    /// Human readable name of the type tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::Float4 => "Float4",
            Self::Text => "Text",
            Self::Bool => "Bool",
            Self::Null => "Null",
            Self::Bytea => "Bytea",
        }
    }
}

impl std::fmt::Display for DatumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
