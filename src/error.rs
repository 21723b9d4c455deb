//! `wsldb` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    connection::ParseError,
    protocol::{DecodeError, ProtocolError, backend::ErrorResponse},
    reader::ReadError,
};

/// A specialized [`Result`] type for `wsldb` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from the `wsldb` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// All possible error kind from the `wsldb` library.
pub enum ErrorKind {
    /// Address or environment configuration is invalid.
    Config(ParseError),
    /// Socket failure; the connection should be considered unusable.
    Io(io::Error),
    /// Frame tag not recognized or a state machine invariant violated.
    Protocol(ProtocolError),
    /// Frame payload shorter than its values require, or an unknown
    /// datum type tag.
    Decode(DecodeError),
    /// The server reported an error for a statement in the batch.
    Server(ErrorResponse),
    /// A reader cursor was asked for a type that does not match the
    /// tag at its offset.
    Read(ReadError),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ParseError>e => ErrorKind::Config(e));
from!(<io::Error>e => ErrorKind::Io(e));
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<DecodeError>e => ErrorKind::Decode(e));
from!(<ErrorResponse>e => ErrorKind::Server(e));
from!(<ReadError>e => ErrorKind::Read(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::Protocol(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
            Self::Server(e) => e.fmt(f),
            Self::Read(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
