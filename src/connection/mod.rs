//! wsldb connection.
use bytes::BytesMut;
use std::{io, ops::ControlFlow};

mod config;

pub use config::{Config, ParseError};

use crate::{
    Result,
    common::{span, verbose},
    net::Socket,
    protocol::{
        ProtocolDecode, ProtocolEncode, frontend,
        backend::{BackendMessage, BackendProtocol, ErrorResponse},
        protocol_err,
    },
    reader::{Reader, ReaderBuilder},
};

const DEFAULT_BUF_CAPACITY: usize = 1024;

/// A single wsldb session over one TCP connection.
///
/// The wire protocol is strictly request/response: one query batch in
/// flight at a time, delimited by the server's ready-for-query frame.
/// Callers must serialize [`submit`][Connection::submit] calls; the
/// connection is an ordinary owned value and holds no global state.
///
/// # Examples
///
/// ```no_run
/// use wsldb::Connection;
///
/// # fn app() -> wsldb::Result<()> {
/// let mut conn = Connection::connect("localhost:3000")?;
///
/// conn.submit("create table t (a int8, b text);")?;
/// conn.submit("insert into t (a, b) values (7, 'hi');")?;
///
/// let mut readers = conn.submit("select a, b from t;")?;
/// let mut reader = readers.remove(0);
///
/// assert_eq!(reader.next_type()?, wsldb::DatumType::Int8);
/// assert_eq!(reader.next_int8()?, 7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    socket: Socket,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl Connection {
    /// Connect to a `host:port` address.
    pub fn connect(addr: &str) -> Result<Self> {
        Self::connect_with(&Config::parse(addr)?)
    }

    /// Connect with configuration from [environment variables][Config::from_env].
    pub fn connect_env() -> Result<Self> {
        Self::connect_with(&Config::from_env())
    }

    /// Connect with the given config.
    ///
    /// There is no handshake beyond opening the socket.
    pub fn connect_with(config: &Config) -> Result<Self> {
        let socket = Socket::connect(config.host(), config.port())?;

        Ok(Self {
            socket,
            read_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
            write_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
        })
    }

    /// Submit one query batch and collect its result sets.
    ///
    /// The query text may hold multiple semicolon delimited statements;
    /// readers come back in the order the server completed them, one per
    /// row-producing statement. Statements that produce no rows leave no
    /// reader behind.
    ///
    /// A server error fails the whole submit with
    /// [`ErrorKind::Server`][crate::ErrorKind::Server] once the response
    /// is fully consumed, so the connection stays usable for the next
    /// submit. Transport and protocol errors leave the connection in an
    /// unknown state; it should be dropped.
    pub fn submit(&mut self, sql: &str) -> Result<Vec<Reader>> {
        span!("submit");

        self.send(frontend::Query::new(sql))?;
        self.flush()?;

        let mut acc = ReaderBuilder::unbound();
        let mut finished = Vec::new();
        let mut server_err: Option<ErrorResponse> = None;

        loop {
            match self.recv::<BackendMessage>()? {
                BackendMessage::RowDescription(desc) => {
                    verbose!("(B) RowDescription {:?}", desc.cols());
                    acc.describe(desc);
                }
                BackendMessage::DataRow(row) => {
                    verbose!("(B) DataRow {} bytes", row.body.len());
                    if !acc.is_described() {
                        return Err(protocol_err!("data row before any row description").into());
                    }
                    acc.push_row(row.body)?;
                }
                BackendMessage::CommandComplete(_) => {
                    verbose!("(B) CommandComplete");
                    if let Some(reader) = acc.complete() {
                        finished.push(reader);
                    }
                }
                BackendMessage::ErrorResponse(err) => {
                    verbose!("(B) ErrorResponse {err:?}");
                    // keep consuming until the terminator so the
                    // conversation stays delimited
                    if server_err.is_none() {
                        server_err = Some(err);
                    }
                }
                BackendMessage::ReadyForQuery(_) => {
                    verbose!("(B) ReadyForQuery");
                    break;
                }
            }
        }

        match server_err {
            Some(err) => Err(err.into()),
            None => Ok(finished),
        }
    }

    /// Gracefully close the connection.
    pub fn close(mut self) -> io::Result<()> {
        self.socket.shutdown()
    }

    fn send<F: ProtocolEncode>(&mut self, message: F) -> Result<()> {
        message.encode(&mut self.write_buf)?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket.write_all_buf(&mut self.write_buf)
    }

    /// Receive one backend frame, reading from the socket whenever the
    /// framer reports the buffer short.
    fn recv<B: BackendProtocol>(&mut self) -> Result<B> {
        loop {
            match <B as ProtocolDecode>::decode(&mut self.read_buf)? {
                ControlFlow::Continue(expect) => {
                    self.read_buf.reserve(expect.saturating_sub(self.read_buf.len()));
                    self.socket.read_at_least(&mut self.read_buf, expect)?;
                }
                ControlFlow::Break(message) => return Ok(message),
            }
        }
    }
}
