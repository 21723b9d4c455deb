//! Blocking socket transport.
use bytes::BytesMut;
use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
};

const READ_CHUNK: usize = 1024;

/// A blocking TCP connection to the server.
///
/// Short reads are normal; [`read_at_least`][Socket::read_at_least] is
/// the only read primitive upper layers use and it accumulates chunks
/// until the requested amount is buffered.
#[derive(Debug)]
pub struct Socket {
    stream: TcpStream,
}

impl Socket {
    /// Open a TCP connection, no handshake follows.
    pub fn connect(host: &str, port: u16) -> io::Result<Socket> {
        let stream = TcpStream::connect((host, port))?;
        Ok(Self { stream })
    }

    /// Append read chunks to `buf` until `buf.len() >= n`.
    ///
    /// A clean peer close mid-frame surfaces as [`UnexpectedEof`][1].
    ///
    /// [1]: io::ErrorKind::UnexpectedEof
    pub fn read_at_least(&mut self, buf: &mut BytesMut, n: usize) -> io::Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        while buf.len() < n {
            let read = self.stream.read(&mut chunk)?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the connection mid frame",
                ));
            }
            buf.extend_from_slice(&chunk[..read]);
        }
        Ok(())
    }

    /// Write the whole buffer, looping until every byte is out.
    pub fn write_all_buf(&mut self, buf: &mut BytesMut) -> io::Result<()> {
        self.stream.write_all(buf)?;
        self.stream.flush()?;
        buf.clear();
        Ok(())
    }

    /// Release the transport.
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }
}
