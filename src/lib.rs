//! wsldb Driver
//!
//! A blocking client for the wsldb database server. The driver speaks the
//! wsldb binary wire protocol over TCP, submits textual SQL, and hands
//! result rows back through typed positional [`Reader`]s. It knows nothing
//! about SQL beyond "a query is a string the caller provides".
//!
//! # Examples
//!
//! ```no_run
//! use wsldb::{Connection, DatumType};
//!
//! # fn app() -> wsldb::Result<()> {
//! let mut conn = Connection::connect("localhost:3000")?;
//!
//! conn.submit("create table planets (name text, moons int8);")?;
//! conn.submit("insert into planets (name, moons) values ('Earth', 1);")?;
//!
//! for mut reader in conn.submit("select name, moons from planets;")? {
//!     for _row in 0..reader.row_count() {
//!         for _col in 0..reader.col_count() {
//!             match reader.next_type()? {
//!                 DatumType::Int8 => print!("{},", reader.next_int8()?),
//!                 DatumType::Float4 => print!("{},", reader.next_float4()?),
//!                 DatumType::Text => print!("{},", reader.next_text()?),
//!                 DatumType::Bool => print!("{},", reader.next_bool()?),
//!                 DatumType::Bytea => print!("{:?},", reader.next_bytea()?),
//!                 DatumType::Null => print!("null,"),
//!             }
//!         }
//!         println!();
//!     }
//! }
//!
//! conn.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! A query batch may hold multiple semicolon delimited statements;
//! transaction control is plain SQL inside the batch:
//!
//! ```no_run
//! use wsldb::Connection;
//!
//! # fn app() -> wsldb::Result<()> {
//! let mut conn = Connection::connect_env()?;
//!
//! let readers = conn.submit(
//!     "begin; insert into planets (name, moons) values ('Mars', 2); \
//!      select max(moons) from planets; commit;",
//! )?;
//!
//! // only the row-producing statement left a reader behind
//! assert_eq!(readers.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod common;
mod ext;
mod net;

// Protocol
pub mod protocol;

// Component
pub mod reader;

// Connection
pub mod connection;

mod error;

#[doc(inline)]
pub use protocol::DatumType;
#[doc(inline)]
pub use reader::{Datum, Reader};
#[doc(inline)]
pub use connection::{Config, Connection};
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
