//! # kinetic-client
//!
//! Rust client for the Kinetic key-value storage protocol: networked
//! drives exposing a key-value API over TCP/TLS.
//!
//! ## Architecture
//!
//! - **Frame codec**: length-prefixed frames (magic byte, envelope,
//!   opaque value payload).
//! - **Authentication**: per-command HMAC-SHA1 binding the command to
//!   the session identity, or a PIN for lifecycle operations.
//! - **Multiplexing**: one connection shared by many in-flight
//!   requests, correlated by a monotonically increasing sequence
//!   number, completions dispatched from a single receiver task.
//! - **Facades**: [`NonBlockConnection`] (submit + completion handler)
//!   and [`BlockConnection`] (synchronous calls over a one-shot latch).
//!
//! ## Example
//!
//! ```ignore
//! use kinetic_client::{BlockConnection, ClientOptions, Record, SyncMode, Algorithm};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kinetic_client::KineticError> {
//!     let conn = BlockConnection::connect(&ClientOptions {
//!         host: "127.0.0.1".into(),
//!         user: 1,
//!         hmac_key: b"asdfasdf".to_vec(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     let entry = Record {
//!         key: b"object000".to_vec(),
//!         value: b"ABCDEFG".as_ref().into(),
//!         sync: SyncMode::WriteThrough,
//!         algorithm: Algorithm::Sha1,
//!         force: true,
//!         ..Default::default()
//!     };
//!     let status = conn.put(&entry).await?;
//!     assert!(status.is_ok());
//!
//!     let (record, status) = conn.get(b"object000").await?;
//!     assert!(status.is_ok());
//!     assert_eq!(&record.unwrap().value[..], b"ABCDEFG");
//!
//!     conn.close();
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod callback;
pub mod error;
pub mod frame;
pub mod getlog;
pub mod options;
pub mod proto;
pub mod transport;
pub mod types;

mod blocking;
mod command;
mod nonblocking;
mod service;

pub use blocking::BlockConnection;
pub use callback::{MessageHandler, Outcome};
pub use error::{KineticError, Result};
pub use getlog::{Log, LogType};
pub use nonblocking::NonBlockConnection;
pub use options::ClientOptions;
pub use types::{
    Algorithm, KeyRange, MediaOperation, MessageType, P2PPushOperation, P2PPushRequest, Peer,
    PowerLevel, Priority, Record, Status, StatusCode, SyncMode,
};
