//! QUIC transport layer and wire protocol for stagecast.
//!
//! This crate handles QUIC endpoint management (via quinn), TLS and
//! self-signed certificate generation, message framing (length-prefixed
//! bincode v2), and the typed send/receive streams the coordinator and its
//! clients talk over.

pub mod cert;
pub mod connection;
pub mod error;
pub mod tls;
pub mod transport;
pub mod wire;

pub use cert::SelfSignedCert;
pub use connection::{ClientConnection, MessageReceiver, MessageSender};
pub use error::ProtocolError;
pub use transport::QuicTransport;
