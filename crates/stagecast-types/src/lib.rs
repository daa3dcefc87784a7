//! Shared types for stagecast.
//!
//! This crate contains all types shared across the stagecast workspace:
//! connection identity and roles, sharing technologies, capture targets,
//! the session snapshot, and protocol messages.

pub mod connection;
pub mod message;
pub mod session;
pub mod target;

pub use connection::{ConnectionId, Role};
pub use message::{ClientMessage, ServerMessage};
pub use session::{MediaHandle, SessionSnapshot, ShareTarget, Technology};
pub use target::TargetInfo;
