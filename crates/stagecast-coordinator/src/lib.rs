//! Core coordinator for stagecast.
//!
//! Implements the signaling side of a screen/window-sharing session: role
//! assignment, technology negotiation, the session lifecycle state machine,
//! event fan-out to every connected client, and the per-connection target
//! poller.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod poller;
pub mod registry;
pub mod setup;
pub mod state;

pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorEvent, CoordinatorStatus};
pub use error::{CommandError, CoordinatorError};
pub use poller::{spawn_target_poller, StaticTargetSource, TargetSource};
pub use registry::ConnectionRegistry;
pub use state::SessionState;
