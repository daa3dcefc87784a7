//! Protocol message types.
//!
//! Messages are exchanged over the per-client QUIC event stream between the
//! coordinator and its clients.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::connection::Role;
use crate::session::{MediaHandle, Technology};
use crate::target::TargetInfo;

/// Messages a client sends to the coordinator.
///
/// Every variant is acknowledged: `Init` with [`ServerMessage::InitAck`],
/// everything else with [`ServerMessage::Ack`]. Commands from a participant
/// are rejected in the acknowledgment's error field.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub enum ClientMessage {
    /// Negotiate the sharing technology for the session.
    Init { technology: Technology },

    /// Begin streaming, optionally attaching the capture's media handle.
    StartStream { content: Option<MediaHandle> },

    /// End the session and reset all state.
    Stop,

    /// Toggle the paused flag.
    Pause,

    /// Bind a VNC session to a screen.
    SelectScreen { id: String },

    /// Bind a VNC session to a window.
    SelectWindow { id: String },
}

/// Messages the coordinator sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub enum ServerMessage {
    /// The role assigned to this connection. Sent immediately on connect,
    /// and again if the connection is promoted to presenter.
    Role { role: Role },

    /// The negotiation allow-list, in fallback order. Presenter only.
    Technologies { technologies: Vec<Technology> },

    /// Acknowledgment of `Init`.
    InitAck {
        is_connected: bool,
        is_mobile: bool,
        error: Option<String>,
    },

    /// Acknowledgment of every other command.
    Ack { error: Option<String> },

    /// The session started streaming (start or target selection).
    StreamStart {
        title: Option<String>,
        content: Option<MediaHandle>,
        is_mobile: bool,
    },

    /// The paused flag was toggled.
    StreamPause { is_paused: bool },

    /// The session ended.
    StreamStop,

    /// Available screens, refreshed each poll tick. VNC non-mobile only.
    Screens { screens: Vec<TargetInfo> },

    /// Available windows, refreshed each poll tick. VNC non-mobile only.
    Windows { windows: Vec<TargetInfo> },
}

impl ServerMessage {
    /// A successful acknowledgment.
    #[must_use]
    pub fn ack_ok() -> Self {
        Self::Ack { error: None }
    }

    /// A failed acknowledgment carrying the error string clients display.
    #[must_use]
    pub fn ack_err(error: impl Into<String>) -> Self {
        Self::Ack {
            error: Some(error.into()),
        }
    }
}
