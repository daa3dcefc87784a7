//! Session state types: technology, share targets, and the session snapshot.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A sharing technology the presenter can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum Technology {
    /// Polling capture of a selected screen or window.
    #[serde(rename = "VNC")]
    Vnc,
    /// Direct media stream from the presenter.
    #[serde(rename = "WebRTC")]
    WebRtc,
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vnc => write!(f, "VNC"),
            Self::WebRtc => write!(f, "WebRTC"),
        }
    }
}

/// The capture target a VNC session is bound to.
///
/// At most one target is selected at a time; selecting a screen clears any
/// previously selected window and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ShareTarget {
    Screen(String),
    Window(String),
}

impl ShareTarget {
    /// Display label derived from the target kind and id.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Screen(id) => format!("Screen {id}"),
            Self::Window(id) => format!("Window {id}"),
        }
    }
}

/// Opaque media handle supplied by the presenter's capture.
///
/// The coordinator never interprets the bytes; they are carried through
/// `StreamStart` broadcasts untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MediaHandle(pub Vec<u8>);

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MediaHandle({} bytes)", self.0.len())
    }
}

/// Read-only view of the current sharing session.
///
/// `Default` is the empty session: no technology, nothing streaming.
/// Stopping a session resets it to `Default`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SessionSnapshot {
    pub technology: Option<Technology>,
    pub is_streaming: bool,
    pub is_paused: bool,
    pub is_mobile: bool,
    pub selected_target: Option<ShareTarget>,
    pub title: Option<String>,
    pub content: Option<MediaHandle>,
}

impl SessionSnapshot {
    /// Whether the snapshot is in the empty (post-stop) state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
