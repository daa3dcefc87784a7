//! Connection identity and roles.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a client connection.
///
/// Wraps a UUID v4 but serialises as raw bytes for bincode efficiency.
/// Connection IDs are minted by the coordinator when a client connects and
/// are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct ConnectionId(#[bincode(with_serde)] Uuid);

impl ConnectionId {
    /// Generate a new random connection ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role assigned to a connection.
///
/// Exactly one live connection holds `Presenter` at any time; everyone else
/// is a `Participant` and receives broadcasts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Role {
    Presenter,
    Participant,
}

impl Role {
    /// Whether this role may issue session-mutating commands.
    #[must_use]
    pub fn can_present(self) -> bool {
        self == Self::Presenter
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Presenter => write!(f, "Presenter"),
            Self::Participant => write!(f, "Participant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId::new();
        let s = id.to_string();
        // UUID v4 format: 8-4-4-4-12
        assert_eq!(s.len(), 36);
    }

    #[test]
    fn connection_id_bincode_roundtrip() {
        let id = ConnectionId::new();
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(id, config).unwrap();
        let (decoded, _): (ConnectionId, _) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(id, decoded);
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Presenter.to_string(), "Presenter");
        assert_eq!(Role::Participant.to_string(), "Participant");
    }

    #[test]
    fn only_presenter_can_present() {
        assert!(Role::Presenter.can_present());
        assert!(!Role::Participant.can_present());
    }
}
