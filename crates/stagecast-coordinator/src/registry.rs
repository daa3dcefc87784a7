//! Connection registry and role assignment.

use std::collections::HashMap;

use stagecast_types::{ConnectionId, Role, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything the coordinator holds per live connection.
pub struct ClientHandle {
    pub role: Role,
    /// Bounded outbound queue; a writer task drains it onto the wire.
    pub outbound: mpsc::Sender<ServerMessage>,
    /// Monotonic join order, used by the presenter-failover policy.
    pub joined_seq: u64,
    /// Reader, writer, and poller tasks; aborted on unregister so no timer
    /// or stream I/O outlives the connection.
    tasks: Vec<JoinHandle<()>>,
}

/// Tracks every live connection and its assigned role.
///
/// The registry is only touched from the coordinator's event-loop task, so
/// the presenter check-and-set in [`register`](Self::register) cannot race:
/// two simultaneous joins serialize through the event queue.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: HashMap<ConnectionId, ClientHandle>,
    next_seq: u64,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and assign its role: the first joiner while no
    /// presenter is live becomes Presenter, everyone else Participant.
    pub fn register(
        &mut self,
        conn_id: ConnectionId,
        outbound: mpsc::Sender<ServerMessage>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Role {
        let role = if self.presenter().is_none() {
            Role::Presenter
        } else {
            Role::Participant
        };

        let joined_seq = self.next_seq;
        self.next_seq += 1;

        self.clients.insert(
            conn_id,
            ClientHandle {
                role,
                outbound,
                joined_seq,
                tasks,
            },
        );
        role
    }

    /// Remove a connection, aborting its tasks. Returns the freed role.
    ///
    /// Freeing the Presenter role does not reassign it; promotion is the
    /// coordinator's failover policy, not the registry's concern.
    pub fn unregister(&mut self, conn_id: ConnectionId) -> Option<Role> {
        let handle = self.clients.remove(&conn_id)?;
        for task in &handle.tasks {
            task.abort();
        }
        debug!(conn = %conn_id, role = %handle.role, "connection unregistered");
        Some(handle.role)
    }

    #[must_use]
    pub fn get(&self, conn_id: ConnectionId) -> Option<&ClientHandle> {
        self.clients.get(&conn_id)
    }

    /// The connection currently holding the Presenter role, if any.
    #[must_use]
    pub fn presenter(&self) -> Option<ConnectionId> {
        self.clients
            .iter()
            .find(|(_, handle)| handle.role == Role::Presenter)
            .map(|(id, _)| *id)
    }

    /// The participant that has been connected the longest.
    #[must_use]
    pub fn longest_connected_participant(&self) -> Option<ConnectionId> {
        self.clients
            .iter()
            .filter(|(_, handle)| handle.role == Role::Participant)
            .min_by_key(|(_, handle)| handle.joined_seq)
            .map(|(id, _)| *id)
    }

    /// Promote a participant to Presenter. Returns false for unknown ids.
    pub fn promote(&mut self, conn_id: ConnectionId) -> bool {
        match self.clients.get_mut(&conn_id) {
            Some(handle) => {
                handle.role = Role::Presenter;
                true
            }
            None => false,
        }
    }

    /// Iterate all live connections (order unspecified).
    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &ClientHandle)> {
        self.clients.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Drain every connection id (used at shutdown).
    #[must_use]
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.clients.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound() -> mpsc::Sender<ServerMessage> {
        mpsc::channel(8).0
    }

    #[test]
    fn first_joiner_becomes_presenter() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_eq!(registry.register(a, outbound(), Vec::new()), Role::Presenter);
        assert_eq!(
            registry.register(b, outbound(), Vec::new()),
            Role::Participant
        );
        assert_eq!(registry.presenter(), Some(a));
    }

    #[test]
    fn exactly_one_presenter_among_many() {
        let mut registry = ConnectionRegistry::new();
        let roles: Vec<Role> = (0..16)
            .map(|_| registry.register(ConnectionId::new(), outbound(), Vec::new()))
            .collect();

        let presenters = roles.iter().filter(|r| **r == Role::Presenter).count();
        assert_eq!(presenters, 1);
        assert_eq!(roles[0], Role::Presenter);
    }

    #[test]
    fn presenter_slot_freed_but_not_reassigned() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.register(a, outbound(), Vec::new());
        registry.register(b, outbound(), Vec::new());

        assert_eq!(registry.unregister(a), Some(Role::Presenter));
        // b stays a participant until the coordinator promotes it.
        assert_eq!(registry.presenter(), None);
        assert_eq!(registry.get(b).map(|h| h.role), Some(Role::Participant));

        // A fresh joiner now claims the free slot.
        let c = ConnectionId::new();
        assert_eq!(registry.register(c, outbound(), Vec::new()), Role::Presenter);
    }

    #[test]
    fn longest_connected_participant_wins_promotion() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();
        registry.register(a, outbound(), Vec::new());
        registry.register(b, outbound(), Vec::new());
        registry.register(c, outbound(), Vec::new());

        registry.unregister(a);
        assert_eq!(registry.longest_connected_participant(), Some(b));

        assert!(registry.promote(b));
        assert_eq!(registry.presenter(), Some(b));
        assert_eq!(registry.longest_connected_participant(), Some(c));
    }

    #[test]
    fn unregister_unknown_is_none() {
        let mut registry = ConnectionRegistry::new();
        assert_eq!(registry.unregister(ConnectionId::new()), None);
        assert!(registry.is_empty());
    }
}
