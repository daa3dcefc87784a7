//! Core coordinator orchestration.
//!
//! One event-loop task owns the session state and the connection registry;
//! every mutation flows through its command queue, so lifecycle transitions
//! are atomic with respect to each other. Per-connection I/O and polling
//! run on their own tasks and never touch shared state directly.

use std::sync::Arc;

use stagecast_protocol::{ClientConnection, MessageReceiver, MessageSender, QuicTransport};
use stagecast_types::{
    ClientMessage, ConnectionId, Role, ServerMessage, SessionSnapshot, ShareTarget,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CommandError, CoordinatorError};
use crate::poller::{spawn_target_poller, TargetSource};
use crate::registry::ConnectionRegistry;
use crate::state::SessionState;

/// Depth of each connection's outbound queue. Overflow drops the event for
/// that connection rather than blocking the coordinator.
const OUTBOUND_QUEUE_DEPTH: usize = 64;

/// Events processed by the coordinator's main loop.
pub enum CoordinatorEvent {
    /// A new client connected (inbound).
    IncomingConnection(ClientConnection),
    /// A command from a connected client.
    ClientCommand {
        conn_id: ConnectionId,
        msg: ClientMessage,
    },
    /// A client's connection went away.
    ClientDisconnected(ConnectionId),
    /// Shutdown signal.
    Shutdown,
}

/// Observable coordinator state, published through a watch channel.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStatus {
    pub connection_count: usize,
    pub presenter: Option<ConnectionId>,
    pub session: SessionSnapshot,
}

/// The stagecast signaling coordinator.
pub struct Coordinator {
    config: Config,
    transport: QuicTransport,
    registry: ConnectionRegistry,
    session: SessionState,
    target_source: Arc<dyn TargetSource>,
    event_tx: mpsc::Sender<CoordinatorEvent>,
    event_rx: mpsc::Receiver<CoordinatorEvent>,
    session_tx: watch::Sender<SessionSnapshot>,
    status_tx: watch::Sender<CoordinatorStatus>,
}

impl Coordinator {
    /// Create a new coordinator instance.
    pub fn new(config: Config, transport: QuicTransport, target_source: Arc<dyn TargetSource>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (session_tx, _) = watch::channel(SessionSnapshot::default());
        let (status_tx, _) = watch::channel(CoordinatorStatus::default());

        Self {
            config,
            transport,
            registry: ConnectionRegistry::new(),
            session: SessionState::new(),
            target_source,
            event_tx,
            event_rx,
            session_tx,
            status_tx,
        }
    }

    /// Get a clone of the event sender for feeding events into the loop.
    pub fn event_sender(&self) -> mpsc::Sender<CoordinatorEvent> {
        self.event_tx.clone()
    }

    /// Subscribe to coordinator status snapshots.
    pub fn status_receiver(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status_tx.subscribe()
    }

    /// Run the coordinator event loop.
    pub async fn run(&mut self) -> Result<(), CoordinatorError> {
        let local = self.transport.local_addr()?;
        info!(addr = %local, "coordinator listening");

        loop {
            tokio::select! {
                // Accept new connections
                result = self.transport.accept() => {
                    match result {
                        Ok(conn) => {
                            if let Err(e) = self.handle_incoming_connection(conn).await {
                                warn!(error = %e, "failed to handle incoming connection");
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "accept error");
                        }
                    }
                }
                // Process coordinator events
                event = self.event_rx.recv() => {
                    match event {
                        Some(CoordinatorEvent::ClientCommand { conn_id, msg }) => {
                            self.handle_command(conn_id, msg);
                        }
                        Some(CoordinatorEvent::ClientDisconnected(conn_id)) => {
                            self.handle_disconnect(conn_id);
                        }
                        Some(CoordinatorEvent::IncomingConnection(conn)) => {
                            if let Err(e) = self.handle_incoming_connection(conn).await {
                                warn!(error = %e, "failed to handle incoming connection");
                            }
                        }
                        Some(CoordinatorEvent::Shutdown) | None => {
                            info!("shutting down");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    async fn handle_incoming_connection(
        &mut self,
        conn: ClientConnection,
    ) -> Result<(), CoordinatorError> {
        let remote = conn.remote_address();
        debug!(remote = %remote, "handling incoming connection");

        let (sender, receiver) = conn.open_event_stream().await?;
        let conn_id = ConnectionId::new();

        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        let writer = spawn_writer(conn_id, sender, out_rx);
        let reader = spawn_reader(conn_id, receiver, self.event_tx.clone());
        let poller = spawn_target_poller(
            conn_id,
            out_tx.clone(),
            self.session_tx.subscribe(),
            Arc::clone(&self.target_source),
            self.config.session.poll_interval(),
        );

        let role = self
            .registry
            .register(conn_id, out_tx.clone(), vec![writer, reader, poller]);

        // First message every client sees is its role.
        self.send_to(conn_id, ServerMessage::Role { role });
        if role == Role::Presenter {
            self.send_to(
                conn_id,
                ServerMessage::Technologies {
                    technologies: self.config.session.technologies.clone(),
                },
            );
        }

        self.publish();
        info!(conn = %conn_id, remote = %remote, role = %role, "client registered");
        Ok(())
    }

    fn handle_command(&mut self, conn_id: ConnectionId, msg: ClientMessage) {
        // The connection may have raced its own disconnect.
        let Some(role) = self.registry.get(conn_id).map(|h| h.role) else {
            debug!(conn = %conn_id, "command from unregistered connection ignored");
            return;
        };

        if !role.can_present() {
            self.reject(conn_id, &msg, &CommandError::NotPresenter);
            return;
        }

        match msg {
            ClientMessage::Init { technology } => {
                match self
                    .session
                    .negotiate(technology, &self.config.session.technologies)
                {
                    Ok(()) => {
                        let snapshot = self.session.snapshot();
                        self.send_to(
                            conn_id,
                            ServerMessage::InitAck {
                                is_connected: true,
                                is_mobile: snapshot.is_mobile,
                                error: None,
                            },
                        );
                        info!(conn = %conn_id, technology = %technology, "technology negotiated");
                    }
                    Err(e) => {
                        warn!(conn = %conn_id, technology = %technology, error = %e, "negotiation rejected");
                        self.send_to(
                            conn_id,
                            ServerMessage::InitAck {
                                is_connected: false,
                                is_mobile: false,
                                error: Some(e.to_string()),
                            },
                        );
                    }
                }
            }
            ClientMessage::StartStream { content } => {
                match self.session.start_stream(content) {
                    Ok(()) => {
                        self.broadcast_stream_start();
                        self.send_to(conn_id, ServerMessage::ack_ok());
                        info!(conn = %conn_id, "stream started");
                    }
                    Err(e) => self.send_to(conn_id, ServerMessage::ack_err(e.to_string())),
                }
            }
            ClientMessage::Pause => {
                let is_paused = self.session.toggle_pause();
                self.broadcast(ServerMessage::StreamPause { is_paused });
                self.send_to(conn_id, ServerMessage::ack_ok());
                info!(conn = %conn_id, is_paused, "pause toggled");
            }
            ClientMessage::SelectScreen { id } => {
                self.handle_select(conn_id, ShareTarget::Screen(id));
            }
            ClientMessage::SelectWindow { id } => {
                self.handle_select(conn_id, ShareTarget::Window(id));
            }
            ClientMessage::Stop => {
                self.session.stop();
                self.broadcast(ServerMessage::StreamStop);
                self.send_to(conn_id, ServerMessage::ack_ok());
                info!(conn = %conn_id, "session stopped");
            }
        }

        self.publish();
    }

    fn handle_select(&mut self, conn_id: ConnectionId, target: ShareTarget) {
        match self.session.select_target(target) {
            Ok(()) => {
                self.broadcast_stream_start();
                self.send_to(conn_id, ServerMessage::ack_ok());
                let snapshot = self.session.snapshot();
                info!(conn = %conn_id, title = ?snapshot.title, "target selected");
            }
            Err(e) => self.send_to(conn_id, ServerMessage::ack_err(e.to_string())),
        }
    }

    fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        let Some(role) = self.registry.unregister(conn_id) else {
            return;
        };
        info!(conn = %conn_id, role = %role, "client disconnected");

        if role == Role::Presenter {
            // The session cannot survive without its driver: end it, then
            // hand the presenter role to the longest-connected participant.
            if !self.session.snapshot().is_empty() {
                self.session.stop();
                self.broadcast(ServerMessage::StreamStop);
                info!("session ended: presenter disconnected");
            }

            if let Some(next) = self.registry.longest_connected_participant() {
                self.registry.promote(next);
                self.send_to(
                    next,
                    ServerMessage::Role {
                        role: Role::Presenter,
                    },
                );
                self.send_to(
                    next,
                    ServerMessage::Technologies {
                        technologies: self.config.session.technologies.clone(),
                    },
                );
                info!(conn = %next, "participant promoted to presenter");
            }
        }

        self.publish();
    }

    /// Fan the current stream-start event out to every registered
    /// connection, the presenter included.
    fn broadcast_stream_start(&self) {
        let snapshot = self.session.snapshot();
        self.broadcast(ServerMessage::StreamStart {
            title: snapshot.title,
            content: snapshot.content,
            is_mobile: snapshot.is_mobile,
        });
    }

    /// Best-effort delivery to all connections. A full or closed queue drops
    /// the event for that connection only; the disconnect path cleans up.
    fn broadcast(&self, msg: ServerMessage) {
        for (conn_id, handle) in self.registry.iter() {
            if handle.outbound.try_send(msg.clone()).is_err() {
                warn!(conn = %conn_id, "dropping event for slow or closed connection");
            }
        }
    }

    fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(handle) = self.registry.get(conn_id) {
            if handle.outbound.try_send(msg).is_err() {
                warn!(conn = %conn_id, "dropping reply for slow or closed connection");
            }
        }
    }

    fn reject(&self, conn_id: ConnectionId, msg: &ClientMessage, error: &CommandError) {
        debug!(conn = %conn_id, error = %error, "command rejected");
        let reply = match msg {
            ClientMessage::Init { .. } => ServerMessage::InitAck {
                is_connected: false,
                is_mobile: false,
                error: Some(error.to_string()),
            },
            _ => ServerMessage::ack_err(error.to_string()),
        };
        self.send_to(conn_id, reply);
    }

    /// Publish the session snapshot (for pollers) and the status (for
    /// observers) after a mutation.
    fn publish(&self) {
        self.session_tx.send_replace(self.session.snapshot());
        self.status_tx.send_replace(CoordinatorStatus {
            connection_count: self.registry.len(),
            presenter: self.registry.presenter(),
            session: self.session.snapshot(),
        });
    }

    fn shutdown(&mut self) {
        for conn_id in self.registry.connection_ids() {
            self.registry.unregister(conn_id);
        }
        self.transport.close();
        self.publish();
        info!("coordinator shut down complete");
    }
}

/// Drain a connection's outbound queue onto its event stream.
fn spawn_writer(
    conn_id: ConnectionId,
    mut sender: MessageSender,
    mut out_rx: mpsc::Receiver<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if let Err(e) = sender.send(&msg).await {
                debug!(conn = %conn_id, error = %e, "send failed, writer stopping");
                break;
            }
        }
    })
}

/// Forward a connection's inbound commands into the coordinator loop.
fn spawn_reader(
    conn_id: ConnectionId,
    mut receiver: MessageReceiver,
    event_tx: mpsc::Sender<CoordinatorEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv::<ClientMessage>().await {
                Ok(Some(msg)) => {
                    if event_tx
                        .send(CoordinatorEvent::ClientCommand { conn_id, msg })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = event_tx
                        .send(CoordinatorEvent::ClientDisconnected(conn_id))
                        .await;
                    break;
                }
                Err(e) => {
                    debug!(conn = %conn_id, error = %e, "read failed");
                    let _ = event_tx
                        .send(CoordinatorEvent::ClientDisconnected(conn_id))
                        .await;
                    break;
                }
            }
        }
    })
}
