//! Per-connection target poller.
//!
//! While the session runs VNC in non-mobile mode, each connection receives a
//! fresh list of capturable screens and windows once per tick. Each tick is
//! independent and replaces the client's previous view.

use std::sync::Arc;
use std::time::Duration;

use stagecast_types::{
    target::sort_targets, ConnectionId, ServerMessage, SessionSnapshot, TargetInfo, Technology,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Enumerates capturable targets.
///
/// Real enumeration is an OS/display-server query and lives with the
/// embedding application; the coordinator only needs this seam.
pub trait TargetSource: Send + Sync {
    fn screens(&self) -> Vec<TargetInfo>;
    fn windows(&self) -> Vec<TargetInfo>;
}

/// Synthetic stand-in target list.
pub struct StaticTargetSource;

impl TargetSource for StaticTargetSource {
    fn screens(&self) -> Vec<TargetInfo> {
        vec![
            TargetInfo::new("1", "Screen 1"),
            TargetInfo::new("2", "Screen 2"),
        ]
    }

    fn windows(&self) -> Vec<TargetInfo> {
        vec![
            TargetInfo::new("1", "Window 1"),
            TargetInfo::new("2", "Window 2"),
        ]
    }
}

/// Spawn the poll task for one connection.
///
/// The task reads the session through a watch snapshot, never the live
/// state, so it can tick in parallel with lifecycle commands. It exits when
/// the connection's outbound queue closes and is aborted on unregister.
pub fn spawn_target_poller(
    conn_id: ConnectionId,
    outbound: mpsc::Sender<ServerMessage>,
    session_rx: watch::Receiver<SessionSnapshot>,
    source: Arc<dyn TargetSource>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let view = session_rx.borrow().clone();
            if view.technology != Some(Technology::Vnc) || view.is_mobile {
                continue;
            }

            let mut screens = source.screens();
            sort_targets(&mut screens);
            let mut windows = source.windows();
            sort_targets(&mut windows);

            if outbound
                .try_send(ServerMessage::Screens { screens })
                .is_err()
                || outbound
                    .try_send(ServerMessage::Windows { windows })
                    .is_err()
            {
                debug!(conn = %conn_id, "target poller stopping: outbound queue unavailable");
                break;
            }
            trace!(conn = %conn_id, "sent target lists");
        }
    })
}
