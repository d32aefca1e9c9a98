use crate::cluster::NodeId;
use crate::document::{CommitError, Document, DocumentSnapshot, Operation};
use crate::node::node_state::NodeState;
use crate::node::notifier::ClientNotifier;
use crate::node::peer_client::Peers;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Orchestrates the write path and the peer-to-peer protocol handlers.
///
/// Every client operation funnels through `execute_operation`: the leader
/// makes it durable, applies it, tells its own clients, and pushes the new
/// state to every backup; a backup forwards to the leader it knows about and
/// otherwise rejects. Backups never apply a client write locally, so they
/// can never silently diverge from the leader.
pub(crate) struct ReplicationCoordinator {
    logger: slog::Logger,
    document: Arc<Document>,
    notifier: Arc<ClientNotifier>,
    node_state: Arc<NodeState>,
    peers: Arc<Peers>,
    replication_timeout: Duration,
}

impl ReplicationCoordinator {
    pub(crate) fn new(
        logger: slog::Logger,
        document: Arc<Document>,
        notifier: Arc<ClientNotifier>,
        node_state: Arc<NodeState>,
        peers: Arc<Peers>,
        replication_timeout: Duration,
    ) -> Self {
        ReplicationCoordinator {
            logger,
            document,
            notifier,
            node_state,
            peers,
            replication_timeout,
        }
    }

    pub(crate) async fn execute_operation(&self, operation: Operation) -> Result<(), ExecuteError> {
        if self.node_state.is_leader() {
            self.execute_as_leader(operation)
        } else {
            self.forward_to_leader(operation).await
        }
    }

    fn execute_as_leader(&self, operation: Operation) -> Result<(), ExecuteError> {
        let new_state = self.document.commit_operation(&operation)?;

        self.notifier.broadcast(&new_state);
        self.replicate_to_backups(new_state);
        self.document.maybe_snapshot();

        Ok(())
    }

    /// Fire-and-forget state push to every backup, one task per peer. An
    /// unreachable backup is skipped; it self-corrects on the next push or
    /// via its own failure detector.
    fn replicate_to_backups(&self, new_state: DocumentSnapshot) {
        for (peer_id, peer) in self.peers.all() {
            let logger = self.logger.clone();
            let state = new_state.clone();
            let timeout = self.replication_timeout;

            tokio::spawn(async move {
                match tokio::time::timeout(timeout, peer.apply_replication(&state)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => slog::warn!(logger, "Replication to peer {} failed: {}", peer_id, e),
                    Err(_) => slog::warn!(logger, "Replication to peer {} timed out", peer_id),
                }
            });
        }
    }

    async fn forward_to_leader(&self, operation: Operation) -> Result<(), ExecuteError> {
        let leader_id = self.node_state.current_leader().ok_or(ExecuteError::NoLeader)?;
        let leader = self.peers.get(leader_id).ok_or(ExecuteError::NoLeader)?;

        match tokio::time::timeout(self.replication_timeout, leader.forward_operation(&operation)).await {
            Ok(Ok(leader_verdict)) => leader_verdict,
            Ok(Err(unreachable)) => {
                slog::warn!(self.logger, "Can't forward to leader {}: {}", leader_id, unreachable);
                Err(ExecuteError::NoLeader)
            }
            Err(_) => {
                slog::warn!(self.logger, "Forward to leader {} timed out", leader_id);
                Err(ExecuteError::NoLeader)
            }
        }
    }

    /// Subscribe a client. The receiver's first message is the state as of
    /// registration, so late joiners converge immediately.
    pub(crate) fn register_client(&self, username: String) -> mpsc::Receiver<DocumentSnapshot> {
        self.notifier.register(username, self.document.snapshot())
    }

    /// Liveness echo. Reaching this handler is the whole answer.
    pub(crate) fn heartbeat(&self) {}

    /// Backup-side receipt of the leader's state push. One hop only; this is
    /// never re-forwarded to other servers. A node that still holds
    /// leadership ignores the push: every legitimate sender demotes it with
    /// a `declare_leader` before its first state push arrives.
    pub(crate) fn apply_replication(&self, state: DocumentSnapshot) {
        if self.node_state.is_leader() {
            slog::info!(self.logger, "Ignoring state push while leader");
            return;
        }

        self.document.overwrite_state(&state);
        self.notifier.sync_local_clients(&state);
    }

    pub(crate) fn declare_leader(&self, leader_id: NodeId) {
        if leader_id == self.node_state.my_id() {
            if !self.node_state.is_leader() {
                slog::info!(self.logger, "Ignoring stale declaration naming me leader");
            }
            return;
        }

        // A live node outranks every lower id, so such a claim is stale; the
        // claimant will hear from this node's own election.
        if leader_id < self.node_state.my_id() {
            slog::info!(self.logger, "Ignoring declaration from lower-ranked node {}", leader_id);
            return;
        }

        if self.peers.get(leader_id).is_none() {
            slog::info!(self.logger, "Ignoring declaration for unknown node {}", leader_id);
            return;
        }

        slog::info!(self.logger, "Accepting node {} as leader", leader_id);
        self.node_state.set_current_leader(leader_id);
    }

    /// Election sync: install the given state and take leadership.
    pub(crate) fn become_leader(&self, state: DocumentSnapshot) {
        self.install_leader_state(state);
    }

    pub(crate) fn current_state(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }
}

/// The election engine's view of the coordinator: where to get this node's
/// state from, and how to install the adopted state on victory.
pub(crate) trait LeadershipHooks: Send + Sync {
    fn local_state(&self) -> DocumentSnapshot;
    fn install_leader_state(&self, adopted: DocumentSnapshot);
}

impl LeadershipHooks for ReplicationCoordinator {
    fn local_state(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }

    fn install_leader_state(&self, adopted: DocumentSnapshot) {
        self.document.overwrite_state(&adopted);

        // A fresh leader should survive an immediate crash with the state it
        // was elected on. Failure leaves the WAL intact, so nothing
        // acknowledged is lost either way.
        if let Err(e) = self.document.save_snapshot() {
            slog::warn!(self.logger, "Couldn't persist leadership snapshot: {}", e);
        }

        self.node_state.become_leader();
        self.notifier.sync_local_clients(&adopted);
        slog::info!(self.logger, "Now leader with clock {}", adopted.clock);
    }
}

/// Why a write was rejected. Both cases are retryable from the client's
/// point of view; neither leaves any partial state behind.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error("No leader is currently available; retry after the next election")]
    NoLeader,
    #[error("Write could not be made durable: {0}")]
    Durability(String),
    #[error("Operation is malformed: {0}")]
    InvalidOperation(String),
}

impl From<CommitError> for ExecuteError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::Malformed(inner) => ExecuteError::InvalidOperation(inner.to_string()),
            CommitError::Durability(inner) => ExecuteError::Durability(inner.to_string()),
        }
    }
}
