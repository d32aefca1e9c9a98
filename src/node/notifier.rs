use crate::document::DocumentSnapshot;
use crate::node::node_state::NodeState;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Registry of locally-connected editor clients. Each client holds the
/// receiving half of a bounded channel; the first message a client ever sees
/// is the snapshot it was registered with, so late joiners converge
/// immediately.
pub(crate) struct ClientNotifier {
    logger: slog::Logger,
    node_state: Arc<NodeState>,
    update_buffer: usize,
    clients: Mutex<Vec<RegisteredClient>>,
}

struct RegisteredClient {
    username: String,
    sender: mpsc::Sender<DocumentSnapshot>,
}

impl ClientNotifier {
    pub(crate) fn new(logger: slog::Logger, node_state: Arc<NodeState>, update_buffer: usize) -> Self {
        ClientNotifier {
            logger,
            node_state,
            update_buffer,
            clients: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn register(&self, username: String, initial: DocumentSnapshot) -> mpsc::Receiver<DocumentSnapshot> {
        let (sender, receiver) = mpsc::channel(self.update_buffer);

        // A fresh channel always has room for the seed message.
        let _ = sender.try_send(initial);

        slog::info!(self.logger, "Client '{}' connected", username);
        self.locked().push(RegisteredClient { username, sender });

        receiver
    }

    /// Operation-intake fan-out. Only the leader pushes updates born from
    /// client operations; backups hear about them via replication instead.
    pub(crate) fn broadcast(&self, snapshot: &DocumentSnapshot) {
        if !self.node_state.is_leader() {
            return;
        }

        self.fan_out(snapshot);
    }

    /// Unguarded push used when replicated or election-synced state lands on
    /// this node. One hop only; this never re-forwards to other servers.
    pub(crate) fn sync_local_clients(&self, snapshot: &DocumentSnapshot) {
        self.fan_out(snapshot);
    }

    fn fan_out(&self, snapshot: &DocumentSnapshot) {
        let mut clients = self.locked();
        clients.retain(|client| match client.sender.try_send(snapshot.clone()) {
            Ok(()) => true,
            Err(_) => {
                // Disconnected, or so far behind the bounded buffer filled.
                slog::info!(self.logger, "Dropping client '{}'", client.username);
                false
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn client_count(&self) -> usize {
        self.locked().len()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Vec<RegisteredClient>> {
        self.clients.lock().expect("client registry mutex poisoned")
    }
}
