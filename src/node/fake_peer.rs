//! In-memory `Peer` stand-in for election, failure-detector and coordinator
//! tests: scriptable liveness, a held state snapshot, and recordings of
//! every call that reached it.

use crate::cluster::NodeId;
use crate::document::{DocumentSnapshot, Operation, VectorClock};
use crate::node::coordinator::ExecuteError;
use crate::node::peer_client::{Peer, PeerUnreachableError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Duration;

pub(crate) struct FakePeer {
    id: NodeId,
    alive: AtomicBool,
    state: Mutex<DocumentSnapshot>,
    heartbeats_answered: AtomicUsize,
    forward_verdict: Mutex<Result<(), ExecuteError>>,
    forwarded: Mutex<Vec<Operation>>,
    replicated: Mutex<Vec<DocumentSnapshot>>,
    declared_leaders: Mutex<Vec<NodeId>>,
    become_leader_calls: Mutex<Vec<DocumentSnapshot>>,
}

impl FakePeer {
    pub(crate) fn new(id: u32, cluster_size: usize) -> Self {
        FakePeer {
            id: NodeId::new(id),
            alive: AtomicBool::new(true),
            state: Mutex::new(DocumentSnapshot {
                content: String::new(),
                clock: VectorClock::new(cluster_size),
            }),
            heartbeats_answered: AtomicUsize::new(0),
            forward_verdict: Mutex::new(Ok(())),
            forwarded: Mutex::new(Vec::new()),
            replicated: Mutex::new(Vec::new()),
            declared_leaders: Mutex::new(Vec::new()),
            become_leader_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn node_id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub(crate) fn set_state(&self, state: DocumentSnapshot) {
        *self.state.lock().unwrap() = state;
    }

    pub(crate) fn set_forward_verdict(&self, verdict: Result<(), ExecuteError>) {
        *self.forward_verdict.lock().unwrap() = verdict;
    }

    pub(crate) fn heartbeats_answered(&self) -> usize {
        self.heartbeats_answered.load(Ordering::Acquire)
    }

    pub(crate) fn forwarded_operations(&self) -> Vec<Operation> {
        self.forwarded.lock().unwrap().clone()
    }

    pub(crate) fn replicated_states(&self) -> Vec<DocumentSnapshot> {
        self.replicated.lock().unwrap().clone()
    }

    pub(crate) fn declared_leaders(&self) -> Vec<NodeId> {
        self.declared_leaders.lock().unwrap().clone()
    }

    pub(crate) fn become_leader_calls(&self) -> Vec<DocumentSnapshot> {
        self.become_leader_calls.lock().unwrap().clone()
    }

    /// Poll until a replication push lands. Panics after a sanity timeout.
    pub(crate) async fn wait_for_replication(&self) -> DocumentSnapshot {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(snapshot) = self.replicated.lock().unwrap().last().cloned() {
                return snapshot;
            }
            assert!(tokio::time::Instant::now() < deadline, "no replication arrived");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn check_alive(&self) -> Result<(), PeerUnreachableError> {
        if self.alive.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(PeerUnreachableError {
                peer_id: self.id,
                reason: "fake peer is down".to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl Peer for FakePeer {
    async fn heartbeat(&self) -> Result<(), PeerUnreachableError> {
        self.check_alive()?;
        self.heartbeats_answered.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn forward_operation(
        &self,
        operation: &Operation,
    ) -> Result<Result<(), ExecuteError>, PeerUnreachableError> {
        self.check_alive()?;
        self.forwarded.lock().unwrap().push(operation.clone());
        Ok(self.forward_verdict.lock().unwrap().clone())
    }

    async fn apply_replication(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError> {
        self.check_alive()?;
        self.replicated.lock().unwrap().push(state.clone());
        Ok(())
    }

    async fn declare_leader(&self, leader_id: NodeId) -> Result<(), PeerUnreachableError> {
        self.check_alive()?;
        self.declared_leaders.lock().unwrap().push(leader_id);
        Ok(())
    }

    async fn become_leader(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError> {
        self.check_alive()?;
        self.become_leader_calls.lock().unwrap().push(state.clone());
        Ok(())
    }

    async fn current_state(&self) -> Result<DocumentSnapshot, PeerUnreachableError> {
        self.check_alive()?;
        Ok(self.state.lock().unwrap().clone())
    }
}
