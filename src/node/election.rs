use crate::cluster::NodeId;
use crate::document::{CausalOrdering, DocumentSnapshot};
use crate::node::coordinator::LeadershipHooks;
use crate::node::node_state::{NodeState, RoleSnapshot};
use crate::node::peer_client::{Peer, Peers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

pub(crate) struct ElectionTuning {
    /// Per-peer bound on liveness probes and state queries.
    pub probe_timeout: Duration,
    /// How long to wait for a higher node's `declareLeader` before retrying.
    pub announcement_wait: Duration,
    /// Bounded retries; once exhausted the failure detector re-triggers.
    pub retry_attempts: u32,
    /// Per-peer bound on the victory fan-out (declarations and state pushes).
    pub peer_rpc_timeout: Duration,
}

/// Bully election: the highest-id live node wins. A node that finds no live
/// higher peer adopts the most advanced state it can reach, takes
/// leadership, and announces itself to everyone; a node that does find one
/// waits for that peer's own election to converge.
pub(crate) struct ElectionEngine {
    logger: slog::Logger,
    node_state: Arc<NodeState>,
    peers: Arc<Peers>,
    hooks: Arc<dyn LeadershipHooks>,
    tuning: ElectionTuning,
    election_in_flight: AtomicBool,
}

impl ElectionEngine {
    pub(crate) fn new(
        logger: slog::Logger,
        node_state: Arc<NodeState>,
        peers: Arc<Peers>,
        hooks: Arc<dyn LeadershipHooks>,
        tuning: ElectionTuning,
    ) -> Self {
        ElectionEngine {
            logger,
            node_state,
            peers,
            hooks,
            tuning,
            election_in_flight: AtomicBool::new(false),
        }
    }

    /// Kick off an election on its own task. Safe to call from anywhere, any
    /// number of times; concurrent triggers collapse into one attempt.
    pub(crate) fn trigger(self: Arc<Self>) {
        tokio::spawn(async move {
            self.run_election().await;
        });
    }

    pub(crate) async fn run_election(&self) {
        // At most one election in flight per node.
        if self
            .election_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            slog::debug!(self.logger, "Election already in flight, skipping trigger");
            return;
        }

        self.run_election_attempts().await;
        self.election_in_flight.store(false, Ordering::Release);
    }

    async fn run_election_attempts(&self) {
        for attempt in 1..=self.tuning.retry_attempts {
            slog::info!(self.logger, "Election attempt {} starting", attempt);

            if !self.any_higher_peer_alive().await {
                // No live higher id: the bully rule says this node wins.
                self.win_election().await;
                return;
            }

            // A higher node is alive; its own election should produce a
            // declaration. Wait a bounded time, then re-probe in case the
            // declaration was lost or that node died meanwhile.
            if self.await_leader_announcement().await {
                slog::info!(
                    self.logger,
                    "Election resolved: leader is {:?}",
                    self.node_state.current_leader()
                );
                return;
            }

            slog::warn!(self.logger, "No leader declaration arrived, retrying election");
        }

        slog::warn!(
            self.logger,
            "Election attempts exhausted with no leader; heartbeat monitoring will retry"
        );
    }

    /// Probe all higher-id peers in parallel, bounded by the probe timeout.
    async fn any_higher_peer_alive(&self) -> bool {
        let higher = self.peers.higher_than(self.node_state.my_id());
        if higher.is_empty() {
            return false;
        }

        let mut probes = Vec::with_capacity(higher.len());
        for (peer_id, peer) in higher {
            let timeout = self.tuning.probe_timeout;
            let logger = self.logger.clone();
            probes.push(tokio::spawn(async move {
                match tokio::time::timeout(timeout, peer.heartbeat()).await {
                    Ok(Ok(())) => {
                        slog::debug!(logger, "Higher node {} is alive", peer_id);
                        true
                    }
                    Ok(Err(_)) | Err(_) => false,
                }
            }));
        }

        let mut any_alive = false;
        for probe in probes {
            if let Ok(true) = probe.await {
                any_alive = true;
            }
        }

        any_alive
    }

    /// True if a leader became known (or we were told to lead) within the
    /// announcement window.
    async fn await_leader_announcement(&self) -> bool {
        let mut listener = self.node_state.listener();

        let resolved = |role: &RoleSnapshot| match role {
            RoleSnapshot::Leader => true,
            RoleSnapshot::Backup { leader } => leader.is_some(),
        };

        // The declaration may have raced ahead of this wait.
        if resolved(&listener.current()) {
            return true;
        }

        let wait = async {
            while let Some(role) = listener.next().await {
                if resolved(&role) {
                    return true;
                }
            }
            false
        };

        tokio::time::timeout(self.tuning.announcement_wait, wait)
            .await
            .unwrap_or(false)
    }

    async fn win_election(&self) {
        let adopted = self.most_advanced_state().await;

        self.hooks.install_leader_state(adopted.clone());

        self.announce_victory(adopted).await;
    }

    /// Sync phase: start from local state and keep the first-found state
    /// that is strictly newer than the current candidate. Concurrent
    /// candidates keep the incumbent; the new leader's serialization order
    /// settles any such conflict going forward.
    async fn most_advanced_state(&self) -> DocumentSnapshot {
        let mut candidate = self.hooks.local_state();

        for (peer_id, state) in self.query_peer_states().await {
            match state.clock.ordering(&candidate.clock) {
                CausalOrdering::After => {
                    slog::info!(self.logger, "Adopting more advanced state from node {}", peer_id);
                    candidate = state;
                }
                CausalOrdering::Concurrent => {
                    slog::debug!(
                        self.logger,
                        "Node {} has state concurrent with the candidate, keeping candidate",
                        peer_id
                    );
                }
                CausalOrdering::Before | CausalOrdering::Equal => {}
            }
        }

        candidate
    }

    async fn query_peer_states(&self) -> Vec<(NodeId, DocumentSnapshot)> {
        let mut queries = Vec::new();
        for (peer_id, peer) in self.peers.all() {
            let timeout = self.tuning.probe_timeout;
            queries.push(tokio::spawn(async move {
                match tokio::time::timeout(timeout, peer.current_state()).await {
                    Ok(Ok(state)) => Some((peer_id, state)),
                    Ok(Err(_)) | Err(_) => None,
                }
            }));
        }

        let mut states = Vec::new();
        for query in queries {
            if let Ok(Some(found)) = query.await {
                states.push(found);
            }
        }

        states
    }

    /// Broadcast phase: declare leadership and push the adopted state to
    /// every peer in parallel, best-effort. An unreachable peer will catch
    /// up through its own failure detection.
    async fn announce_victory(&self, adopted: DocumentSnapshot) {
        let my_id = self.node_state.my_id();

        let mut announcements = Vec::new();
        for (peer_id, peer) in self.peers.all() {
            let logger = self.logger.clone();
            let state = adopted.clone();
            let timeout = self.tuning.peer_rpc_timeout;

            announcements.push(tokio::spawn(async move {
                let announce = announce_to_peer(peer, my_id, &state);
                match tokio::time::timeout(timeout, announce).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => slog::warn!(logger, "Couldn't notify peer {} of victory: {}", peer_id, e),
                    Err(_) => slog::warn!(logger, "Victory announcement to peer {} timed out", peer_id),
                }
            }));
        }

        for announcement in announcements {
            let _ = announcement.await;
        }
    }
}

async fn announce_to_peer(
    peer: Arc<dyn Peer>,
    leader_id: NodeId,
    state: &DocumentSnapshot,
) -> Result<(), crate::node::peer_client::PeerUnreachableError> {
    peer.declare_leader(leader_id).await?;
    peer.apply_replication(state).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VectorClock;
    use crate::node::fake_peer::FakePeer;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn test_logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    fn tuning() -> ElectionTuning {
        ElectionTuning {
            probe_timeout: Duration::from_millis(100),
            announcement_wait: Duration::from_millis(200),
            retry_attempts: 2,
            peer_rpc_timeout: Duration::from_millis(100),
        }
    }

    /// Leadership hooks backed by a plain mutex, standing in for the
    /// coordinator.
    struct FakeHooks {
        node_state: Arc<NodeState>,
        state: Mutex<DocumentSnapshot>,
        installed: Mutex<Vec<DocumentSnapshot>>,
    }

    impl FakeHooks {
        fn new(node_state: Arc<NodeState>, cluster_size: usize) -> Self {
            FakeHooks {
                node_state,
                state: Mutex::new(DocumentSnapshot {
                    content: String::new(),
                    clock: VectorClock::new(cluster_size),
                }),
                installed: Mutex::new(Vec::new()),
            }
        }

        fn set_local_state(&self, state: DocumentSnapshot) {
            *self.state.lock().unwrap() = state;
        }

        fn installed_states(&self) -> Vec<DocumentSnapshot> {
            self.installed.lock().unwrap().clone()
        }
    }

    impl LeadershipHooks for FakeHooks {
        fn local_state(&self) -> DocumentSnapshot {
            self.state.lock().unwrap().clone()
        }

        fn install_leader_state(&self, adopted: DocumentSnapshot) {
            *self.state.lock().unwrap() = adopted.clone();
            self.installed.lock().unwrap().push(adopted);
            self.node_state.become_leader();
        }
    }

    struct Fixture {
        engine: Arc<ElectionEngine>,
        node_state: Arc<NodeState>,
        hooks: Arc<FakeHooks>,
        fake_peers: Vec<Arc<FakePeer>>,
    }

    fn fixture(my_id: u32, peer_ids: &[u32]) -> Fixture {
        let cluster_size = peer_ids.len() + 1;
        let node_state = Arc::new(NodeState::new(NodeId::new(my_id)));
        let hooks = Arc::new(FakeHooks::new(node_state.clone(), cluster_size));

        let fake_peers: Vec<Arc<FakePeer>> = peer_ids.iter().map(|id| Arc::new(FakePeer::new(*id, cluster_size))).collect();
        let mut by_id: BTreeMap<NodeId, Arc<dyn Peer>> = BTreeMap::new();
        for peer in &fake_peers {
            by_id.insert(peer.node_id(), peer.clone());
        }

        let engine = Arc::new(ElectionEngine::new(
            test_logger(),
            node_state.clone(),
            Arc::new(Peers::from_map(by_id)),
            hooks.clone(),
            tuning(),
        ));

        Fixture {
            engine,
            node_state,
            hooks,
            fake_peers,
        }
    }

    #[tokio::test]
    async fn highest_node_wins_and_announces() {
        let fx = fixture(2, &[0, 1]);

        fx.engine.run_election().await;

        assert!(fx.node_state.is_leader());
        for peer in &fx.fake_peers {
            assert_eq!(peer.declared_leaders(), vec![NodeId::new(2)]);
            assert_eq!(peer.replicated_states().len(), 1);
        }
    }

    #[tokio::test]
    async fn lower_node_wins_when_higher_peers_are_dead() {
        let fx = fixture(1, &[0, 2]);
        fx.fake_peers[1].set_alive(false);

        fx.engine.run_election().await;

        assert!(fx.node_state.is_leader());
        assert_eq!(fx.fake_peers[0].declared_leaders(), vec![NodeId::new(1)]);
    }

    #[tokio::test]
    async fn defers_to_live_higher_peer_that_declares() {
        let fx = fixture(0, &[1, 2]);

        // Node 2 declares itself shortly after our probes find it alive.
        let node_state = fx.node_state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            node_state.set_current_leader(NodeId::new(2));
        });

        fx.engine.run_election().await;

        assert!(!fx.node_state.is_leader());
        assert_eq!(fx.node_state.current_leader(), Some(NodeId::new(2)));
        assert!(fx.hooks.installed_states().is_empty());
    }

    #[tokio::test]
    async fn retries_then_gives_up_when_no_declaration_arrives() {
        let fx = fixture(0, &[1]);

        fx.engine.run_election().await;

        // Higher peer alive but silent: no leadership taken either way.
        assert!(!fx.node_state.is_leader());
        assert_eq!(fx.node_state.current_leader(), None);
        // Probed once per attempt.
        assert_eq!(fx.fake_peers[0].heartbeats_answered(), 2);
    }

    #[tokio::test]
    async fn victory_adopts_most_advanced_peer_state() {
        let fx = fixture(2, &[0, 1]);
        fx.hooks.set_local_state(DocumentSnapshot {
            content: "mine".to_string(),
            clock: VectorClock::from_slots(vec![1, 0, 0]),
        });
        fx.fake_peers[1].set_state(DocumentSnapshot {
            content: "ahead".to_string(),
            clock: VectorClock::from_slots(vec![1, 5, 0]),
        });

        fx.engine.run_election().await;

        let installed = fx.hooks.installed_states();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].content, "ahead");
    }

    #[tokio::test]
    async fn concurrent_peer_state_keeps_local_candidate() {
        let fx = fixture(2, &[0, 1]);
        fx.hooks.set_local_state(DocumentSnapshot {
            content: "mine".to_string(),
            clock: VectorClock::from_slots(vec![3, 0, 1]),
        });
        fx.fake_peers[0].set_state(DocumentSnapshot {
            content: "theirs".to_string(),
            clock: VectorClock::from_slots(vec![0, 4, 1]),
        });

        fx.engine.run_election().await;

        assert_eq!(fx.hooks.installed_states()[0].content, "mine");
    }

    #[tokio::test]
    async fn dead_peers_are_skipped_during_announcement() {
        let fx = fixture(2, &[0, 1]);
        fx.fake_peers[0].set_alive(false);

        fx.engine.run_election().await;

        assert!(fx.node_state.is_leader());
        assert_eq!(fx.fake_peers[1].declared_leaders(), vec![NodeId::new(2)]);
        assert!(fx.fake_peers[0].declared_leaders().is_empty());
    }

    #[tokio::test]
    async fn concurrent_triggers_collapse_into_one_election() {
        let fx = fixture(2, &[0, 1]);

        let first = fx.engine.clone();
        let second = fx.engine.clone();
        let (a, b) = tokio::join!(first.run_election(), second.run_election());
        let _ = (a, b);

        // One election's worth of announcements, not two.
        for peer in &fx.fake_peers {
            assert_eq!(peer.declared_leaders().len(), 1);
        }
    }
}
