use crate::node::election::ElectionEngine;
use crate::node::node_state::NodeState;
use crate::node::peer_client::Peers;
use crate::node::stop_signal;
use crate::node::time::{Clock, SystemClock};
use std::sync::Arc;
use tokio::time::Duration;

pub(crate) struct DetectorTuning {
    pub heartbeat_interval: Duration,
    pub probe_timeout: Duration,
    /// Consecutive failed probes before the leader is declared dead, so a
    /// single dropped packet doesn't force a re-election.
    pub failure_threshold: u32,
}

/// Dropping the handle stops the detector loop at its next wakeup.
pub(crate) struct FailureDetectorHandle {
    _stopper: stop_signal::Stopper,
}

/// Periodic liveness probing of the known leader. A leader doesn't monitor
/// itself; a backup with no known leader asks for an election immediately;
/// a backup whose leader stops answering clears it and does the same.
pub(crate) struct FailureDetector<C: Clock = SystemClock> {
    logger: slog::Logger,
    node_state: Arc<NodeState>,
    peers: Arc<Peers>,
    election: Arc<ElectionEngine>,
    tuning: DetectorTuning,
    clock: C,
    stop_check: stop_signal::StopCheck,
}

impl FailureDetector<SystemClock> {
    pub(crate) fn spawn(
        logger: slog::Logger,
        node_state: Arc<NodeState>,
        peers: Arc<Peers>,
        election: Arc<ElectionEngine>,
        tuning: DetectorTuning,
    ) -> FailureDetectorHandle {
        let (stopper, stop_check) = stop_signal::new();
        let detector = FailureDetector {
            logger,
            node_state,
            peers,
            election,
            tuning,
            clock: SystemClock,
            stop_check,
        };
        tokio::spawn(detector.run());

        FailureDetectorHandle { _stopper: stopper }
    }
}

impl<C: Clock + Send + Sync + 'static> FailureDetector<C> {
    #[cfg(test)]
    pub(crate) fn with_clock(
        logger: slog::Logger,
        node_state: Arc<NodeState>,
        peers: Arc<Peers>,
        election: Arc<ElectionEngine>,
        tuning: DetectorTuning,
        clock: C,
    ) -> (Self, FailureDetectorHandle) {
        let (stopper, stop_check) = stop_signal::new();
        let detector = FailureDetector {
            logger,
            node_state,
            peers,
            election,
            tuning,
            clock,
            stop_check,
        };

        (detector, FailureDetectorHandle { _stopper: stopper })
    }

    pub(crate) async fn run(mut self) {
        let mut consecutive_failures: u32 = 0;

        loop {
            self.clock.sleep(self.tuning.heartbeat_interval).await;
            if self.stop_check.should_stop() {
                return;
            }

            if self.node_state.is_leader() {
                consecutive_failures = 0;
                continue;
            }

            let leader_id = match self.node_state.current_leader() {
                Some(id) => id,
                None => {
                    consecutive_failures = 0;
                    self.election.clone().trigger();
                    continue;
                }
            };

            if self.probe_leader(leader_id).await {
                consecutive_failures = 0;
                continue;
            }

            consecutive_failures += 1;
            slog::warn!(
                self.logger,
                "Leader {} missed heartbeat ({}/{})",
                leader_id,
                consecutive_failures,
                self.tuning.failure_threshold
            );

            if consecutive_failures >= self.tuning.failure_threshold {
                consecutive_failures = 0;
                slog::warn!(self.logger, "Declaring leader {} dead, starting election", leader_id);
                self.node_state.clear_leader();
                self.election.clone().trigger();
            }
        }
    }

    async fn probe_leader(&self, leader_id: crate::cluster::NodeId) -> bool {
        let leader = match self.peers.get(leader_id) {
            Some(peer) => peer,
            // A leader id outside the membership table can't be probed.
            None => return false,
        };

        matches!(
            tokio::time::timeout(self.tuning.probe_timeout, leader.heartbeat()).await,
            Ok(Ok(()))
        )
    }
}
