use std::convert::TryFrom;
use tokio::time::Duration;

/// Tunables for one node. Every field defaults to a value that works for a
/// LAN cluster; tests shrink them for fast convergence.
#[derive(Clone, Default)]
pub struct NodeOptions {
    /// Failure detector wakeup interval.
    pub heartbeat_interval: Option<Duration>,
    /// Consecutive missed leader heartbeats before re-electing.
    pub failure_threshold: Option<u32>,
    /// Bound on replication pushes, forwarded writes and victory fan-out.
    pub peer_rpc_timeout: Option<Duration>,
    /// Bound on election liveness probes and state queries.
    pub election_probe_timeout: Option<Duration>,
    /// How long an electing node waits for a higher node's declaration.
    pub leader_announcement_wait: Option<Duration>,
    /// Bounded election retries before handing back to the failure detector.
    pub election_retry_attempts: Option<u32>,
    /// Operations between snapshots (bounds WAL growth).
    pub snapshot_threshold: Option<usize>,
    /// Per-client buffered updates before the client is dropped as stuck.
    pub client_update_buffer: Option<usize>,
}

#[derive(Clone)]
pub(crate) struct ValidatedOptions {
    pub heartbeat_interval: Duration,
    pub failure_threshold: u32,
    pub peer_rpc_timeout: Duration,
    pub election_probe_timeout: Duration,
    pub leader_announcement_wait: Duration,
    pub election_retry_attempts: u32,
    pub snapshot_threshold: usize,
    pub client_update_buffer: usize,
}

impl ValidatedOptions {
    fn validate(&self) -> Result<(), &'static str> {
        if self.heartbeat_interval.is_zero() {
            return Err("Heartbeat interval must be non-zero");
        }
        if self.failure_threshold == 0 {
            return Err("Failure threshold must be non-zero");
        }
        if self.peer_rpc_timeout.is_zero() {
            return Err("Peer RPC timeout must be non-zero");
        }
        if self.election_probe_timeout.is_zero() {
            return Err("Election probe timeout must be non-zero");
        }
        if self.election_retry_attempts == 0 {
            return Err("Election retry attempts must be non-zero");
        }
        if self.snapshot_threshold == 0 {
            return Err("Snapshot threshold must be non-zero");
        }
        if self.client_update_buffer == 0 {
            return Err("Client update buffer must be non-zero");
        }
        if self.election_probe_timeout >= self.leader_announcement_wait {
            return Err("Election probe timeout must be less than the leader announcement wait");
        }

        Ok(())
    }
}

impl TryFrom<NodeOptions> for ValidatedOptions {
    type Error = &'static str;

    fn try_from(options: NodeOptions) -> Result<Self, Self::Error> {
        let values = ValidatedOptions {
            heartbeat_interval: options.heartbeat_interval.unwrap_or(Duration::from_millis(500)),
            failure_threshold: options.failure_threshold.unwrap_or(2),
            peer_rpc_timeout: options.peer_rpc_timeout.unwrap_or(Duration::from_millis(1500)),
            election_probe_timeout: options.election_probe_timeout.unwrap_or(Duration::from_millis(300)),
            leader_announcement_wait: options.leader_announcement_wait.unwrap_or(Duration::from_secs(2)),
            election_retry_attempts: options.election_retry_attempts.unwrap_or(3),
            snapshot_threshold: options.snapshot_threshold.unwrap_or(50),
            client_update_buffer: options.client_update_buffer.unwrap_or(64),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let validated = ValidatedOptions::try_from(NodeOptions::default()).unwrap();

        assert_eq!(validated.heartbeat_interval, Duration::from_millis(500));
        assert_eq!(validated.failure_threshold, 2);
        assert_eq!(validated.snapshot_threshold, 50);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let options = NodeOptions {
            heartbeat_interval: Some(Duration::from_millis(0)),
            ..NodeOptions::default()
        };

        assert!(ValidatedOptions::try_from(options).is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let options = NodeOptions {
            failure_threshold: Some(0),
            ..NodeOptions::default()
        };

        assert!(ValidatedOptions::try_from(options).is_err());
    }

    #[test]
    fn probe_timeout_must_undercut_announcement_wait() {
        let options = NodeOptions {
            election_probe_timeout: Some(Duration::from_secs(3)),
            leader_announcement_wait: Some(Duration::from_secs(2)),
            ..NodeOptions::default()
        };

        assert!(ValidatedOptions::try_from(options).is_err());
    }
}
