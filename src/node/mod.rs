mod coordinator;
mod election;
mod failure_detector;
#[cfg(test)]
mod fake_peer;
mod node_state;
mod notifier;
mod peer_client;
mod stop_signal;
mod time;

pub use coordinator::ExecuteError;

pub(crate) use coordinator::LeadershipHooks;
pub(crate) use coordinator::ReplicationCoordinator;
pub(crate) use election::ElectionEngine;
pub(crate) use election::ElectionTuning;
pub(crate) use failure_detector::DetectorTuning;
pub(crate) use failure_detector::FailureDetector;
pub(crate) use failure_detector::FailureDetectorHandle;
pub(crate) use node_state::NodeState;
pub(crate) use node_state::RoleListener;
pub(crate) use node_state::RoleSnapshot;
pub(crate) use notifier::ClientNotifier;
pub(crate) use peer_client::Peers;
