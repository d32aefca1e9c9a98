use crate::api::event_bus::NodeEventListener;
use crate::document::{DocumentSnapshot, Operation};
use crate::node::{ExecuteError, FailureDetectorHandle, ReplicationCoordinator};
use crate::server::RpcServerShutdownHandle;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A running node. Dropping it stops the RPC server and the failure
/// detector; background fan-out tasks drain on their own.
pub struct ScribeNode {
    /// Role-change feed for the application.
    pub events: NodeEventListener,
    coordinator: Arc<ReplicationCoordinator>,
    _server_shutdown: RpcServerShutdownHandle,
    _failure_detector: FailureDetectorHandle,
}

impl ScribeNode {
    pub(crate) fn new(
        events: NodeEventListener,
        coordinator: Arc<ReplicationCoordinator>,
        server_shutdown: RpcServerShutdownHandle,
        failure_detector: FailureDetectorHandle,
    ) -> Self {
        ScribeNode {
            events,
            coordinator,
            _server_shutdown: server_shutdown,
            _failure_detector: failure_detector,
        }
    }

    /// Submit an edit through this node: applied and replicated if it is the
    /// leader, forwarded to the leader otherwise.
    pub async fn execute(&self, operation: Operation) -> Result<(), ExecuteError> {
        self.coordinator.execute_operation(operation).await
    }

    /// Subscribe a local client. The first received message is the document
    /// state as of subscription.
    pub fn subscribe(&self, username: impl Into<String>) -> mpsc::Receiver<DocumentSnapshot> {
        self.coordinator.register_client(username.into())
    }

    pub fn current_snapshot(&self) -> DocumentSnapshot {
        self.coordinator.current_state()
    }
}
