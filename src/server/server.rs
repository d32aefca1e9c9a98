use crate::cluster::NodeId;
use crate::document::{DocumentSnapshot, Operation};
use crate::grpc::grpc_scribe_server::{GrpcScribe, GrpcScribeServer};
use crate::grpc::{
    proto_execute_operation_error, proto_execute_operation_result, ProtoApplyReplicationReply,
    ProtoApplyReplicationReq, ProtoBecomeLeaderReply, ProtoBecomeLeaderReq, ProtoDeclareLeaderReply,
    ProtoDeclareLeaderReq, ProtoDocumentSnapshot, ProtoDocumentUpdate, ProtoDurabilityFault,
    ProtoExecuteOperationError, ProtoExecuteOperationReq, ProtoExecuteOperationResult, ProtoExecuteOperationSuccess,
    ProtoGetCurrentStateReq, ProtoHeartbeatReply, ProtoHeartbeatReq, ProtoNoLeader, ProtoRegisterClientReq,
};
use crate::node::{ExecuteError, ReplicationCoordinator};
use crate::server::RpcServerShutdownSignal;
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// RpcServer is the node's gRPC surface: it validates the wire input,
/// converts to domain types, and hands off to the coordinator.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    coordinator: Arc<ReplicationCoordinator>,
}

impl RpcServer {
    pub(crate) fn new(logger: slog::Logger, coordinator: Arc<ReplicationCoordinator>) -> Self {
        RpcServer { logger, coordinator }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcScribeServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal)
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    fn convert_operation(rpc_request: ProtoExecuteOperationReq) -> Result<Operation, Status> {
        let proto_operation = rpc_request
            .operation
            .ok_or_else(|| Status::invalid_argument("ExecuteOperation request without an operation"))?;

        Operation::try_from(proto_operation).map_err(|e| Status::invalid_argument(e.to_string()))
    }

    fn convert_execute_result(app_result: Result<(), ExecuteError>) -> Result<ProtoExecuteOperationResult, Status> {
        match app_result {
            Ok(()) => Ok(ProtoExecuteOperationResult {
                result: Some(proto_execute_operation_result::Result::Ok(ProtoExecuteOperationSuccess {
                    // Empty
                })),
            }),
            Err(ExecuteError::NoLeader) => Ok(ProtoExecuteOperationResult {
                result: Some(proto_execute_operation_result::Result::Err(ProtoExecuteOperationError {
                    err: Some(proto_execute_operation_error::Err::NoLeader(ProtoNoLeader {
                        // Empty
                    })),
                })),
            }),
            Err(ExecuteError::Durability(message)) => Ok(ProtoExecuteOperationResult {
                result: Some(proto_execute_operation_result::Result::Err(ProtoExecuteOperationError {
                    err: Some(proto_execute_operation_error::Err::Durability(ProtoDurabilityFault {
                        message,
                    })),
                })),
            }),
            Err(ExecuteError::InvalidOperation(message)) => Err(Status::invalid_argument(message)),
        }
    }

    fn convert_snapshot(proto: Option<ProtoDocumentSnapshot>) -> Result<DocumentSnapshot, Status> {
        let proto = proto.ok_or_else(|| Status::invalid_argument("Request without a state snapshot"))?;

        DocumentSnapshot::try_from(proto).map_err(|e| Status::invalid_argument(e.to_string()))
    }
}

#[async_trait::async_trait]
impl GrpcScribe for RpcServer {
    async fn execute_operation(
        &self,
        rpc_request_wrapped: Request<ProtoExecuteOperationReq>,
    ) -> Result<Response<ProtoExecuteOperationResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        let operation = Self::convert_operation(rpc_request)?;
        let app_result = self.coordinator.execute_operation(operation).await;
        let rpc_result = Self::convert_execute_result(app_result);
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    type RegisterClientStream = ReceiverStream<Result<ProtoDocumentUpdate, Status>>;

    async fn register_client(
        &self,
        rpc_request_wrapped: Request<ProtoRegisterClientReq>,
    ) -> Result<Response<Self::RegisterClientStream>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        let mut updates = self.coordinator.register_client(rpc_request.username);

        // Adapt the notifier's snapshot feed to the response stream. The
        // forwarder exits when either side hangs up.
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            while let Some(snapshot) = updates.recv().await {
                if tx.send(Ok(ProtoDocumentUpdate::from(&snapshot))).await.is_err() {
                    return;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn heartbeat(
        &self,
        _rpc_request: Request<ProtoHeartbeatReq>,
    ) -> Result<Response<ProtoHeartbeatReply>, Status> {
        self.coordinator.heartbeat();
        Ok(Response::new(ProtoHeartbeatReply {}))
    }

    async fn apply_replication(
        &self,
        rpc_request_wrapped: Request<ProtoApplyReplicationReq>,
    ) -> Result<Response<ProtoApplyReplicationReply>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        let state = Self::convert_snapshot(rpc_request.state)?;
        self.coordinator.apply_replication(state);

        Ok(Response::new(ProtoApplyReplicationReply {}))
    }

    async fn declare_leader(
        &self,
        rpc_request_wrapped: Request<ProtoDeclareLeaderReq>,
    ) -> Result<Response<ProtoDeclareLeaderReply>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        self.coordinator.declare_leader(NodeId::new(rpc_request.leader_id));

        Ok(Response::new(ProtoDeclareLeaderReply {}))
    }

    async fn become_leader(
        &self,
        rpc_request_wrapped: Request<ProtoBecomeLeaderReq>,
    ) -> Result<Response<ProtoBecomeLeaderReply>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        let state = Self::convert_snapshot(rpc_request.state)?;
        self.coordinator.become_leader(state);

        Ok(Response::new(ProtoBecomeLeaderReply {}))
    }

    async fn get_current_state(
        &self,
        _rpc_request: Request<ProtoGetCurrentStateReq>,
    ) -> Result<Response<ProtoDocumentSnapshot>, Status> {
        let state = self.coordinator.current_state();
        Ok(Response::new(ProtoDocumentSnapshot::from(&state)))
    }
}
