use crate::cluster::{ClusterMembers, NodeId, NodeMetadata};
use crate::document::{DocumentSnapshot, Operation};
use crate::grpc::grpc_scribe_client::GrpcScribeClient;
use crate::grpc::{
    proto_execute_operation_error, proto_execute_operation_result, ProtoApplyReplicationReq, ProtoBecomeLeaderReq,
    ProtoDeclareLeaderReq, ProtoDocumentSnapshot, ProtoExecuteOperationReq, ProtoGetCurrentStateReq,
    ProtoHeartbeatReq, ProtoOperation,
};
use crate::node::coordinator::ExecuteError;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::sync::Arc;
use tonic::transport::{Channel, Endpoint};

/// The abstract remote stub for one peer node. Every method maps to one RPC
/// on the peer's service surface; failures of any kind come back as
/// `PeerUnreachableError`, which callers treat as "that peer is down right
/// now". Timeouts are the caller's job (wrap the future).
#[async_trait::async_trait]
pub(crate) trait Peer: Send + Sync {
    async fn heartbeat(&self) -> Result<(), PeerUnreachableError>;

    /// Forward a client operation to this peer (used backup -> leader). The
    /// outer error is transport-level; the inner result is the peer's own
    /// verdict on the write.
    async fn forward_operation(&self, operation: &Operation)
        -> Result<Result<(), ExecuteError>, PeerUnreachableError>;

    async fn apply_replication(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError>;

    async fn declare_leader(&self, leader_id: NodeId) -> Result<(), PeerUnreachableError>;

    async fn become_leader(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError>;

    async fn current_state(&self) -> Result<DocumentSnapshot, PeerUnreachableError>;
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("Peer {peer_id} is unreachable: {reason}")]
pub(crate) struct PeerUnreachableError {
    pub peer_id: NodeId,
    pub reason: String,
}

/// tonic-backed `Peer`. The channel is established lazily on first use and
/// cached; any transport failure drops the cache so the next call redials.
pub(crate) struct GrpcPeer {
    id: NodeId,
    url: String,
    cached_client: tokio::sync::Mutex<Option<GrpcScribeClient<Channel>>>,
}

impl GrpcPeer {
    pub(crate) fn new(metadata: &NodeMetadata) -> Self {
        GrpcPeer {
            id: metadata.id,
            url: format!("http://{}:{}", metadata.ip_addr, metadata.rpc_port),
            cached_client: tokio::sync::Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<GrpcScribeClient<Channel>, PeerUnreachableError> {
        let mut cached = self.cached_client.lock().await;
        if let Some(client) = cached.as_ref() {
            return Ok(client.clone());
        }

        let endpoint = Endpoint::from_shared(self.url.clone()).map_err(|e| self.unreachable(e.to_string()))?;
        let connection = endpoint
            .connect()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let client = GrpcScribeClient::new(connection);
        cached.replace(client.clone());
        Ok(client)
    }

    async fn drop_cached_client(&self) {
        self.cached_client.lock().await.take();
    }

    fn unreachable(&self, reason: String) -> PeerUnreachableError {
        PeerUnreachableError {
            peer_id: self.id,
            reason,
        }
    }

    async fn rpc_failed(&self, status: tonic::Status) -> PeerUnreachableError {
        self.drop_cached_client().await;
        self.unreachable(status.to_string())
    }
}

#[async_trait::async_trait]
impl Peer for GrpcPeer {
    async fn heartbeat(&self) -> Result<(), PeerUnreachableError> {
        let mut client = self.client().await?;
        match client.heartbeat(ProtoHeartbeatReq {}).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.rpc_failed(status).await),
        }
    }

    async fn forward_operation(
        &self,
        operation: &Operation,
    ) -> Result<Result<(), ExecuteError>, PeerUnreachableError> {
        let mut client = self.client().await?;
        let request = ProtoExecuteOperationReq {
            operation: Some(ProtoOperation::from(operation)),
        };

        let reply = match client.execute_operation(request).await {
            Ok(reply) => reply.into_inner(),
            Err(status) => return Err(self.rpc_failed(status).await),
        };

        match reply.result {
            Some(proto_execute_operation_result::Result::Ok(_)) => Ok(Ok(())),
            Some(proto_execute_operation_result::Result::Err(err)) => match err.err {
                Some(proto_execute_operation_error::Err::NoLeader(_)) => Ok(Err(ExecuteError::NoLeader)),
                Some(proto_execute_operation_error::Err::Durability(fault)) => {
                    Ok(Err(ExecuteError::Durability(fault.message)))
                }
                None => Err(self.unreachable("peer sent an empty error".to_string())),
            },
            None => Err(self.unreachable("peer sent an empty result".to_string())),
        }
    }

    async fn apply_replication(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError> {
        let mut client = self.client().await?;
        let request = ProtoApplyReplicationReq {
            state: Some(ProtoDocumentSnapshot::from(state)),
        };

        match client.apply_replication(request).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.rpc_failed(status).await),
        }
    }

    async fn declare_leader(&self, leader_id: NodeId) -> Result<(), PeerUnreachableError> {
        let mut client = self.client().await?;
        let request = ProtoDeclareLeaderReq {
            leader_id: leader_id.as_u32(),
        };

        match client.declare_leader(request).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.rpc_failed(status).await),
        }
    }

    async fn become_leader(&self, state: &DocumentSnapshot) -> Result<(), PeerUnreachableError> {
        let mut client = self.client().await?;
        let request = ProtoBecomeLeaderReq {
            state: Some(ProtoDocumentSnapshot::from(state)),
        };

        match client.become_leader(request).await {
            Ok(_) => Ok(()),
            Err(status) => Err(self.rpc_failed(status).await),
        }
    }

    async fn current_state(&self) -> Result<DocumentSnapshot, PeerUnreachableError> {
        let mut client = self.client().await?;

        let reply = match client.get_current_state(ProtoGetCurrentStateReq {}).await {
            Ok(reply) => reply.into_inner(),
            Err(status) => return Err(self.rpc_failed(status).await),
        };

        DocumentSnapshot::try_from(reply).map_err(|e| self.unreachable(e.to_string()))
    }
}

/// This node's view of every other cluster member, keyed and ordered by id
/// so the bully protocol's "all higher ids" scan is a range walk.
pub(crate) struct Peers {
    by_id: BTreeMap<NodeId, Arc<dyn Peer>>,
}

impl Peers {
    pub(crate) fn connect(members: &ClusterMembers) -> Self {
        let by_id = members
            .peers()
            .map(|metadata| (metadata.id, Arc::new(GrpcPeer::new(metadata)) as Arc<dyn Peer>))
            .collect();

        Peers { by_id }
    }

    #[cfg(test)]
    pub(crate) fn from_map(by_id: BTreeMap<NodeId, Arc<dyn Peer>>) -> Self {
        Peers { by_id }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<Arc<dyn Peer>> {
        self.by_id.get(&id).cloned()
    }

    pub(crate) fn all(&self) -> Vec<(NodeId, Arc<dyn Peer>)> {
        self.by_id.iter().map(|(id, peer)| (*id, peer.clone())).collect()
    }

    pub(crate) fn higher_than(&self, id: NodeId) -> Vec<(NodeId, Arc<dyn Peer>)> {
        use std::ops::Bound;
        self.by_id
            .range((Bound::Excluded(id), Bound::Unbounded))
            .map(|(peer_id, peer)| (*peer_id, peer.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn metadata(id: u32, port: u16) -> NodeMetadata {
        NodeMetadata {
            id: NodeId::new(id),
            ip_addr: Ipv4Addr::LOCALHOST,
            rpc_port: port,
        }
    }

    #[test]
    fn higher_than_walks_ids_above_mine() {
        let members = ClusterMembers::try_new(
            NodeId::new(1),
            vec![metadata(0, 9000), metadata(1, 9001), metadata(2, 9002), metadata(3, 9003)],
        )
        .unwrap();
        let peers = Peers::connect(&members);

        let higher: Vec<u32> = peers
            .higher_than(NodeId::new(1))
            .into_iter()
            .map(|(id, _)| id.as_u32())
            .collect();

        assert_eq!(higher, vec![2, 3]);
        assert_eq!(peers.all().len(), 3);
        assert!(peers.get(NodeId::new(1)).is_none());
        assert!(peers.get(NodeId::new(0)).is_some());
    }
}
