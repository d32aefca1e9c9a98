use crate::api::event_bus::NodeEventListener;
use crate::api::handle::ScribeNode;
use crate::api::options::{NodeOptions, ValidatedOptions};
use crate::api::types::MemberInfo;
use crate::cluster::{self, ClusterError, ClusterFileError, ClusterMembers, NodeId, NodeMetadata};
use crate::document::{Document, StoreError};
use crate::node::{
    ClientNotifier, DetectorTuning, ElectionEngine, ElectionTuning, FailureDetector, LeadershipHooks, NodeState,
    Peers, ReplicationCoordinator,
};
use crate::server;
use crate::server::RpcServer;
use rand::Rng;
use std::convert::TryFrom;
use std::net::{SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::Duration;

pub struct NodeConfig {
    pub my_node_id: u32,
    pub cluster_members: Vec<MemberInfo>,
    /// Root under which this node keeps `node-<id>/` with its snapshot and WAL.
    pub data_directory: PathBuf,
    pub info_logger: slog::Logger,
    pub options: NodeOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeCreationError {
    #[error("Invalid cluster info: {0}")]
    InvalidClusterInfo(#[from] ClusterError),
    #[error("Illegal options for configuring node: {0}")]
    IllegalOptions(String),
    #[error("Storage initialization failure: {0}")]
    Storage(#[from] StoreError),
}

/// Read a `id=host:port`-per-line membership file.
pub fn load_cluster_file(path: &Path) -> Result<Vec<MemberInfo>, ClusterFileError> {
    let members = cluster::load_cluster_file(path)?;
    Ok(members.iter().map(MemberInfo::from).collect())
}

/// Assemble and start a node: recover the document from disk, serve the RPC
/// surface, start heartbeat monitoring, and schedule the startup election.
pub async fn try_create_node(config: NodeConfig) -> Result<ScribeNode, NodeCreationError> {
    let options =
        ValidatedOptions::try_from(config.options).map_err(|e| NodeCreationError::IllegalOptions(e.to_string()))?;

    let my_id = NodeId::new(config.my_node_id);
    let members: Vec<NodeMetadata> = config.cluster_members.into_iter().map(NodeMetadata::from).collect();
    let cluster = ClusterMembers::try_new(my_id, members)?;

    let logger = config.info_logger;
    let data_dir = config.data_directory.join(format!("node-{}", my_id));

    let document = Arc::new(Document::recover(
        logger.clone(),
        &data_dir,
        my_id.as_index(),
        cluster.clock_width(),
        options.snapshot_threshold,
    )?);

    let node_state = Arc::new(NodeState::new(my_id));
    let role_listener = node_state.listener();

    let notifier = Arc::new(ClientNotifier::new(
        logger.clone(),
        node_state.clone(),
        options.client_update_buffer,
    ));
    let peers = Arc::new(Peers::connect(&cluster));

    let coordinator = Arc::new(ReplicationCoordinator::new(
        logger.clone(),
        document,
        notifier,
        node_state.clone(),
        peers.clone(),
        options.peer_rpc_timeout,
    ));

    let election = Arc::new(ElectionEngine::new(
        logger.clone(),
        node_state.clone(),
        peers.clone(),
        coordinator.clone() as Arc<dyn LeadershipHooks>,
        ElectionTuning {
            probe_timeout: options.election_probe_timeout,
            announcement_wait: options.leader_announcement_wait,
            retry_attempts: options.election_retry_attempts,
            peer_rpc_timeout: options.peer_rpc_timeout,
        },
    ));

    let (server_shutdown_handle, server_shutdown_signal) = server::shutdown_signal();
    let my_server_addr = rpc_server_addr(cluster.my_info());
    let rpc_server = RpcServer::new(logger.clone(), coordinator.clone());
    tokio::spawn(rpc_server.run(my_server_addr, server_shutdown_signal));

    let failure_detector_handle = FailureDetector::spawn(
        logger.clone(),
        node_state,
        peers,
        election.clone(),
        DetectorTuning {
            heartbeat_interval: options.heartbeat_interval,
            probe_timeout: options.election_probe_timeout,
            failure_threshold: options.failure_threshold,
        },
    );

    spawn_startup_election(election, options.heartbeat_interval);

    Ok(ScribeNode::new(
        NodeEventListener::new(role_listener),
        coordinator,
        server_shutdown_handle,
        failure_detector_handle,
    ))
}

/// A small random delay keeps simultaneously-booted nodes from all probing
/// at the same instant.
fn spawn_startup_election(election: Arc<ElectionEngine>, max_jitter: Duration) {
    let jitter = rand::thread_rng().gen_range(Duration::from_millis(0)..max_jitter);
    tokio::spawn(async move {
        tokio::time::sleep(jitter).await;
        election.run_election().await;
    });
}

fn rpc_server_addr(member_info: &NodeMetadata) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(member_info.ip_addr, member_info.rpc_port))
}
