mod api;
mod cluster;
mod document;
mod node;
mod server;
mod grpc {
    include!("../generated/scribe.rs");
}

pub use api::load_cluster_file;
pub use api::try_create_node;
pub use api::MemberInfo;
pub use api::NodeConfig;
pub use api::NodeCreationError;
pub use api::NodeEventListener;
pub use api::NodeOptions;
pub use api::RoleEvent;
pub use api::ScribeNode;
pub use cluster::ClusterFileError;
pub use document::CausalOrdering;
pub use document::DocumentSnapshot;
pub use document::Operation;
pub use document::OperationKind;
pub use document::VectorClock;
pub use node::ExecuteError;
