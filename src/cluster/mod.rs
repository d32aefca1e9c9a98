mod config_file;
mod membership;

pub use config_file::ClusterFileError;

pub(crate) use config_file::load_cluster_file;
pub(crate) use membership::ClusterError;
pub(crate) use membership::ClusterMembers;
pub(crate) use membership::NodeId;
pub(crate) use membership::NodeMetadata;
