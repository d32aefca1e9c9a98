use crate::cluster;
use crate::cluster::NodeMetadata;
use std::net::Ipv4Addr;

/// One cluster member as the application supplies it: the node's id doubles
/// as its bully-election rank and its vector clock slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberInfo {
    pub node_id: u32,
    pub ip_addr: Ipv4Addr,
    pub rpc_port: u16,
}

impl From<MemberInfo> for NodeMetadata {
    fn from(member_info: MemberInfo) -> Self {
        NodeMetadata {
            id: cluster::NodeId::new(member_info.node_id),
            ip_addr: member_info.ip_addr,
            rpc_port: member_info.rpc_port,
        }
    }
}

impl From<&NodeMetadata> for MemberInfo {
    fn from(metadata: &NodeMetadata) -> Self {
        MemberInfo {
            node_id: metadata.id.as_u32(),
            ip_addr: metadata.ip_addr,
            rpc_port: metadata.rpc_port,
        }
    }
}
