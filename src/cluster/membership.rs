use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// NodeId orders the cluster for the bully protocol and doubles as the node's
/// vector clock slot, so ids should be dense starting at 0.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(id: u32) -> Self {
        NodeId(id)
    }

    pub(crate) fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeMetadata {
    pub id: NodeId,
    pub ip_addr: Ipv4Addr,
    pub rpc_port: u16,
}

/// The static cluster membership table, including this node.
pub(crate) struct ClusterMembers {
    my_id: NodeId,
    members: BTreeMap<NodeId, NodeMetadata>,
}

impl ClusterMembers {
    pub(crate) fn try_new(my_id: NodeId, members: Vec<NodeMetadata>) -> Result<Self, ClusterError> {
        let mut by_id = BTreeMap::new();
        for member in members {
            let id = member.id;
            if by_id.insert(id, member).is_some() {
                return Err(ClusterError::DuplicateNodeId(id.as_u32()));
            }
        }

        if !by_id.contains_key(&my_id) {
            return Err(ClusterError::MyIdNotInCluster(my_id.as_u32()));
        }

        Ok(ClusterMembers { my_id, members: by_id })
    }

    pub(crate) fn my_info(&self) -> &NodeMetadata {
        // Presence is validated by try_new.
        &self.members[&self.my_id]
    }

    /// One vector clock slot per id up to the highest member, so sparse id
    /// assignments still index safely.
    pub(crate) fn clock_width(&self) -> usize {
        match self.members.keys().next_back() {
            Some(highest) => highest.as_index() + 1,
            None => 0,
        }
    }

    pub(crate) fn peers(&self) -> impl Iterator<Item = &NodeMetadata> {
        let my_id = self.my_id;
        self.members.values().filter(move |m| m.id != my_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ClusterError {
    #[error("Duplicate node id {0} in cluster config")]
    DuplicateNodeId(u32),
    #[error("My node id {0} is not in the cluster config")]
    MyIdNotInCluster(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u32, port: u16) -> NodeMetadata {
        NodeMetadata {
            id: NodeId::new(id),
            ip_addr: Ipv4Addr::LOCALHOST,
            rpc_port: port,
        }
    }

    #[test]
    fn peers_excludes_self() {
        let cluster =
            ClusterMembers::try_new(NodeId::new(1), vec![member(0, 9000), member(1, 9001), member(2, 9002)]).unwrap();

        let peer_ids: Vec<u32> = cluster.peers().map(|m| m.id.as_u32()).collect();
        assert_eq!(peer_ids, vec![0, 2]);
        assert_eq!(cluster.my_info().rpc_port, 9001);
    }

    #[test]
    fn clock_width_covers_sparse_ids() {
        let cluster = ClusterMembers::try_new(NodeId::new(0), vec![member(0, 9000), member(5, 9005)]).unwrap();

        assert_eq!(cluster.clock_width(), 6);
    }

    #[test]
    fn duplicate_id_rejected() {
        let result = ClusterMembers::try_new(NodeId::new(0), vec![member(0, 9000), member(0, 9001)]);
        assert!(matches!(result, Err(ClusterError::DuplicateNodeId(0))));
    }

    #[test]
    fn my_id_must_be_a_member() {
        let result = ClusterMembers::try_new(NodeId::new(7), vec![member(0, 9000), member(1, 9001)]);
        assert!(matches!(result, Err(ClusterError::MyIdNotInCluster(7))));
    }
}
