use crate::cluster::NodeId;
use std::sync::Mutex;
use tokio::sync::watch;

/// The role this node believes it holds, published on every transition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum RoleSnapshot {
    Leader,
    Backup { leader: Option<NodeId> },
}

/// Single source of truth for this node's role and the id of the leader it
/// currently believes in. All transitions are serialized by the mutex, so
/// role changes are linearizable. Invariant: leader role implies
/// `current_leader == Some(my_id)`.
pub(crate) struct NodeState {
    my_id: NodeId,
    inner: Mutex<RoleInner>,
    notifier: watch::Sender<RoleSnapshot>,
    listener_prototype: watch::Receiver<RoleSnapshot>,
}

struct RoleInner {
    is_leader: bool,
    current_leader: Option<NodeId>,
}

impl NodeState {
    pub(crate) fn new(my_id: NodeId) -> Self {
        let initial = RoleSnapshot::Backup { leader: None };
        let (notifier, listener_prototype) = watch::channel(initial);

        NodeState {
            my_id,
            inner: Mutex::new(RoleInner {
                is_leader: false,
                current_leader: None,
            }),
            notifier,
            listener_prototype,
        }
    }

    pub(crate) fn my_id(&self) -> NodeId {
        self.my_id
    }

    pub(crate) fn is_leader(&self) -> bool {
        self.locked().is_leader
    }

    pub(crate) fn current_leader(&self) -> Option<NodeId> {
        self.locked().current_leader
    }

    #[cfg(test)]
    pub(crate) fn role(&self) -> RoleSnapshot {
        Self::snapshot_of(&self.locked())
    }

    /// This node won an election.
    pub(crate) fn become_leader(&self) {
        let mut inner = self.locked();
        inner.is_leader = true;
        inner.current_leader = Some(self.my_id);
        self.publish(&inner);
    }

    /// Accept `id` as leader. Accepting any id, including our own, keeps the
    /// leader-implies-self invariant by construction.
    pub(crate) fn set_current_leader(&self, id: NodeId) {
        let mut inner = self.locked();
        inner.is_leader = id == self.my_id;
        inner.current_leader = Some(id);
        self.publish(&inner);
    }

    /// The failure detector gave up on the known leader.
    pub(crate) fn clear_leader(&self) {
        let mut inner = self.locked();
        inner.is_leader = false;
        inner.current_leader = None;
        self.publish(&inner);
    }

    pub(crate) fn listener(&self) -> RoleListener {
        RoleListener {
            rcv: self.listener_prototype.clone(),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, RoleInner> {
        self.inner.lock().expect("node state mutex poisoned")
    }

    fn publish(&self, inner: &RoleInner) {
        let _ = self.notifier.send(Self::snapshot_of(inner));
    }

    fn snapshot_of(inner: &RoleInner) -> RoleSnapshot {
        if inner.is_leader {
            RoleSnapshot::Leader
        } else {
            RoleSnapshot::Backup {
                leader: inner.current_leader,
            }
        }
    }
}

/// Watch-channel feed of role transitions. Intermediate transitions between
/// two reads are clobbered into the most recent one.
#[derive(Clone)]
pub(crate) struct RoleListener {
    rcv: watch::Receiver<RoleSnapshot>,
}

impl RoleListener {
    pub(crate) fn current(&self) -> RoleSnapshot {
        self.rcv.borrow().clone()
    }

    /// The next role change, or None once the node state has been dropped.
    pub(crate) async fn next(&mut self) -> Option<RoleSnapshot> {
        match self.rcv.changed().await {
            Ok(_) => Some(self.rcv.borrow().clone()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_backup_with_unknown_leader() {
        let state = NodeState::new(NodeId::new(1));

        assert!(!state.is_leader());
        assert_eq!(state.current_leader(), None);
        assert_eq!(state.role(), RoleSnapshot::Backup { leader: None });
    }

    #[test]
    fn becoming_leader_points_leader_at_self() {
        let state = NodeState::new(NodeId::new(1));
        state.become_leader();

        assert!(state.is_leader());
        assert_eq!(state.current_leader(), Some(NodeId::new(1)));
    }

    #[test]
    fn accepting_another_leader_demotes_self() {
        let state = NodeState::new(NodeId::new(1));
        state.become_leader();
        state.set_current_leader(NodeId::new(2));

        assert!(!state.is_leader());
        assert_eq!(state.current_leader(), Some(NodeId::new(2)));
    }

    #[test]
    fn accepting_own_id_is_leadership() {
        let state = NodeState::new(NodeId::new(2));
        state.set_current_leader(NodeId::new(2));

        assert!(state.is_leader());
    }

    #[test]
    fn clear_leader_resets_to_unknown() {
        let state = NodeState::new(NodeId::new(0));
        state.set_current_leader(NodeId::new(2));
        state.clear_leader();

        assert_eq!(state.role(), RoleSnapshot::Backup { leader: None });
    }

    #[tokio::test]
    async fn listener_observes_transitions() {
        let state = NodeState::new(NodeId::new(0));
        let mut listener = state.listener();

        state.set_current_leader(NodeId::new(2));
        assert_eq!(
            listener.next().await,
            Some(RoleSnapshot::Backup {
                leader: Some(NodeId::new(2))
            })
        );

        state.become_leader();
        assert_eq!(listener.next().await, Some(RoleSnapshot::Leader));
    }
}
