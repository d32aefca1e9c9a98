use crate::node::{RoleListener, RoleSnapshot};

/// The role this node holds, as observed by the application. Intermediate
/// transitions between two reads are clobbered into the most recent one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoleEvent {
    Leader,
    Backup { leader_id: Option<u32> },
}

pub struct NodeEventListener {
    role_listener: RoleListener,
}

impl NodeEventListener {
    pub(crate) fn new(role_listener: RoleListener) -> Self {
        NodeEventListener { role_listener }
    }

    pub fn current_role(&self) -> RoleEvent {
        RoleEvent::from(self.role_listener.current())
    }

    /// The next role change, or None once the node has shut down.
    pub async fn next_event(&mut self) -> Option<RoleEvent> {
        self.role_listener.next().await.map(RoleEvent::from)
    }
}

// ------- Conversions --------

impl From<RoleSnapshot> for RoleEvent {
    fn from(snapshot: RoleSnapshot) -> Self {
        match snapshot {
            RoleSnapshot::Leader => RoleEvent::Leader,
            RoleSnapshot::Backup { leader } => RoleEvent::Backup {
                leader_id: leader.map(|id| id.as_u32()),
            },
        }
    }
}
