//! This mod holds the library's client-facing API.
mod event_bus;
mod handle;
mod options;
mod types;
mod wiring;

pub use event_bus::NodeEventListener;
pub use event_bus::RoleEvent;
pub use handle::ScribeNode;
pub use options::NodeOptions;
pub use types::MemberInfo;
pub use wiring::load_cluster_file;
pub use wiring::try_create_node;
pub use wiring::NodeConfig;
pub use wiring::NodeCreationError;
