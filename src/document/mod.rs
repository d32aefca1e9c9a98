mod document;
mod operation;
mod store;
mod vector_clock;

pub use document::DocumentSnapshot;
pub use operation::Operation;
pub use operation::OperationKind;
pub use vector_clock::CausalOrdering;
pub use vector_clock::VectorClock;

pub(crate) use document::CommitError;
pub(crate) use document::Document;
pub(crate) use store::StoreError;
