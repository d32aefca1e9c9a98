use crate::document::operation::{Edit, MalformedOperationError, Operation};
use crate::document::store::{DocumentStore, StoreError};
use crate::document::vector_clock::VectorClock;
use crate::grpc::{ProtoDocumentSnapshot, ProtoDocumentUpdate, ProtoVectorClock};
use std::cmp;
use std::convert::TryFrom;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// An immutable point-in-time copy of the document, used for peer state
/// transfer, client updates, and the on-disk snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    pub content: String,
    pub clock: VectorClock,
}

/// The shared document: a text buffer plus the vector clock tracking its
/// causal history, with a WAL + snapshot store underneath.
///
/// All mutation happens under the write half of the state lock, so an
/// operation is applied all-or-nothing. The store mutex is taken before the
/// state lock on the commit and snapshot paths, which keeps a snapshot from
/// clearing a WAL record whose operation is not yet in the captured state.
/// Neither lock is ever held across an await.
pub(crate) struct Document {
    logger: slog::Logger,
    self_index: usize,
    state: RwLock<DocumentState>,
    store: Mutex<DocumentStore>,
}

struct DocumentState {
    content: String,
    clock: VectorClock,
}

impl Document {
    /// Open the node's document, reconstructing pre-crash state from disk:
    /// latest snapshot first, then WAL replay in order.
    pub(crate) fn recover(
        logger: slog::Logger,
        data_dir: &Path,
        self_index: usize,
        cluster_size: usize,
        snapshot_threshold: usize,
    ) -> Result<Self, StoreError> {
        let mut store = DocumentStore::open(logger.clone(), data_dir, snapshot_threshold)?;

        let mut state = DocumentState {
            content: String::new(),
            clock: VectorClock::new(cluster_size),
        };

        if let Some(snapshot) = store.load_snapshot()? {
            slog::info!(logger, "Recovered snapshot with clock {}", snapshot.clock);
            state.content = snapshot.content;
            state.clock.copy_from(&snapshot.clock);
        }

        let replayed = store.replay_wal()?;
        if !replayed.is_empty() {
            slog::info!(logger, "Replaying {} WAL operation(s)", replayed.len());
        }
        for operation in &replayed {
            match operation.edit() {
                Ok(edit) => Self::apply_locked(&mut state, operation, &edit, self_index),
                // WAL records are validated before they are written, so this
                // only fires if the encoding conventions changed underneath us.
                Err(e) => slog::warn!(logger, "Skipping unappliable WAL operation: {}", e),
            }
        }

        Ok(Document {
            logger,
            self_index,
            state: RwLock::new(state),
            store: Mutex::new(store),
        })
    }

    /// Leader write path: durably append to the WAL, then apply. The WAL
    /// append must succeed before the operation becomes visible; a failed
    /// append rejects the operation outright.
    pub(crate) fn commit_operation(&self, operation: &Operation) -> Result<DocumentSnapshot, CommitError> {
        let edit = operation.edit()?;

        let mut store = self.store.lock().expect("document store mutex poisoned");
        store.append_operation(operation)?;

        let mut state = self.state.write().expect("document state lock poisoned");
        Self::apply_locked(&mut state, operation, &edit, self.self_index);

        Ok(DocumentSnapshot {
            content: state.content.clone(),
            clock: state.clock.clone(),
        })
    }

    pub(crate) fn snapshot(&self) -> DocumentSnapshot {
        let state = self.state.read().expect("document state lock poisoned");
        DocumentSnapshot {
            content: state.content.clone(),
            clock: state.clock.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn content(&self) -> String {
        self.state.read().expect("document state lock poisoned").content.clone()
    }

    #[cfg(test)]
    pub(crate) fn clock_copy(&self) -> VectorClock {
        self.state.read().expect("document state lock poisoned").clock.clone()
    }

    /// Wholesale replacement from an authoritative sync. Discards local
    /// divergent history; the single-writer model makes that correct.
    pub(crate) fn overwrite_state(&self, snapshot: &DocumentSnapshot) {
        let mut state = self.state.write().expect("document state lock poisoned");
        state.content = snapshot.content.clone();
        state.clock.copy_from(&snapshot.clock);
    }

    /// Capture a consistent (content, clock) pair and persist it, clearing
    /// the WAL it subsumes.
    pub(crate) fn save_snapshot(&self) -> Result<(), StoreError> {
        let mut store = self.store.lock().expect("document store mutex poisoned");
        let snapshot = self.snapshot();
        store.persist_snapshot(&snapshot)
    }

    /// Snapshot if the operation-count threshold has been reached. A failed
    /// snapshot write is logged and swallowed: the triggering operation's
    /// WAL record is already durable, so nothing acknowledged is lost.
    pub(crate) fn maybe_snapshot(&self) {
        let mut store = self.store.lock().expect("document store mutex poisoned");
        if !store.should_snapshot() {
            return;
        }

        let snapshot = self.snapshot();
        if let Err(e) = store.persist_snapshot(&snapshot) {
            slog::warn!(self.logger, "Snapshot write failed, WAL keeps growing: {}", e);
        }
    }

    fn apply_locked(state: &mut DocumentState, operation: &Operation, edit: &Edit<'_>, self_index: usize) {
        let char_len = state.content.chars().count();
        let position = clamp_position(operation.position, char_len);

        match edit {
            Edit::Insert { text } => {
                let at = byte_index(&state.content, position);
                state.content.insert_str(at, text);
            }
            Edit::Delete { count } => {
                delete_chars(&mut state.content, position, *count, char_len);
            }
            Edit::Replace { delete_count, text } => {
                delete_chars(&mut state.content, position, *delete_count, char_len);
                let at = byte_index(&state.content, position);
                state.content.insert_str(at, text);
            }
        }

        // Receipt of the operation's causal history, then the application
        // itself as a local event.
        if let Some(clock) = &operation.clock {
            state.clock.merge(clock);
        }
        state.clock.tick(self_index);
    }
}

/// Clamp into `[0, char_len]`.
fn clamp_position(position: i64, char_len: usize) -> usize {
    if position < 0 {
        0
    } else {
        cmp::min(position as usize, char_len)
    }
}

/// Byte offset of the `char_index`-th character, or the end of the string.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map(|(i, _)| i).unwrap_or_else(|| s.len())
}

/// Remove up to `count` characters starting at `position` (a no-op past end).
fn delete_chars(content: &mut String, position: usize, count: usize, char_len: usize) {
    let end = cmp::min(position + count, char_len);
    if end > position {
        let start_byte = byte_index(content, position);
        let end_byte = byte_index(content, end);
        content.replace_range(start_byte..end_byte, "");
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CommitError {
    #[error(transparent)]
    Malformed(#[from] MalformedOperationError),
    #[error("write-ahead log append failed: {0}")]
    Durability(#[from] StoreError),
}

// ------- Wire conversions --------

impl From<&DocumentSnapshot> for ProtoDocumentSnapshot {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        ProtoDocumentSnapshot {
            content: snapshot.content.clone(),
            clock: Some(ProtoVectorClock::from(&snapshot.clock)),
        }
    }
}

impl From<&DocumentSnapshot> for ProtoDocumentUpdate {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        ProtoDocumentUpdate {
            content: snapshot.content.clone(),
            clock: Some(ProtoVectorClock::from(&snapshot.clock)),
        }
    }
}

impl TryFrom<ProtoDocumentSnapshot> for DocumentSnapshot {
    type Error = MissingClockError;

    fn try_from(proto: ProtoDocumentSnapshot) -> Result<Self, Self::Error> {
        let clock = proto.clock.ok_or(MissingClockError)?;
        Ok(DocumentSnapshot {
            content: proto.content,
            clock: VectorClock::from(clock),
        })
    }
}

impl TryFrom<ProtoDocumentUpdate> for DocumentSnapshot {
    type Error = MissingClockError;

    fn try_from(proto: ProtoDocumentUpdate) -> Result<Self, Self::Error> {
        let clock = proto.clock.ok_or(MissingClockError)?;
        Ok(DocumentSnapshot {
            content: proto.content,
            clock: VectorClock::from(clock),
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("snapshot on the wire is missing its vector clock")]
pub struct MissingClockError;
