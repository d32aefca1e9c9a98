use crate::document::document::DocumentSnapshot;
use crate::document::operation::Operation;
use crate::grpc::{ProtoDocumentSnapshot, ProtoOperation};
use bytes::BytesMut;
use prost::Message;
use std::convert::TryFrom;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const WAL_FILE: &str = "wal.log";
const SNAPSHOT_FILE: &str = "snapshot.dat";
const SNAPSHOT_TMP_FILE: &str = "snapshot.dat.tmp";

// Sanity cap on a single WAL record. Anything larger is treated as corruption.
const MAX_RECORD_LEN: u32 = 16 * 1024 * 1024;

/// On-disk state for one node: an append-only WAL of operations plus a
/// point-in-time snapshot file.
///
/// WAL records are framed as `[body len: u32 LE][crc32c(body): u32 LE][body]`
/// where the body is a serialized operation. Every append is fsynced before
/// returning, so an acknowledged operation survives a crash. Replay stops at
/// the first truncated or checksum-failing record: a torn tail is an
/// unacknowledged write, not corruption of history.
///
/// Snapshots are written to a temp file, fsynced, then atomically renamed
/// into place, and a successful snapshot clears the WAL (the snapshot now
/// subsumes it).
pub(crate) struct DocumentStore {
    logger: slog::Logger,
    data_dir: PathBuf,
    wal_path: PathBuf,
    snapshot_path: PathBuf,
    wal_file: File,
    ops_since_snapshot: usize,
    snapshot_threshold: usize,
}

impl DocumentStore {
    pub(crate) fn open(logger: slog::Logger, data_dir: &Path, snapshot_threshold: usize) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir)?;

        let wal_path = data_dir.join(WAL_FILE);
        let wal_file = OpenOptions::new().create(true).append(true).open(&wal_path)?;

        Ok(DocumentStore {
            logger,
            data_dir: data_dir.to_path_buf(),
            wal_path,
            snapshot_path: data_dir.join(SNAPSHOT_FILE),
            wal_file,
            ops_since_snapshot: 0,
            snapshot_threshold,
        })
    }

    /// Durably append one operation. The caller must not make the operation
    /// visible until this returns Ok.
    pub(crate) fn append_operation(&mut self, operation: &Operation) -> Result<(), StoreError> {
        let proto = ProtoOperation::from(operation);
        let mut body = BytesMut::with_capacity(proto.encoded_len());
        proto.encode(&mut body)?;

        let len_bytes = (body.len() as u32).to_le_bytes();
        let crc_bytes = crc32c::crc32c(&body).to_le_bytes();

        self.wal_file.write_all(&len_bytes)?;
        self.wal_file.write_all(&crc_bytes)?;
        self.wal_file.write_all(&body)?;
        self.wal_file.sync_all()?;

        self.ops_since_snapshot += 1;
        Ok(())
    }

    pub(crate) fn should_snapshot(&self) -> bool {
        self.ops_since_snapshot >= self.snapshot_threshold
    }

    /// Write the snapshot atomically, then clear the WAL it subsumes.
    pub(crate) fn persist_snapshot(&mut self, snapshot: &DocumentSnapshot) -> Result<(), StoreError> {
        let proto = ProtoDocumentSnapshot::from(snapshot);
        let mut body = BytesMut::with_capacity(proto.encoded_len());
        proto.encode(&mut body)?;

        let tmp_path = self.data_dir.join(SNAPSHOT_TMP_FILE);
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(&body)?;
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, &self.snapshot_path)?;
        self.fsync_dir()?;

        self.wal_file.set_len(0)?;
        self.wal_file.sync_all()?;
        self.ops_since_snapshot = 0;

        slog::debug!(
            self.logger,
            "Persisted snapshot with clock {} ({} content bytes); WAL cleared",
            snapshot.clock,
            snapshot.content.len()
        );
        Ok(())
    }

    pub(crate) fn load_snapshot(&self) -> Result<Option<DocumentSnapshot>, StoreError> {
        let bytes = match fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let proto =
            ProtoDocumentSnapshot::decode(&bytes[..]).map_err(|e| StoreError::CorruptSnapshot(e.to_string()))?;
        let snapshot = DocumentSnapshot::try_from(proto).map_err(|e| StoreError::CorruptSnapshot(e.to_string()))?;

        Ok(Some(snapshot))
    }

    /// Read back every intact WAL record, in order. Stops at the first torn
    /// or corrupt record. Also seeds the snapshot counter, so a recovered
    /// node with a long WAL still snapshots promptly.
    pub(crate) fn replay_wal(&mut self) -> Result<Vec<Operation>, StoreError> {
        let mut reader = BufReader::new(File::open(&self.wal_path)?);
        let mut operations = Vec::new();

        loop {
            let mut header = [0u8; 8];
            if reader.read_exact(&mut header).is_err() {
                // Clean end of log, or a torn header from a mid-append crash.
                break;
            }

            let mut len_bytes = [0u8; 4];
            let mut crc_bytes = [0u8; 4];
            len_bytes.copy_from_slice(&header[0..4]);
            crc_bytes.copy_from_slice(&header[4..8]);
            let len = u32::from_le_bytes(len_bytes);
            let expected_crc = u32::from_le_bytes(crc_bytes);

            if len > MAX_RECORD_LEN {
                slog::warn!(self.logger, "WAL record claims {} bytes; stopping replay here", len);
                break;
            }

            let mut body = vec![0u8; len as usize];
            if reader.read_exact(&mut body).is_err() {
                slog::warn!(self.logger, "WAL ends with a torn record; dropping it");
                break;
            }

            if crc32c::crc32c(&body) != expected_crc {
                slog::warn!(self.logger, "WAL record failed checksum; stopping replay here");
                break;
            }

            let proto = match ProtoOperation::decode(&body[..]) {
                Ok(proto) => proto,
                Err(e) => {
                    slog::warn!(self.logger, "Undecodable WAL record ({}); stopping replay here", e);
                    break;
                }
            };
            match Operation::try_from(proto) {
                Ok(operation) => operations.push(operation),
                Err(e) => {
                    slog::warn!(self.logger, "Invalid WAL operation ({}); stopping replay here", e);
                    break;
                }
            }
        }

        self.ops_since_snapshot = operations.len();
        Ok(operations)
    }

    fn fsync_dir(&self) -> Result<(), StoreError> {
        File::open(&self.data_dir)?.sync_all()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error("snapshot file is corrupt: {0}")]
    CorruptSnapshot(String),
}
