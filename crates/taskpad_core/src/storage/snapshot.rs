//! Snapshot codec for the persisted task collection.
//!
//! # Responsibility
//! - Encode the whole collection as one JSON array under [`TASKS_KEY`].
//! - Hydrate the collection without ever failing the caller.
//!
//! # Invariants
//! - Encoding is deterministic, so re-persisting a loaded snapshot is
//!   byte-identical.
//! - Unknown record fields are ignored on read.
//! - Missing or malformed snapshots hydrate as an empty collection.

use crate::model::task::Task;
use crate::storage::durable::{DurableError, DurableResult, DurableStore};
use log::{debug, error, warn};

/// Storage key holding the serialized collection.
pub const TASKS_KEY: &str = "tasks";

/// Serializes the full collection.
pub fn encode(tasks: &[Task]) -> DurableResult<Vec<u8>> {
    serde_json::to_vec(tasks).map_err(|err| DurableError::Encode(err.to_string()))
}

/// Parses a serialized collection.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Reads the collection snapshot.
///
/// Absence, read failures and malformed content all yield an empty
/// collection; the last two are logged as recoverable errors.
pub fn load_tasks(store: &dyn DurableStore) -> Vec<Task> {
    let bytes = match store.read(TASKS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!("event=snapshot_load module=storage status=empty reason=absent");
            return Vec::new();
        }
        Err(err) => {
            error!(
                "event=snapshot_load module=storage status=error error_code=read_failed error={err}"
            );
            return Vec::new();
        }
    };

    match decode(&bytes) {
        Ok(tasks) => {
            debug!(
                "event=snapshot_load module=storage status=ok count={}",
                tasks.len()
            );
            tasks
        }
        Err(err) => {
            warn!(
                "event=snapshot_load module=storage status=error error_code=malformed_snapshot bytes={} error={err}",
                bytes.len()
            );
            Vec::new()
        }
    }
}

/// Writes the full collection snapshot.
pub fn persist_tasks(store: &dyn DurableStore, tasks: &[Task]) -> DurableResult<()> {
    let bytes = encode(tasks)?;
    store.write(TASKS_KEY, &bytes)
}
