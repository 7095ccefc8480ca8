//! Board export/import: the persistence adapter's serialization contract.
//!
//! A snapshot is `{version, objects, viewport}` as JSON bytes, used verbatim
//! for local save/restore and export. Import validates before mutating: a
//! payload missing an `objects` array is rejected and the session is left
//! untouched.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};

use crate::consts::SNAPSHOT_VERSION;
use crate::geom::Viewport;
use crate::object::CanvasObject;
use crate::session::Session;

/// The persisted board format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub objects: Vec<CanvasObject>,
    pub viewport: Viewport,
}

/// Why an import was rejected. Rejection never mutates the session.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot is missing an objects array")]
    MissingObjects,
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
}

/// Serialize the full board to bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] if serialization fails.
pub fn export(session: &Session) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = BoardSnapshot {
        version: SNAPSHOT_VERSION,
        objects: session.store.snapshot(),
        viewport: session.viewport,
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Replace the session's objects and viewport from exported bytes. Imported
/// history is not a thing — the undo stack is cleared, since its entries
/// reference the replaced objects.
///
/// # Errors
///
/// Returns [`SnapshotError::MissingObjects`] when the payload has no
/// `objects` array, [`SnapshotError::Parse`] for malformed JSON, and
/// [`SnapshotError::UnsupportedVersion`] for snapshots from a newer format.
/// The session is untouched on every error path.
pub fn import(session: &mut Session, bytes: &[u8]) -> Result<usize, SnapshotError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.get("objects").is_some_and(serde_json::Value::is_array) {
        return Err(SnapshotError::MissingObjects);
    }

    let snapshot: BoardSnapshot = serde_json::from_value(value)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }

    let count = snapshot.objects.len();
    session.store.load(snapshot.objects);
    session.viewport = snapshot.viewport;
    session.history.clear();
    Ok(count)
}
