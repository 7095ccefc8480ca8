//! Shared numeric constants for the board engine.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of entries retained by the undo/redo stack. Exceeding this
/// evicts the single oldest entry.
pub const HISTORY_CAPACITY: usize = 100;

// ── Viewport ────────────────────────────────────────────────────

/// Hard floor for the viewport scale. Prevents degenerate zero-size
/// projections; zoom-in has no ceiling.
pub const MIN_VIEWPORT_SCALE: f64 = 0.05;

// ── Snapshot ────────────────────────────────────────────────────

/// Version stamp written into exported board snapshots.
pub const SNAPSHOT_VERSION: u32 = 1;
