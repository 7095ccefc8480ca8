//! Shared relay state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. Each
//! live board holds its authoritative object and region maps plus the
//! connected clients. Board state exists only while someone is connected:
//! the first join creates it and the last part evicts it.

use std::collections::HashMap;
use std::sync::Arc;

use board::object::{CanvasObject, ObjectId};
use board::region::{RegionId, WorkspaceRegion};
use tokio::sync::{RwLock, mpsc};
use tracing::info;
use uuid::Uuid;
use wire::Frame;

/// Per-board live state.
pub struct BoardState {
    /// Current objects keyed by object ID.
    pub objects: HashMap<ObjectId, CanvasObject>,
    /// Workspace regions keyed by region ID.
    pub regions: HashMap<RegionId, WorkspaceRegion>,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
}

impl BoardState {
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new(), regions: HashMap::new(), clients: HashMap::new() }
    }

    /// Merge offered objects add-if-absent. Objects already on the board
    /// are never overwritten. Returns the number added.
    pub fn merge_absent(&mut self, objects: Vec<CanvasObject>) -> usize {
        let mut added = 0;
        for object in objects {
            if !self.objects.contains_key(&object.id) {
                self.objects.insert(object.id, object);
                added += 1;
            }
        }
        added
    }

    /// The full object set in a deterministic order.
    #[must_use]
    pub fn object_set(&self) -> Vec<CanvasObject> {
        let mut objects: Vec<CanvasObject> = self.objects.values().cloned().collect();
        objects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        objects
    }

    /// The full region set.
    #[must_use]
    pub fn region_set(&self) -> Vec<WorkspaceRegion> {
        self.regions.values().cloned().collect()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared relay state, injected into Axum handlers via State extractor.
#[derive(Clone, Default)]
pub struct AppState {
    pub boards: Arc<RwLock<HashMap<Uuid, BoardState>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Join a board, creating its state if this is the first client. Returns
/// the current object and region sets for the join snapshot.
pub async fn join_board(
    state: &AppState,
    board_id: Uuid,
    client_id: Uuid,
    tx: mpsc::Sender<Frame>,
) -> (Vec<CanvasObject>, Vec<WorkspaceRegion>) {
    let mut boards = state.boards.write().await;
    let board_state = boards.entry(board_id).or_insert_with(BoardState::new);
    board_state.clients.insert(client_id, tx);
    info!(%board_id, %client_id, clients = board_state.clients.len(), "client joined board");
    (board_state.object_set(), board_state.region_set())
}

/// Leave a board. Evicts the board state when the last client leaves.
pub async fn part_board(state: &AppState, board_id: Uuid, client_id: Uuid) {
    let mut boards = state.boards.write().await;
    let Some(board_state) = boards.get_mut(&board_id) else {
        return;
    };
    board_state.clients.remove(&client_id);
    info!(%board_id, %client_id, remaining = board_state.clients.len(), "client left board");

    if board_state.clients.is_empty() {
        boards.remove(&board_id);
        info!(%board_id, "evicted board from memory");
    }
}

/// Fan a frame out to a board's clients, excluding one.
pub async fn broadcast(state: &AppState, board_id: Uuid, frame: &Frame, exclude: Option<Uuid>) {
    let boards = state.boards.read().await;
    let Some(board_state) = boards.get(&board_id) else {
        return;
    };

    for (client_id, tx) in &board_state.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(frame.clone());
    }
}
