//! Optimistic sync client.
//!
//! DESIGN
//! ======
//! The client state is shared between the UI-facing [`SyncHandle`] and the
//! connection task. Every local edit mutates the session at submit time,
//! under the shared lock, and the resulting mirror frames are queued for the
//! connection task in issue order — so edits take effect immediately even
//! while the socket is down, and the UI can read the store, presence map,
//! and connection status at any moment. The connection loop reconnects
//! forever with a fixed backoff; on each open it offers the full local
//! object set via `board:publish` and then flushes any frames queued during
//! the outage.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use board::geom::Point;
use board::object::{CanvasObject, ObjectId, PartialObject};
use board::region::{RegionId, UserId, WorkspaceRegion};
use board::session::Session;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;
use wire::{Event, Frame, encode_frame};

use crate::merge;

/// Delay between reconnect attempts. Fixed, not exponential: a whiteboard
/// session is interactive and a peer is expected back within seconds.
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Runtime configuration, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// WebSocket URL of the relay, without the board query.
    pub url: String,
    /// Board to join.
    pub board_id: Uuid,
    /// Local user identity.
    pub user_id: UserId,
}

impl SyncConfig {
    /// Load config from environment with sane defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let url =
            std::env::var("BOARD_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_owned());
        let board_id = env_uuid("BOARD_ID");
        let user_id = env_uuid("BOARD_USER_ID");
        Self { url, board_id, user_id }
    }

    fn ws_url(&self) -> String {
        format!("{}?board={}", self.url, self.board_id)
    }
}

fn env_uuid(key: &str) -> Uuid {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Connection state, readable by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

/// A user-initiated mutation, applied through [`SyncHandle::submit`].
#[derive(Debug, Clone)]
pub enum LocalEdit {
    CreateObject(CanvasObject),
    UpdateObject { id: ObjectId, changes: PartialObject },
    DeleteObject { id: ObjectId },
    EraseAt { x: f64, y: f64, radius: f64 },
    Undo,
    Redo,
    CreateRegion(WorkspaceRegion),
    UpdateRegion(WorkspaceRegion),
    DeleteRegion { id: RegionId },
    MoveCursor { x: f64, y: f64 },
}

/// One board, one session, one connection loop.
pub struct SyncClient {
    pub session: Session,
    /// Last known cursor position per remote user.
    pub presence: HashMap<UserId, Point>,
    pub status: ConnectionStatus,
    config: SyncConfig,
}

/// Client state shared between the connection task and every [`SyncHandle`].
pub type SharedClient = Arc<Mutex<SyncClient>>;

/// Lock the shared client. Sections under this lock are synchronous and
/// never held across an await.
fn lock(client: &SharedClient) -> MutexGuard<'_, SyncClient> {
    client.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SyncClient {
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            session: Session::new(config.user_id),
            presence: HashMap::new(),
            status: ConnectionStatus::default(),
            config,
        }
    }

    /// Apply a local edit to the session and return the frames to send.
    ///
    /// A refused edit (permissions, unknown id) mutates nothing and sends
    /// nothing; the refusal is logged and the loop moves on. Undo and redo
    /// mirror their store effects like any deliberate edit, so peers see
    /// the same plain object traffic either way.
    pub fn apply_local(&mut self, edit: LocalEdit) -> Vec<Frame> {
        let actions = match edit {
            LocalEdit::CreateObject(object) => self.session.create_object(object),
            LocalEdit::UpdateObject { id, changes } => self.session.update_object(id, &changes),
            LocalEdit::DeleteObject { id } => self.session.delete_object(id),
            LocalEdit::EraseAt { x, y, radius } => self.session.erase_at(Point::new(x, y), radius),
            LocalEdit::Undo => Ok(self.session.undo()),
            LocalEdit::Redo => Ok(self.session.redo()),
            LocalEdit::CreateRegion(region) => Ok(self.session.create_region(region)),
            LocalEdit::UpdateRegion(region) => self.session.update_region(region),
            LocalEdit::DeleteRegion { id } => self.session.delete_region(id),
            LocalEdit::MoveCursor { x, y } => {
                return vec![self.outbound(Event::CursorMove { x, y })];
            }
        };

        match actions {
            Ok(actions) => actions
                .into_iter()
                .map(|action| self.outbound(Event::from_action(action)))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "local edit refused");
                Vec::new()
            }
        }
    }

    /// The `board:publish` frame offered on connect, or `None` when the
    /// local store is empty and there is nothing to offer.
    #[must_use]
    pub fn publish_frame(&self) -> Option<Frame> {
        let objects = self.session.publish_set();
        if objects.is_empty() {
            return None;
        }
        Some(self.outbound(Event::Publish { objects }))
    }

    /// Handle one inbound text message. Never fails; malformed input is
    /// logged and dropped.
    pub fn handle_text(&mut self, text: &str) {
        merge::handle_text(self, text);
    }

    fn outbound(&self, event: Event) -> Frame {
        event
            .into_frame()
            .with_board_id(self.config.board_id)
            .with_from(self.config.user_id)
    }
}

/// Handle for driving a running client from UI code: submit edits, read
/// state.
#[derive(Clone)]
pub struct SyncHandle {
    client: SharedClient,
    tx: mpsc::UnboundedSender<Frame>,
}

impl SyncHandle {
    /// Apply an edit to the local session right here, then queue its mirror
    /// frames for the connection task. The local apply does not wait for a
    /// live socket, so edits take effect during an outage and flush on
    /// reconnect. Returns `false` if the connection task has exited.
    pub fn submit(&self, edit: LocalEdit) -> bool {
        let frames = lock(&self.client).apply_local(edit);
        for frame in frames {
            let _ = self.tx.send(frame);
        }
        !self.tx.is_closed()
    }

    /// Read the shared client state: the session's store and history, the
    /// presence map, the connection status. This is how a rendering surface
    /// observes the board.
    pub fn read<R>(&self, f: impl FnOnce(&SyncClient) -> R) -> R {
        f(&lock(&self.client))
    }
}

/// Spawn the connection loop and return the edit handle.
#[must_use]
pub fn spawn(config: SyncConfig) -> (SyncHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Arc::new(Mutex::new(SyncClient::new(config)));
    let task = tokio::spawn(run(Arc::clone(&client), rx));
    (SyncHandle { client, tx }, task)
}

/// Main connection loop with reconnect. Local edits are already applied to
/// the shared session by the time their frames arrive here; this task only
/// mirrors them out and merges inbound traffic. Exits when every
/// [`SyncHandle`] is dropped.
pub async fn run(client: SharedClient, mut frames: mpsc::UnboundedReceiver<Frame>) {
    loop {
        let url = {
            let mut c = lock(&client);
            c.status = ConnectionStatus::Connecting;
            c.config.ws_url()
        };

        let stream = match connect_async(&url).await {
            Ok((stream, _)) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "connect failed");
                if !backoff(&client, &frames).await {
                    return;
                }
                continue;
            }
        };

        lock(&client).status = ConnectionStatus::Open;
        tracing::info!(url, "connected");
        let (mut ws_tx, mut ws_rx) = stream.split();

        // Offer the local set first: frames queued during the outage follow
        // it and replay updates and deletes the add-if-absent merge cannot
        // carry.
        let publish = lock(&client).publish_frame();
        if let Some(frame) = publish {
            if ws_tx
                .send(Message::Text(encode_frame(&frame).into()))
                .await
                .is_err()
            {
                if !backoff(&client, &frames).await {
                    return;
                }
                continue;
            }
        }

        'conn: loop {
            tokio::select! {
                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        // Every handle dropped and the queue drained.
                        return;
                    };
                    if ws_tx
                        .send(Message::Text(encode_frame(&frame).into()))
                        .await
                        .is_err()
                    {
                        break 'conn;
                    }
                }
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => lock(&client).handle_text(&text),
                        Some(Ok(Message::Close(_))) | None => break 'conn,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "recv error");
                            break 'conn;
                        }
                    }
                }
            }
        }

        tracing::info!("disconnected, retrying");
        if !backoff(&client, &frames).await {
            return;
        }
    }
}

/// Mark the client disconnected and sleep out the reconnect delay. Mirror
/// frames queued while the socket is down stay in the channel and flush on
/// the next connection. Returns `false` once every handle has been dropped,
/// which is the shutdown signal.
async fn backoff(client: &SharedClient, frames: &mpsc::UnboundedReceiver<Frame>) -> bool {
    lock(client).status = ConnectionStatus::Disconnected;
    tokio::time::sleep(RECONNECT_BACKOFF).await;
    if frames.is_closed() {
        let queued = frames.len();
        if queued > 0 {
            tracing::warn!(queued, "shutting down with unsent frames");
        }
        return false;
    }
    true
}
