//! WebSocket handler — bidirectional frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, joins the requested board, and enters
//! a `select!` loop:
//! - Incoming client frames → parse + dispatch by event
//! - Broadcast frames from board peers → forward to client
//!
//! Handler functions are pure business logic — they mutate board state and
//! return an `Outcome`. The dispatch layer owns all outbound concerns:
//! reply to sender and broadcast to peers.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join board → send `board:sync` and `region:sync` snapshots
//! 2. Client sends frames → dispatch → mutate board → broadcast past tense
//! 3. Close → part board → evict when empty

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use wire::{Event, Frame, decode_frame, encode_frame};

use crate::state::{self, AppState};

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what — handlers never send frames directly.
enum Outcome {
    /// Send to sender only.
    Reply(Event),
    /// Broadcast to all board peers excluding the sender.
    Broadcast(Event),
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(app): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(board_id) = params.get("board").and_then(|s| s.parse::<Uuid>().ok()) else {
        return (StatusCode::BAD_REQUEST, "board query parameter required").into_response();
    };

    ws.on_upgrade(move |socket| run_ws(socket, app, board_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

/// Drive one connection to completion. Generic over the socket so tests can
/// exercise teardown with a scripted transport; production passes the
/// upgraded [`axum::extract::ws::WebSocket`].
async fn run_ws<S>(mut socket: S, app: AppState, board_id: Uuid)
where
    S: Stream<Item = Result<Message, axum::Error>> + Sink<Message, Error = axum::Error> + Unpin,
{
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast frames from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(256);

    let (objects, regions) = state::join_board(&app, board_id, client_id, client_tx).await;
    info!(%client_id, %board_id, "ws: client connected");

    // Join snapshot: current objects and regions.
    let sync = Event::Sync { objects }.into_frame().with_board_id(board_id);
    let region_sync = Event::RegionSync { regions }.into_frame().with_board_id(board_id);
    if send_frame(&mut socket, &sync).await.is_err()
        || send_frame(&mut socket, &region_sync).await.is_err()
    {
        state::part_board(&app, board_id, client_id).await;
        return;
    }

    'conn: loop {
        tokio::select! {
            msg = socket.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let sender_frames =
                            process_inbound_text(&app, board_id, client_id, &text).await;
                        for frame in sender_frames {
                            if send_frame(&mut socket, &frame).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state::part_board(&app, board_id, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse one inbound text frame, dispatch, apply the outcome, and return
/// frames destined for the sender.
///
/// This keeps the websocket transport concerns separate from frame
/// handling, so tests can exercise dispatch and broadcast end-to-end.
async fn process_inbound_text(
    app: &AppState,
    board_id: Uuid,
    client_id: Uuid,
    text: &str,
) -> Vec<Frame> {
    let frame = match decode_frame(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(%client_id, error = %err, "ws: invalid inbound frame");
            return vec![gateway_error(board_id, format!("invalid json: {err}"))];
        }
    };

    let event = match Event::from_frame(&frame) {
        Ok(event) => event,
        Err(err) => {
            warn!(%client_id, syscall = %frame.syscall, error = %err, "ws: bad frame payload");
            return vec![gateway_error(board_id, err.to_string())];
        }
    };

    let outcome = match handle_event(app, board_id, event).await {
        Ok(outcome) => outcome,
        Err(message) => {
            warn!(%client_id, syscall = %frame.syscall, message, "ws: frame refused");
            return vec![gateway_error(board_id, message)];
        }
    };

    match outcome {
        Outcome::Reply(event) => {
            vec![stamp(event.into_frame(), board_id, frame.from)]
        }
        Outcome::Broadcast(event) => {
            let broadcast = stamp(event.into_frame(), board_id, frame.from);
            state::broadcast(app, board_id, &broadcast, Some(client_id)).await;
            vec![]
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Apply one client event to the board and describe its fan-out.
async fn handle_event(app: &AppState, board_id: Uuid, event: Event) -> Result<Outcome, String> {
    match event {
        Event::Publish { objects } => {
            let current = {
                let mut boards = app.boards.write().await;
                let Some(board_state) = boards.get_mut(&board_id) else {
                    return Err("board not live".to_owned());
                };
                let added = board_state.merge_absent(objects);
                info!(%board_id, added, "merged published objects");
                board_state.object_set()
            };
            Ok(Outcome::Reply(Event::Sync { objects: current }))
        }
        Event::ObjectCreate { object } => {
            with_board(app, board_id, |bs| {
                bs.objects.insert(object.id, object.clone());
            })
            .await?;
            Ok(Outcome::Broadcast(Event::ObjectCreated { object }))
        }
        Event::ObjectUpdate { id, changes } => {
            with_board(app, board_id, |bs| {
                // Unknown ids are tolerated; the sparse update is still
                // relayed and the next publish repairs the gap.
                if let Some(before) = bs.objects.get(&id) {
                    let after = changes.apply_to(before);
                    bs.objects.insert(id, after);
                }
            })
            .await?;
            Ok(Outcome::Broadcast(Event::ObjectUpdated { id, changes }))
        }
        Event::ObjectDelete { id } => {
            with_board(app, board_id, |bs| {
                bs.objects.remove(&id);
            })
            .await?;
            Ok(Outcome::Broadcast(Event::ObjectDeleted { id }))
        }
        Event::RegionCreate { region } => {
            with_board(app, board_id, |bs| {
                bs.regions.insert(region.id, region.clone());
            })
            .await?;
            Ok(Outcome::Broadcast(Event::RegionCreated { region }))
        }
        Event::RegionUpdate { region } => {
            with_board(app, board_id, |bs| {
                bs.regions.insert(region.id, region.clone());
            })
            .await?;
            Ok(Outcome::Broadcast(Event::RegionUpdated { region }))
        }
        Event::RegionDelete { id } => {
            with_board(app, board_id, |bs| {
                bs.regions.remove(&id);
            })
            .await?;
            Ok(Outcome::Broadcast(Event::RegionDeleted { id }))
        }
        // Ephemeral: relayed, never stored.
        Event::CursorMove { x, y } => Ok(Outcome::Broadcast(Event::CursorUpdate { x, y })),
        // Everything else is relay-to-client traffic and has no business
        // arriving here.
        other => Err(format!("unexpected client frame: {other:?}")),
    }
}

/// Run a closure against a live board's state.
async fn with_board<F>(app: &AppState, board_id: Uuid, apply: F) -> Result<(), String>
where
    F: FnOnce(&mut crate::state::BoardState),
{
    let mut boards = app.boards.write().await;
    let Some(board_state) = boards.get_mut(&board_id) else {
        return Err("board not live".to_owned());
    };
    apply(board_state);
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn stamp(frame: Frame, board_id: Uuid, from: Option<Uuid>) -> Frame {
    let frame = frame.with_board_id(board_id);
    match from {
        Some(from) => frame.with_from(from),
        None => frame,
    }
}

fn gateway_error(board_id: Uuid, message: String) -> Frame {
    Event::GatewayError { message }
        .into_frame()
        .with_board_id(board_id)
}

async fn send_frame<S>(socket: &mut S, frame: &Frame) -> Result<(), ()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = encode_frame(frame);
    if !frame.syscall.starts_with("cursor:") {
        info!(id = %frame.id, syscall = %frame.syscall, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}
