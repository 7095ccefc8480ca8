//! Inbound frame handling: remote merges and presence.
//!
//! Everything here goes through the session's remote entry points, which
//! never touch local history. Malformed frames are logged and dropped; the
//! connection loop is never terminated by bad input.

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use board::geom::Point;
use uuid::Uuid;
use wire::{Event, decode_frame};

use crate::client::SyncClient;

/// Handle one inbound text message.
pub fn handle_text(client: &mut SyncClient, text: &str) {
    let frame = match decode_frame(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "dropping malformed frame");
            return;
        }
    };

    let event = match Event::from_frame(&frame) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "dropping frame with bad payload");
            return;
        }
    };

    apply_event(client, frame.from, event);
}

/// Apply a decoded event to the client state.
pub fn apply_event(client: &mut SyncClient, from: Option<Uuid>, event: Event) {
    match event {
        Event::Sync { objects } => {
            let added = client.session.merge_sync(objects);
            tracing::debug!(added, "merged board sync");
        }
        Event::ObjectCreated { object } => client.session.apply_created(object),
        Event::ObjectUpdated { id, changes } => client.session.apply_updated(&id, &changes),
        Event::ObjectDeleted { id } => client.session.apply_deleted(&id),
        Event::RegionCreated { region } | Event::RegionUpdated { region } => {
            client.session.apply_region_saved(region);
        }
        Event::RegionDeleted { id } => client.session.apply_region_deleted(&id),
        Event::RegionSync { regions } => client.session.replace_regions(regions),
        Event::CursorUpdate { x, y } => {
            // Presence is keyed by sender; an unattributed cursor is useless.
            if let Some(user) = from {
                client.presence.insert(user, Point::new(x, y));
            }
        }
        Event::GatewayError { message } => {
            tracing::warn!(message, "relay rejected a frame");
        }
        // Imperative traffic flows client-to-relay only; seeing it here
        // means a misbehaving peer, not a protocol state to handle.
        other => {
            tracing::debug!(?other, "ignoring client-bound-only event");
        }
    }
}
