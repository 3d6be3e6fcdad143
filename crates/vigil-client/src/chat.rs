//! Chat between submitter and investigator.
//!
//! The conversation is an append-only log embedded in the complaint record.
//! Sending never renders locally: the message becomes visible only when the
//! subscription delivers the next snapshot, so a failed append shows
//! nothing at all.

use chrono::Utc;
use tracing::{debug, warn};

use vigil_shared::attachment::{Attachment, AttachmentError, FileUpload};
use vigil_shared::constants::MAX_CHAT_ATTACHMENT_BYTES;
use vigil_shared::types::{ComplaintId, Sender};
use vigil_store::{Message, StoreError};

use crate::state::AppState;
use crate::sync::{self, ComplaintWatch};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Nothing to send: no text after trimming and no attachment.
    #[error("Empty message")]
    EmptyMessage,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The append did not reach the store; the message is not retained and
    /// must not be rendered as sent.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Append a message to a complaint's log.
///
/// At least one of `text` (non-empty after trimming) or `attachment` must
/// be present. The timestamp is stamped here, at append time, and the write
/// is a single additive merge: concurrent senders cannot lose each other's
/// messages.
pub async fn send_message(
    state: &AppState,
    id: &ComplaintId,
    sender: Sender,
    text: &str,
    attachment: Option<&FileUpload>,
) -> Result<(), ChatError> {
    let text = text.trim();
    if text.is_empty() && attachment.is_none() {
        return Err(ChatError::EmptyMessage);
    }

    let attachment = attachment
        .map(|file| Attachment::encode(file, MAX_CHAT_ATTACHMENT_BYTES))
        .transpose()?;

    let message = Message {
        sender,
        text: text.to_string(),
        attachment,
        timestamp: Utc::now(),
    };

    match state.store.complaints().push_message(id, &message).await {
        Ok(()) => {
            debug!(id = %id, sender = %sender, "message appended");
            Ok(())
        }
        Err(e) => {
            warn!(id = %id, error = %e, "message append failed");
            Err(ChatError::Persistence(e))
        }
    }
}

/// The currently open chat, owning its watch.
///
/// Opening another complaint cancels the previous watch before subscribing,
/// so two chats never cross-talk and no standing watch is leaked.
pub struct ChatPanel {
    active: Option<OpenChat>,
}

struct OpenChat {
    id: ComplaintId,
    watch: ComplaintWatch,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Open (or switch to) the chat for `id`.
    pub fn open(&mut self, state: &AppState, id: &ComplaintId) -> &mut ComplaintWatch {
        self.close();
        let watch = sync::watch_complaint(state, id);
        debug!(id = %id, "chat opened");
        let open = self.active.insert(OpenChat {
            id: id.clone(),
            watch,
        });
        &mut open.watch
    }

    /// Close the open chat, cancelling its watch. No-op when nothing is
    /// open.
    pub fn close(&mut self) {
        if let Some(open) = self.active.take() {
            open.watch.cancel();
            debug!(id = %open.id, "chat closed");
        }
    }

    /// Id of the currently open chat, if any.
    pub fn open_id(&self) -> Option<&ComplaintId> {
        self.active.as_ref().map(|open| &open.id)
    }

    /// Watch of the currently open chat, if any.
    pub fn watch_mut(&mut self) -> Option<&mut ComplaintWatch> {
        self.active.as_mut().map(|open| &mut open.watch)
    }
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}
