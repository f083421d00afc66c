//! Conversation sync controller.
//!
//! Owns the selection, the conversation list and the message panel, and keeps
//! them consistent with the backend. Hosts call the async operations in
//! [`list`] and [`messages`] in response to user events and render
//! [`Controller::view`] afterwards.
//!
//! Operations never return errors: failures are recorded as [`Notice`]s or
//! transcript bubbles and reported through [`Outcome`].

pub mod list;
pub mod messages;
mod state;
#[cfg(test)]
mod tests;

pub use state::{
    select_from, Bubble, BubbleOrigin, ChatView, Notice, NoticeLevel, Transcript,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::gateway::{ChatGateway, RequestError};
use crate::models::ConversationId;
use state::ChatState;

/// Title used when a conversation is created without one.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSelection,
    EmptyTitle,
    UnchangedTitle,
    EmptyMessage,
    UnknownConversation,
    /// A request for the same conversation is still outstanding.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(SkipReason),
    Failed(RequestError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

pub struct Controller {
    gateway: Arc<dyn ChatGateway>,
    default_title: String,
    state: Mutex<ChatState>,
}

impl Controller {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self::with_default_title(gateway, DEFAULT_CONVERSATION_TITLE)
    }

    pub fn with_default_title(gateway: Arc<dyn ChatGateway>, default_title: &str) -> Self {
        let default_title = match default_title.trim() {
            "" => DEFAULT_CONVERSATION_TITLE.to_string(),
            title => title.to_string(),
        };
        Self {
            gateway,
            default_title,
            state: Mutex::new(ChatState::default()),
        }
    }

    pub fn view(&self) -> ChatView {
        ChatView::from(&*self.state())
    }

    /// Drains pending notifications in the order they were raised.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state().notices)
    }

    pub fn current_id(&self) -> Option<ConversationId> {
        self.state().current_id().cloned()
    }

    /// `GET /ping`; an unreachable backend is reported, not fatal.
    pub async fn check_backend(&self) -> Outcome {
        match self.gateway.ping().await {
            Ok(()) => Outcome::Applied,
            Err(err) => {
                tracing::warn!(error = %err, "backend liveness check failed");
                self.notify(Notice::error(format!("Backend unreachable: {}", err)));
                Outcome::Failed(err)
            }
        }
    }

    // Never hold the guard across an `.await`.
    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, notice: Notice) {
        self.state().notices.push(notice);
    }

    /// Marks `id` busy until the returned guard drops. `None` when a request
    /// for `id` is already outstanding. `pending` is the provisional text of a
    /// send, re-shown by any reload that lands before the send settles.
    fn begin(&self, id: &ConversationId, pending: Option<&str>) -> Option<InFlight<'_>> {
        let mut state = self.state();
        if state.in_flight.contains_key(id) {
            tracing::debug!(conversation_id = %id, "conversation busy, skipping");
            return None;
        }
        state
            .in_flight
            .insert(id.clone(), pending.map(str::to_string));
        Some(InFlight {
            controller: self,
            id: id.clone(),
        })
    }
}

struct InFlight<'a> {
    controller: &'a Controller,
    id: ConversationId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.controller.state().in_flight.remove(&self.id);
    }
}
