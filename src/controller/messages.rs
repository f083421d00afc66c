//! Message panel operations.

use super::{Bubble, Controller, Notice, Outcome, SkipReason, Transcript};
use crate::models::ConversationId;

/// Shown when the server answers a send without reply text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "(no response)";

impl Controller {
    /// Replaces the transcript with the selected conversation's messages.
    ///
    /// While a send for that conversation is outstanding its provisional
    /// bubble is re-appended, since the server stores the exchange only once
    /// the reply exists. A fetch that overlapped a settling send is repeated.
    pub async fn load_messages(&self) -> Outcome {
        loop {
            let (id, settled) = {
                let state = self.state();
                let Some(id) = state.current_id().cloned() else {
                    return Outcome::Skipped(SkipReason::NoSelection);
                };
                (id, state.settled_sends)
            };

            let messages = match self.gateway.list_messages(&id).await {
                Ok(messages) => messages,
                Err(err) => {
                    tracing::warn!(conversation_id = %id, error = %err, "failed to load messages");
                    self.notify(Notice::error(format!("Failed to load messages: {}", err)));
                    return Outcome::Failed(err);
                }
            };

            let mut state = self.state();
            // Selection may have moved while the request was out.
            if !state.is_current(&id) {
                return Outcome::Applied;
            }
            if state.settled_sends != settled {
                tracing::debug!(conversation_id = %id, "send settled during load, fetching again");
                continue;
            }
            let mut transcript = Transcript::from_messages(messages);
            if let Some(text) = state.pending_send(&id) {
                transcript.push(Bubble::provisional(text));
            }
            state.transcript = transcript;
            return Outcome::Applied;
        }
    }

    /// Host view regained focus.
    pub async fn on_focus(&self) -> Outcome {
        self.load_messages().await
    }

    /// Optimistic send: the user bubble is shown immediately, the reply (or
    /// the failure) is appended when the request settles. No reload follows.
    pub async fn send_message(&self, text: &str) -> Outcome {
        let text = text.trim();
        let Some(id) = self.current_id() else {
            self.notify(Notice::info("Select or create a conversation first."));
            return Outcome::Skipped(SkipReason::NoSelection);
        };
        if text.is_empty() {
            return Outcome::Skipped(SkipReason::EmptyMessage);
        }
        let Some(guard) = self.begin(&id, Some(text)) else {
            return Outcome::Skipped(SkipReason::Busy);
        };

        {
            let mut state = self.state();
            state.transcript.push(Bubble::provisional(text));
            state.composer_focused = false;
        }

        let outcome = match self.gateway.send_message(&id, text).await {
            Ok(reply) => {
                let content = reply
                    .reply
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());
                tracing::info!(conversation_id = %id, "message sent");
                self.settle(&id, Bubble::reply(content));
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(conversation_id = %id, error = %err, "failed to send message");
                self.settle(&id, Bubble::failure(format!("Failed to send: {}", err)));
                Outcome::Failed(err)
            }
        };

        drop(guard);
        self.state().composer_focused = true;
        outcome
    }

    /// Appends the outcome of a send to the panel when it still shows that
    /// conversation. A panel that is `Loading` gets no bubble: the load in
    /// progress sees the bumped counter and fetches the stored exchange.
    fn settle(&self, id: &ConversationId, bubble: Bubble) {
        let mut state = self.state();
        state.settled_sends += 1;
        if state.is_current(id) && state.transcript != Transcript::Loading {
            state.transcript.push(bubble);
        } else {
            tracing::debug!(conversation_id = %id, "panel moved on, dropping bubble");
        }
    }
}
