//! Conversation list operations.
//!
//! Every mutation is followed by a full refresh from the server; the local
//! list is never patched in place.

use super::{Controller, Notice, Outcome, SkipReason};
use crate::models::ConversationId;

impl Controller {
    /// Replaces the list with the server's and re-applies the selection policy
    /// (see [`super::select_from`]). A newly selected conversation gets its
    /// messages loaded.
    pub async fn refresh_list(&self, preferred: Option<&ConversationId>) -> Outcome {
        let fetched = match self.gateway.list_conversations().await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(error = %err, "failed to list conversations");
                self.notify(Notice::error(format!(
                    "Failed to list conversations: {}",
                    err
                )));
                return Outcome::Failed(err);
            }
        };

        let selected = {
            let mut state = self.state();
            let picked =
                super::select_from(&fetched, preferred, state.current_id()).cloned();
            state.conversations = fetched;
            match picked {
                Some(conversation) => {
                    tracing::debug!(conversation_id = %conversation.id, "conversation selected");
                    state.select(conversation);
                    true
                }
                None => {
                    state.clear_selection();
                    false
                }
            }
        };

        if selected {
            self.load_messages().await;
        }
        Outcome::Applied
    }

    /// Makes a listed conversation current and loads its messages.
    pub async fn select_conversation(&self, id: &ConversationId) -> Outcome {
        {
            let mut state = self.state();
            let Some(conversation) = state.find(id).cloned() else {
                return Outcome::Skipped(SkipReason::UnknownConversation);
            };
            state.select(conversation);
        }
        self.load_messages().await;
        Outcome::Applied
    }

    /// Blank titles fall back to the default title. The new conversation is
    /// selected once the list is refreshed.
    pub async fn create_conversation(&self, title: &str) -> Outcome {
        let title = match title.trim() {
            "" => self.default_title.clone(),
            title => title.to_string(),
        };

        match self.gateway.create_conversation(&title).await {
            Ok(created) => {
                tracing::info!(conversation_id = %created.id, %title, "conversation created");
                self.refresh_list(Some(&created.id)).await;
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to create conversation");
                self.notify(Notice::error(format!(
                    "Failed to create conversation: {}",
                    err
                )));
                Outcome::Failed(err)
            }
        }
    }

    /// Does nothing when the new title is blank or matches the listed one.
    pub async fn rename_conversation(&self, id: &ConversationId, new_title: &str) -> Outcome {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Outcome::Skipped(SkipReason::EmptyTitle);
        }
        let unchanged = {
            let state = self.state();
            state
                .find(id)
                .or(state.current.as_ref().filter(|c| &c.id == id))
                .is_some_and(|c| c.title.trim() == new_title)
        };
        if unchanged {
            return Outcome::Skipped(SkipReason::UnchangedTitle);
        }

        let Some(guard) = self.begin(id, None) else {
            return Outcome::Skipped(SkipReason::Busy);
        };
        let result = self.gateway.rename_conversation(id, new_title).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(conversation_id = %id, title = %new_title, "conversation renamed");
                self.refresh_list(Some(id)).await;
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(conversation_id = %id, error = %err, "failed to rename conversation");
                self.notify(Notice::error(format!("Failed to rename: {}", err)));
                Outcome::Failed(err)
            }
        }
    }

    /// On success the selection is cleared whatever it was, so the refresh
    /// falls through to the first remaining conversation, if any.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Outcome {
        let Some(guard) = self.begin(id, None) else {
            return Outcome::Skipped(SkipReason::Busy);
        };
        let result = self.gateway.delete_conversation(id).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(conversation_id = %id, "conversation deleted");
                self.state().clear_selection();
                self.refresh_list(None).await;
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(conversation_id = %id, error = %err, "failed to delete conversation");
                self.notify(Notice::error(format!("Failed to delete: {}", err)));
                Outcome::Failed(err)
            }
        }
    }
}
