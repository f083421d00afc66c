//! Request gateway: one async method per backend endpoint.
//!
//! Everything the controller needs from the chat service goes through
//! [`ChatGateway`], so every caller handles exactly one error shape,
//! [`RequestError`]. [`HttpGateway`] is the reqwest-backed implementation;
//! tests substitute in-memory fakes.

mod error;
mod http;

pub use error::RequestError;
pub use http::{HttpGateway, DEFAULT_BASE_URL};

use crate::models::{Conversation, ConversationId, Message, SendReply};
use async_trait::async_trait;

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// `GET /ping`
    async fn ping(&self) -> Result<(), RequestError>;

    /// `GET /conversations`
    async fn list_conversations(&self) -> Result<Vec<Conversation>, RequestError>;

    /// `POST /conversations`
    async fn create_conversation(&self, title: &str) -> Result<Conversation, RequestError>;

    /// `PATCH /conversations/{id}`
    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), RequestError>;

    /// `DELETE /conversations/{id}`
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), RequestError>;

    /// `GET /conversations/{id}/messages`
    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, RequestError>;

    /// `POST /chat/send`
    async fn send_message(
        &self,
        id: &ConversationId,
        message: &str,
    ) -> Result<SendReply, RequestError>;
}
