use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ChatGateway, RequestError};
use crate::configuration::Settings;
use crate::models::{
    Conversation, ConversationId, ConversationTitle, Message, SendMessage, SendReply,
};

/// Address the reference backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8010";

/// reqwest-backed [`ChatGateway`].
///
/// No timeout is applied unless one is configured: a hanging request keeps
/// the caller suspended until the server answers.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RequestError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RequestError> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn conversation_url(&self, id: &ConversationId) -> String {
        self.url(&format!(
            "/conversations/{}",
            urlencoding::encode(&id.to_string())
        ))
    }

    /// Sends the request and turns any non-2xx status into [`RequestError::Http`].
    async fn execute(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "backend returned failure status");
        Err(RequestError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body.trim(),
        ))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RequestError> {
        resp.json::<T>()
            .await
            .map_err(|e| RequestError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatGateway for HttpGateway {
    #[tracing::instrument(name = "Ping backend.", skip(self), fields(base_url = %self.base_url))]
    async fn ping(&self) -> Result<(), RequestError> {
        self.execute(self.http.get(self.url("/ping"))).await?;
        Ok(())
    }

    #[tracing::instrument(name = "List conversations.", skip(self))]
    async fn list_conversations(&self) -> Result<Vec<Conversation>, RequestError> {
        let resp = self.execute(self.http.get(self.url("/conversations"))).await?;
        Self::decode(resp).await
    }

    #[tracing::instrument(name = "Create conversation.", skip(self))]
    async fn create_conversation(&self, title: &str) -> Result<Conversation, RequestError> {
        let body = ConversationTitle {
            title: title.to_string(),
        };
        let resp = self
            .execute(self.http.post(self.url("/conversations")).json(&body))
            .await?;
        Self::decode(resp).await
    }

    #[tracing::instrument(name = "Rename conversation.", skip(self))]
    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), RequestError> {
        let body = ConversationTitle {
            title: title.to_string(),
        };
        self.execute(self.http.patch(self.conversation_url(id)).json(&body))
            .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Delete conversation.", skip(self))]
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), RequestError> {
        self.execute(self.http.delete(self.conversation_url(id)))
            .await?;
        Ok(())
    }

    #[tracing::instrument(name = "List messages.", skip(self))]
    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, RequestError> {
        let url = format!("{}/messages", self.conversation_url(id));
        let resp = self.execute(self.http.get(url)).await?;
        Self::decode(resp).await
    }

    #[tracing::instrument(name = "Send message.", skip(self, message))]
    async fn send_message(
        &self,
        id: &ConversationId,
        message: &str,
    ) -> Result<SendReply, RequestError> {
        let body = SendMessage {
            conversation_id: id.clone(),
            message: message.to_string(),
        };
        let resp = self
            .execute(self.http.post(self.url("/chat/send")).json(&body))
            .await?;
        Self::decode(resp).await
    }
}
