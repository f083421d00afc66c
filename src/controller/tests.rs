use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::messages::NO_RESPONSE_PLACEHOLDER;
use super::*;
use crate::gateway::{ChatGateway, RequestError};
use crate::models::{Conversation, ConversationId, Message, Role, SendReply};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Ping,
    List,
    Create(String),
    Rename(ConversationId, String),
    Delete(ConversationId),
    Messages(ConversationId),
    Send(ConversationId, String),
}

#[derive(Default)]
struct Backend {
    next_id: i64,
    conversations: Vec<Conversation>,
    messages: Vec<(ConversationId, Message)>,
    reply: Option<String>,
    calls: Vec<Call>,
    fail_list: bool,
    fail_create: bool,
    fail_rename: bool,
    fail_delete: bool,
    fail_messages: bool,
    fail_send: bool,
}

/// In-memory stand-in for the chat service, newest conversation first.
#[derive(Default)]
struct FakeGateway {
    backend: Mutex<Backend>,
    send_gate: Option<Arc<Notify>>,
}

impl FakeGateway {
    fn with_conversations(ids: &[i64]) -> Self {
        let gateway = Self::default();
        {
            let mut backend = gateway.backend.lock().unwrap();
            backend.conversations = ids
                .iter()
                .map(|id| Conversation::new(*id, format!("Conversation {}", id)))
                .collect();
            backend.next_id = ids.iter().copied().max().unwrap_or(0);
            backend.reply = Some("hello".to_string());
        }
        gateway
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.send_gate = Some(gate);
        self
    }

    fn configure(&self, f: impl FnOnce(&mut Backend)) {
        f(&mut self.backend.lock().unwrap());
    }

    fn calls(&self) -> Vec<Call> {
        self.backend.lock().unwrap().calls.clone()
    }

    fn clear_calls(&self) {
        self.backend.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) {
        self.backend.lock().unwrap().calls.push(call);
    }
}

fn server_error() -> RequestError {
    RequestError::http(500, "Internal Server Error", "boom")
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn ping(&self) -> Result<(), RequestError> {
        self.record(Call::Ping);
        Err(RequestError::Transport("connection refused".to_string()))
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, RequestError> {
        self.record(Call::List);
        let backend = self.backend.lock().unwrap();
        if backend.fail_list {
            return Err(server_error());
        }
        Ok(backend.conversations.clone())
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, RequestError> {
        self.record(Call::Create(title.to_string()));
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_create {
            return Err(server_error());
        }
        backend.next_id += 1;
        let created = Conversation::new(backend.next_id, title);
        backend.conversations.insert(0, created.clone());
        Ok(created)
    }

    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), RequestError> {
        self.record(Call::Rename(id.clone(), title.to_string()));
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_rename {
            return Err(server_error());
        }
        match backend.conversations.iter_mut().find(|c| &c.id == id) {
            Some(conv) => {
                conv.title = title.to_string();
                Ok(())
            }
            None => Err(RequestError::http(404, "Not Found", "Conversation not found")),
        }
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), RequestError> {
        self.record(Call::Delete(id.clone()));
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_delete {
            return Err(server_error());
        }
        backend.conversations.retain(|c| &c.id != id);
        backend.messages.retain(|(cid, _)| cid != id);
        Ok(())
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, RequestError> {
        self.record(Call::Messages(id.clone()));
        let backend = self.backend.lock().unwrap();
        if backend.fail_messages {
            return Err(server_error());
        }
        Ok(backend
            .messages
            .iter()
            .filter(|(cid, _)| cid == id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn send_message(
        &self,
        id: &ConversationId,
        message: &str,
    ) -> Result<SendReply, RequestError> {
        self.record(Call::Send(id.clone(), message.to_string()));
        if let Some(gate) = &self.send_gate {
            gate.notified().await;
        }
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_send {
            return Err(RequestError::http(502, "Bad Gateway", "model unavailable"));
        }
        let reply = backend.reply.clone();
        backend.messages.push((id.clone(), Message::user(message)));
        backend
            .messages
            .push((id.clone(), Message::assistant(reply.clone().unwrap_or_default())));
        Ok(SendReply { reply })
    }
}

fn controller(gateway: &Arc<FakeGateway>) -> Controller {
    Controller::new(gateway.clone())
}

fn id(id: i64) -> ConversationId {
    ConversationId::Int(id)
}

// ── Selection policy ─────────────────────────────────

#[tokio::test]
async fn test_refresh_selects_first_without_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);

    assert_eq!(ctl.refresh_list(None).await, Outcome::Applied);

    let view = ctl.view();
    assert_eq!(view.conversations.len(), 2);
    assert_eq!(view.current.map(|c| c.id), Some(id(1)));
    assert!(view.composer_enabled);
    assert!(view.actions_enabled);
    assert_eq!(view.transcript, Transcript::Empty);
    assert_eq!(gateway.calls(), vec![Call::List, Call::Messages(id(1))]);
}

#[tokio::test]
async fn test_refresh_keeps_current_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(2))).await;

    ctl.refresh_list(None).await;

    assert_eq!(ctl.current_id(), Some(id(2)));
}

#[tokio::test]
async fn test_refresh_prefers_requested_over_current() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2, 3]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(2))).await;

    ctl.refresh_list(Some(&id(3))).await;

    assert_eq!(ctl.current_id(), Some(id(3)));
}

#[tokio::test]
async fn test_refresh_of_empty_collection_disables_controls() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[]));
    let ctl = controller(&gateway);

    ctl.refresh_list(Some(&id(1))).await;

    let view = ctl.view();
    assert!(view.current.is_none());
    assert!(!view.composer_enabled);
    assert!(!view.actions_enabled);
    assert_eq!(view.transcript, Transcript::NoSelection);
    assert_eq!(view.header(), "Select a conversation");
    assert_eq!(gateway.calls(), vec![Call::List]);
}

#[tokio::test]
async fn test_refresh_failure_leaves_state_untouched() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(2))).await;
    let before = ctl.view();
    gateway.configure(|b| {
        b.fail_list = true;
        b.conversations.clear();
    });

    let outcome = ctl.refresh_list(None).await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(ctl.view(), before);
    let notices = ctl.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("Failed to list conversations: HTTP 500"));
}

#[tokio::test]
async fn test_refresh_updates_title_of_kept_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.configure(|b| b.conversations[0].title = "Changed elsewhere".to_string());

    ctl.refresh_list(None).await;

    assert_eq!(ctl.view().header(), "Changed elsewhere");
}

// ── Create ───────────────────────────────────────────

#[tokio::test]
async fn test_create_with_blank_title_uses_default() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[]));
    let ctl = controller(&gateway);

    assert!(ctl.create_conversation("   ").await.is_applied());

    assert_eq!(gateway.calls()[0], Call::Create(DEFAULT_CONVERSATION_TITLE.to_string()));
}

#[tokio::test]
async fn test_create_uses_configured_default_title() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[]));
    let ctl = Controller::with_default_title(gateway.clone(), "Nova conversa");

    ctl.create_conversation("").await;

    assert_eq!(gateway.calls()[0], Call::Create("Nova conversa".to_string()));
}

#[tokio::test]
async fn test_create_selects_new_conversation() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    ctl.create_conversation("  Trip planning ").await;

    let view = ctl.view();
    assert_eq!(view.current.as_ref().map(|c| c.id.clone()), Some(id(3)));
    assert_eq!(view.header(), "Trip planning");
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Create("Trip planning".to_string()),
            Call::List,
            Call::Messages(id(3)),
        ]
    );
}

#[tokio::test]
async fn test_create_failure_keeps_selection_and_reports() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.configure(|b| b.fail_create = true);

    let outcome = ctl.create_conversation("x").await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(ctl.current_id(), Some(id(1)));
    assert_eq!(ctl.view().conversations.len(), 1);
    assert!(ctl.take_notices()[0].message.starts_with("Failed to create conversation"));
}

// ── Rename ───────────────────────────────────────────

#[tokio::test]
async fn test_rename_to_same_title_issues_no_request() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    gateway.configure(|b| b.conversations[0].title = "Same Title".to_string());
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    let outcome = ctl.rename_conversation(&id(1), "  Same Title ").await;

    assert_eq!(outcome, Outcome::Skipped(SkipReason::UnchangedTitle));
    assert!(gateway.calls().is_empty());
    assert!(ctl.take_notices().is_empty());
}

#[tokio::test]
async fn test_rename_to_blank_title_issues_no_request() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    let outcome = ctl.rename_conversation(&id(1), "   ").await;

    assert_eq!(outcome, Outcome::Skipped(SkipReason::EmptyTitle));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_rename_refreshes_canonical_title() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    let outcome = ctl.rename_conversation(&id(2), " Renamed ").await;

    assert!(outcome.is_applied());
    assert_eq!(gateway.calls()[0], Call::Rename(id(2), "Renamed".to_string()));
    assert_eq!(gateway.calls()[1], Call::List);
    let view = ctl.view();
    assert_eq!(view.current.as_ref().map(|c| &c.id), Some(&id(2)));
    assert_eq!(view.header(), "Renamed");
}

#[tokio::test]
async fn test_rename_failure_keeps_old_title() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.configure(|b| b.fail_rename = true);

    let outcome = ctl.rename_conversation(&id(1), "New name").await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(ctl.view().header(), "Conversation 1");
    assert!(ctl.take_notices()[0].message.starts_with("Failed to rename"));
    assert!(ctl.view().actions_enabled);
}

// ── Delete ───────────────────────────────────────────

#[tokio::test]
async fn test_delete_current_falls_back_to_first_remaining() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2, 3]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(2))).await;

    assert!(ctl.delete_conversation(&id(2)).await.is_applied());

    let view = ctl.view();
    assert_eq!(view.current.map(|c| c.id), Some(id(1)));
    assert!(view.conversations.iter().all(|c| c.id != id(2)));
}

#[tokio::test]
async fn test_delete_last_conversation_clears_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    ctl.delete_conversation(&id(1)).await;

    let view = ctl.view();
    assert!(view.current.is_none());
    assert!(!view.composer_enabled);
    assert_eq!(view.transcript, Transcript::NoSelection);
}

#[tokio::test]
async fn test_delete_other_conversation_still_resets_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2, 3]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(3))).await;

    ctl.delete_conversation(&id(2)).await;

    assert_eq!(ctl.current_id(), Some(id(1)));
}

#[tokio::test]
async fn test_delete_failure_keeps_selection() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    let ctl = controller(&gateway);
    ctl.refresh_list(Some(&id(2))).await;
    gateway.configure(|b| b.fail_delete = true);

    let outcome = ctl.delete_conversation(&id(2)).await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(ctl.current_id(), Some(id(2)));
    assert_eq!(ctl.view().conversations.len(), 2);
}

// ── Messages ─────────────────────────────────────────

#[tokio::test]
async fn test_load_without_selection_is_noop() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);

    assert_eq!(ctl.load_messages().await, Outcome::Skipped(SkipReason::NoSelection));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_empty_history_renders_placeholder_state() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    ctl.load_messages().await;
    ctl.on_focus().await;

    assert_eq!(ctl.view().transcript, Transcript::Empty);
    assert!(ctl.take_notices().is_empty());
}

#[tokio::test]
async fn test_load_replaces_transcript_in_server_order() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    gateway.configure(|b| {
        b.messages.push((id(1), Message::user("first")));
        b.messages.push((id(1), Message::assistant("second")));
    });
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    let view = ctl.view();
    let entries = view.transcript.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].role, entries[0].content.as_str()), (Role::User, "first"));
    assert_eq!(
        (entries[1].role, entries[1].content.as_str()),
        (Role::Assistant, "second")
    );
    assert!(entries.iter().all(|b| b.origin == BubbleOrigin::Server));
}

#[tokio::test]
async fn test_select_conversation_loads_its_messages() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]));
    gateway.configure(|b| b.messages.push((id(2), Message::user("in two"))));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    assert!(ctl.select_conversation(&id(2)).await.is_applied());
    assert_eq!(ctl.view().transcript.entries()[0].content, "in two");

    assert_eq!(
        ctl.select_conversation(&id(42)).await,
        Outcome::Skipped(SkipReason::UnknownConversation)
    );
    assert_eq!(ctl.current_id(), Some(id(2)));
}

#[tokio::test]
async fn test_load_failure_reports_without_clearing() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    gateway.configure(|b| b.messages.push((id(1), Message::user("kept"))));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.configure(|b| b.fail_messages = true);

    assert!(matches!(ctl.on_focus().await, Outcome::Failed(_)));
    assert_eq!(ctl.view().transcript.entries()[0].content, "kept");
    assert!(ctl.take_notices()[0].message.starts_with("Failed to load messages"));
}

// ── Send ─────────────────────────────────────────────

#[tokio::test]
async fn test_send_appends_user_then_assistant() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    assert!(ctl.send_message("  hi ").await.is_applied());

    let view = ctl.view();
    let entries = view.transcript.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], Bubble::provisional("hi"));
    assert_eq!(entries[1], Bubble::reply("hello"));
    assert!(view.composer_enabled);
    assert!(view.composer_focused);
    // no reload after a send
    assert_eq!(gateway.calls(), vec![Call::Send(id(1), "hi".to_string())]);
}

#[tokio::test]
async fn test_send_without_reply_uses_placeholder() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    gateway.configure(|b| b.reply = None);
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    ctl.send_message("hi").await;

    let view = ctl.view();
    assert_eq!(view.transcript.entries()[1].content, NO_RESPONSE_PLACEHOLDER);
}

#[tokio::test]
async fn test_send_failure_is_shown_in_transcript() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    gateway.configure(|b| b.fail_send = true);
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    let outcome = ctl.send_message("hi").await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    let view = ctl.view();
    let entries = view.transcript.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], Bubble::provisional("hi"));
    assert_eq!(entries[1].role, Role::Assistant);
    assert_eq!(entries[1].origin, BubbleOrigin::Failure);
    assert!(entries[1].content.contains("HTTP 502 Bad Gateway | model unavailable"));
    assert!(view.composer_enabled);
    assert!(view.actions_enabled);
    assert!(ctl.take_notices().is_empty());
}

#[tokio::test]
async fn test_send_preconditions_are_noops() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]));
    let ctl = controller(&gateway);

    assert_eq!(ctl.send_message("hi").await, Outcome::Skipped(SkipReason::NoSelection));
    assert_eq!(ctl.take_notices()[0].level, NoticeLevel::Info);

    ctl.refresh_list(None).await;
    gateway.clear_calls();
    assert_eq!(ctl.send_message("   ").await, Outcome::Skipped(SkipReason::EmptyMessage));
    assert!(gateway.calls().is_empty());
    assert_eq!(ctl.view().transcript, Transcript::Empty);
}

#[tokio::test]
async fn test_concurrent_sends_issue_one_request() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]).gated(gate.clone()));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;
    gateway.clear_calls();

    let (first, second) = tokio::join!(ctl.send_message("one"), async {
        let view = ctl.view();
        assert!(!view.composer_enabled);
        assert!(!view.actions_enabled);
        assert_eq!(
            ctl.delete_conversation(&id(1)).await,
            Outcome::Skipped(SkipReason::Busy)
        );
        let second = ctl.send_message("two").await;
        gate.notify_one();
        second
    });

    assert_eq!(first, Outcome::Applied);
    assert_eq!(second, Outcome::Skipped(SkipReason::Busy));
    assert_eq!(gateway.calls(), vec![Call::Send(id(1), "one".to_string())]);
    let view = ctl.view();
    assert_eq!(view.transcript.entries().len(), 2);
    assert!(view.composer_enabled);
}

#[tokio::test]
async fn test_reload_during_send_keeps_provisional_bubble() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::with_conversations(&[1]).gated(gate.clone()));
    gateway.configure(|b| b.messages.push((id(1), Message::user("earlier"))));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    let (sent, reloaded) = tokio::join!(ctl.send_message("hi"), async {
        let reloaded = ctl.on_focus().await;
        let view = ctl.view();
        let contents: Vec<_> = view
            .transcript
            .entries()
            .iter()
            .map(|b| (b.content.clone(), b.origin))
            .collect();
        assert_eq!(
            contents,
            vec![
                ("earlier".to_string(), BubbleOrigin::Server),
                ("hi".to_string(), BubbleOrigin::Provisional),
            ]
        );
        gate.notify_one();
        reloaded
    });

    assert!(sent.is_applied());
    assert!(reloaded.is_applied());
    let contents: Vec<_> = ctl
        .view()
        .transcript
        .entries()
        .iter()
        .map(|b| b.content.clone())
        .collect();
    assert_eq!(contents, vec!["earlier", "hi", "hello"]);
}

#[tokio::test]
async fn test_switching_away_and_back_mid_send_keeps_history() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]).gated(gate.clone()));
    gateway.configure(|b| b.messages.push((id(1), Message::user("earlier"))));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    let (sent, _) = tokio::join!(ctl.send_message("hi"), async {
        ctl.select_conversation(&id(2)).await;
        ctl.select_conversation(&id(1)).await;
        gate.notify_one();
    });

    assert!(sent.is_applied());
    let view = ctl.view();
    assert_eq!(view.current.as_ref().map(|c| &c.id), Some(&id(1)));
    let contents: Vec<_> = view
        .transcript
        .entries()
        .iter()
        .map(|b| b.content.as_str())
        .collect();
    assert_eq!(contents, vec!["earlier", "hi", "hello"]);
    assert!(view.composer_enabled);
}

#[tokio::test]
async fn test_reply_is_dropped_when_selection_moves() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::with_conversations(&[1, 2]).gated(gate.clone()));
    let ctl = controller(&gateway);
    ctl.refresh_list(None).await;

    let (sent, _) = tokio::join!(ctl.send_message("hi"), async {
        ctl.select_conversation(&id(2)).await;
        gate.notify_one();
    });

    assert!(sent.is_applied());
    assert_eq!(ctl.current_id(), Some(id(2)));
    assert_eq!(ctl.view().transcript, Transcript::Empty);
}

#[tokio::test]
async fn test_unreachable_backend_is_reported() {
    let gateway = Arc::new(FakeGateway::with_conversations(&[]));
    let ctl = controller(&gateway);

    assert!(matches!(ctl.check_backend().await, Outcome::Failed(_)));

    let notices = ctl.take_notices();
    assert_eq!(
        notices[0].message,
        "Backend unreachable: network failure: connection refused"
    );
    assert!(ctl.take_notices().is_empty());
}
