use std::collections::HashMap;

use crate::models::{Conversation, ConversationId, Message, Role};

/// Where a rendered bubble came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleOrigin {
    /// Loaded from the server.
    Server,
    /// User text appended before the server confirmed it.
    Provisional,
    /// Assistant reply echoed from a successful send.
    Reply,
    /// Send failure rendered in place of a reply.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub role: Role,
    pub content: String,
    pub origin: BubbleOrigin,
    /// Server timestamp; local bubbles have none.
    pub created_at: Option<String>,
}

impl Bubble {
    pub fn provisional(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            origin: BubbleOrigin::Provisional,
            created_at: None,
        }
    }

    pub fn reply(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            origin: BubbleOrigin::Reply,
            created_at: None,
        }
    }

    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            origin: BubbleOrigin::Failure,
            created_at: None,
        }
    }
}

impl From<Message> for Bubble {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: message.content,
            origin: BubbleOrigin::Server,
            created_at: message.created_at,
        }
    }
}

/// Message panel contents.
///
/// `Empty` is a real terminal state (the conversation has no messages yet) and
/// is kept distinct from `Entries` so hosts render a placeholder instead of an
/// empty container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    NoSelection,
    Loading,
    Empty,
    Entries(Vec<Bubble>),
}

impl Transcript {
    pub fn from_messages(messages: Vec<Message>) -> Self {
        if messages.is_empty() {
            Self::Empty
        } else {
            Self::Entries(messages.into_iter().map(Bubble::from).collect())
        }
    }

    pub fn push(&mut self, bubble: Bubble) {
        match self {
            Self::Entries(entries) => entries.push(bubble),
            _ => *self = Self::Entries(vec![bubble]),
        }
    }

    pub fn entries(&self) -> &[Bubble] {
        match self {
            Self::Entries(entries) => entries,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking notification for the host to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the controller keeps between operations.
#[derive(Debug)]
pub(crate) struct ChatState {
    pub conversations: Vec<Conversation>,
    pub current: Option<Conversation>,
    pub transcript: Transcript,
    pub composer_focused: bool,
    pub notices: Vec<Notice>,
    /// Conversations with a request outstanding, with the text of the
    /// provisional bubble when that request is a send.
    pub in_flight: HashMap<ConversationId, Option<String>>,
    /// Bumped every time a send settles.
    pub settled_sends: u64,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            conversations: Vec::new(),
            current: None,
            transcript: Transcript::NoSelection,
            composer_focused: false,
            notices: Vec::new(),
            in_flight: HashMap::new(),
            settled_sends: 0,
        }
    }
}

impl ChatState {
    pub fn current_id(&self) -> Option<&ConversationId> {
        self.current.as_ref().map(|c| &c.id)
    }

    pub fn is_current(&self, id: &ConversationId) -> bool {
        self.current_id() == Some(id)
    }

    /// Makes `conversation` current. The transcript is only reset when the
    /// selection actually moves to another conversation.
    pub fn select(&mut self, conversation: Conversation) {
        if !self.is_current(&conversation.id) {
            self.transcript = Transcript::Loading;
        }
        self.current = Some(conversation);
        self.composer_focused = true;
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
        self.transcript = Transcript::NoSelection;
        self.composer_focused = false;
    }

    /// Composer and rename/delete are usable only with a selection that has
    /// no request outstanding.
    pub fn controls_enabled(&self) -> bool {
        match self.current_id() {
            Some(id) => !self.in_flight.contains_key(id),
            None => false,
        }
    }

    pub fn find(&self, id: &ConversationId) -> Option<&Conversation> {
        find(&self.conversations, id)
    }

    /// Text of the send outstanding for `id`, if any.
    pub fn pending_send(&self, id: &ConversationId) -> Option<&str> {
        self.in_flight.get(id).and_then(|text| text.as_deref())
    }
}

fn find<'a>(conversations: &'a [Conversation], id: &ConversationId) -> Option<&'a Conversation> {
    conversations.iter().find(|c| &c.id == id)
}

/// Picks the conversation to select after a list fetch.
///
/// Priority: `preferred` if fetched, else `current` if still fetched, else the
/// first fetched entry, else nothing.
pub fn select_from<'a>(
    conversations: &'a [Conversation],
    preferred: Option<&ConversationId>,
    current: Option<&ConversationId>,
) -> Option<&'a Conversation> {
    preferred
        .and_then(|id| find(conversations, id))
        .or_else(|| current.and_then(|id| find(conversations, id)))
        .or_else(|| conversations.first())
}

/// Read-only copy of the controller state for hosts to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub conversations: Vec<Conversation>,
    pub current: Option<Conversation>,
    pub transcript: Transcript,
    pub composer_enabled: bool,
    pub actions_enabled: bool,
    pub composer_focused: bool,
}

impl ChatView {
    pub fn header(&self) -> &str {
        self.current
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("Select a conversation")
    }
}

impl From<&ChatState> for ChatView {
    fn from(state: &ChatState) -> Self {
        let enabled = state.controls_enabled();
        Self {
            conversations: state.conversations.clone(),
            current: state.current.clone(),
            transcript: state.transcript.clone(),
            composer_enabled: enabled,
            actions_enabled: enabled,
            composer_focused: state.composer_focused && enabled,
        }
    }
}
