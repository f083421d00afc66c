//! Plain-text rendering of controller snapshots.

use crate::controller::{Bubble, BubbleOrigin, ChatView, Notice, NoticeLevel, Transcript};
use crate::models::{Conversation, ConversationId, Role};

pub const NO_SELECTION_TEXT: &str = "No conversation selected.";
pub const EMPTY_TRANSCRIPT_TEXT: &str = "No messages yet.";
pub const LOADING_TEXT: &str = "Loading messages...";

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    } else {
        s.to_string()
    }
}

/// Table of conversations; the selected one is marked with `*`.
pub fn conversation_table(
    conversations: &[Conversation],
    current: Option<&ConversationId>,
) -> String {
    let mut out = format!("  {:<8} {:<40} {:<20}\n", "ID", "TITLE", "CREATED");
    out.push_str(&"─".repeat(72));
    out.push('\n');

    for conv in conversations {
        let marker = if current == Some(&conv.id) { '*' } else { ' ' };
        out.push_str(&format!(
            "{} {:<8} {:<40} {:<20}\n",
            marker,
            conv.id.to_string(),
            truncate(&conv.title, 38),
            conv.created_at.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn bubble(bubble: &Bubble) -> String {
    let speaker = match bubble.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    match bubble.origin {
        BubbleOrigin::Failure => format!("{}> ✗ {}", speaker, bubble.content),
        _ => format!("{}> {}", speaker, bubble.content),
    }
}

pub fn transcript(transcript: &Transcript) -> String {
    match transcript {
        Transcript::NoSelection => NO_SELECTION_TEXT.to_string(),
        Transcript::Loading => LOADING_TEXT.to_string(),
        Transcript::Empty => EMPTY_TRANSCRIPT_TEXT.to_string(),
        Transcript::Entries(entries) => entries
            .iter()
            .map(bubble)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("ℹ {}", notice.message),
        NoticeLevel::Error => format!("✗ {}", notice.message),
    }
}

/// Header line plus transcript, as shown after switching conversations.
pub fn panel(view: &ChatView) -> String {
    let header = format!("── {} ", view.header());
    format!("{:─<60}\n{}", header, transcript(&view.transcript))
}
