pub mod chat;
pub mod conversation;
pub mod history;
pub mod list;
pub mod ping;
pub mod send;
mod support;
