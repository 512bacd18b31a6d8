//! UI-agnostic conversation state.
//!
//! `ChatSession` is the in-memory log of exchanged messages for the current
//! run. It is append-only: messages are never edited, removed, or reordered,
//! and insertion order is display order. Only completed sends and received
//! answers enter the session; transient UI entries (error banners, the
//! thinking placeholder) live in the transcript instead.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only message log, alive for the process lifetime.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    pub fn push_user(&mut self, content: String) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content,
        });
    }

    pub fn push_assistant(&mut self, content: String) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_preserves_insertion_order() {
        let mut session = ChatSession::new();
        session.push_user("first".to_string());
        session.push_assistant("second".to_string());
        session.push_user("third".to_string());

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[2].content, "third");
    }

    #[test]
    fn test_empty_session() {
        let session = ChatSession::new();
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
    }
}
