use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::ids::{MessageId, SessionId};

/// Title shown for a session until its first user message arrives.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";
/// Session titles keep at most this many characters of the first prompt.
pub const SESSION_TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    User,
    Assistant,
}

/// One appended chat message. Never mutated after it lands in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub has_charts: bool,
    pub timestamp_unix_seconds: u64,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp_unix_seconds: u64) -> Self {
        Self {
            id: MessageId::new_v7(),
            role: MessageRole::User,
            content: content.into(),
            has_charts: false,
            timestamp_unix_seconds,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        has_charts: bool,
        timestamp_unix_seconds: u64,
    ) -> Self {
        Self {
            id: MessageId::new_v7(),
            role: MessageRole::Assistant,
            content: content.into(),
            has_charts,
            timestamp_unix_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at_unix_seconds: u64,
}

impl ChatSession {
    pub fn new(created_at_unix_seconds: u64) -> Self {
        Self {
            id: SessionId::new_v7(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at_unix_seconds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Appends a message, deriving the title when it is the first one.
    pub(crate) fn append(&mut self, message: ChatMessage) {
        if self.messages.is_empty() && message.role == MessageRole::User {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
    }
}

/// First [`SESSION_TITLE_MAX_CHARS`] characters of a prompt.
///
/// Counts chars rather than bytes so multi-byte prompts are never split mid-codepoint.
pub fn derive_title(content: &str) -> String {
    content.chars().take(SESSION_TITLE_MAX_CHARS).collect()
}

pub fn unix_now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_truncated_to_fifty_chars() {
        let prompt = "x".repeat(80);
        assert_eq!(derive_title(&prompt).chars().count(), SESSION_TITLE_MAX_CHARS);
        assert_eq!(derive_title("short prompt"), "short prompt");
    }

    #[test]
    fn title_truncation_respects_char_boundaries() {
        let prompt = "é".repeat(60);
        let title = derive_title(&prompt);
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title, "é".repeat(50));
    }

    #[test]
    fn only_first_user_message_sets_title() {
        let mut session = ChatSession::new(0);
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);

        session.append(ChatMessage::user("first prompt", 1));
        session.append(ChatMessage::assistant("reply", false, 2));
        session.append(ChatMessage::user("second prompt", 3));

        assert_eq!(session.title, "first prompt");
        assert_eq!(session.messages.len(), 3);
    }
}
