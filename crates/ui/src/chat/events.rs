use sdm_session::SessionId;

/// Emitted when sidebar selection changes the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSelected {
    pub session_id: SessionId,
}

/// Emitted when the user submits a prompt, from the input or a suggestion card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewChatClicked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarToggleClicked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeToggleClicked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutClicked;
