pub mod auth;
pub mod charts;
pub mod error;
pub mod ids;
pub mod logging;
pub mod manager;
pub mod reply;
pub mod settings;
pub mod store;
pub mod theme;
pub mod types;

pub use auth::{AuthSession, AuthState, LoginError, validate_credentials};
pub use error::{SessionError, SessionResult};
pub use ids::{MessageId, ReplyTicket, SessionId};
pub use logging::init_tracing;
pub use manager::{DEFAULT_REPLY_LATENCY, ManagerConfig, SessionManager};
pub use reply::{ReplyPlan, classify};
pub use settings::{DashboardSettings, SettingsError, SettingsStore};
pub use store::{DeliveredReply, PendingReply, SendReceipt, SessionStore};
pub use theme::ThemePreference;
pub use types::{
    ChatMessage, ChatSession, DEFAULT_SESSION_TITLE, MessageRole, SESSION_TITLE_MAX_CHARS,
};
