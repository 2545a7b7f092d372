use snafu::ensure;

use super::error::{EmptyMessageSnafu, ReplyPendingSnafu, SessionResult, UnknownSessionSnafu};
use super::ids::{MessageId, ReplyTicket, SessionId};
use super::reply::{ReplyPlan, classify};
use super::types::{ChatMessage, ChatSession};

/// The reply currently in flight, captured by value when the user message is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub ticket: ReplyTicket,
    pub session_id: SessionId,
    pub prompt: String,
}

/// Outcome of an accepted send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub ticket: ReplyTicket,
    /// True when the send had to create a session because none was active.
    pub created_session: bool,
}

/// Outcome of a delivered reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveredReply {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub plan: ReplyPlan,
}

/// All chat state of one dashboard view.
///
/// Pure state transitions only; scheduling of the simulated latency lives in
/// [`crate::manager::SessionManager`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_session_id: Option<SessionId>,
    pending: Option<PendingReply>,
    next_ticket: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions, newest first.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active_session_id
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.active_session_id.and_then(|id| self.session(id))
    }

    pub fn session(&self, id: SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_reply(&self) -> Option<&PendingReply> {
        self.pending.as_ref()
    }

    pub fn create_session(&mut self, now_unix_seconds: u64) -> SessionId {
        let session = ChatSession::new(now_unix_seconds);
        let id = session.id;
        self.sessions.insert(0, session);
        self.active_session_id = Some(id);
        id
    }

    /// Activates an existing session. Unknown ids leave the store untouched.
    pub fn select_session(&mut self, id: SessionId) -> SessionResult<()> {
        ensure!(
            self.session(id).is_some(),
            UnknownSessionSnafu {
                stage: "select-session",
                id,
            }
        );
        self.active_session_id = Some(id);
        Ok(())
    }

    /// Synchronous phase of a send: append the user message and mark the reply pending.
    pub fn begin_send(
        &mut self,
        content: &str,
        now_unix_seconds: u64,
    ) -> SessionResult<SendReceipt> {
        ensure!(
            !content.trim().is_empty(),
            EmptyMessageSnafu {
                stage: "begin-send-validate-content",
            }
        );
        if let Some(pending) = self.pending.as_ref() {
            return ReplyPendingSnafu {
                stage: "begin-send-pending-gate",
                session_id: pending.session_id,
            }
            .fail();
        }

        let (session_id, created_session) = match self.active_target_index() {
            Some(index) => (self.sessions[index].id, false),
            None => (self.create_session(now_unix_seconds), true),
        };

        let message = ChatMessage::user(content, now_unix_seconds);
        let message_id = message.id;
        let Some(session) = self.session_mut(session_id) else {
            return UnknownSessionSnafu {
                stage: "begin-send-target",
                id: session_id,
            }
            .fail();
        };
        session.append(message);

        let ticket = self.mint_ticket();
        self.pending = Some(PendingReply {
            ticket,
            session_id,
            prompt: content.to_string(),
        });

        Ok(SendReceipt {
            session_id,
            message_id,
            ticket,
            created_session,
        })
    }

    /// Deferred phase of a send.
    ///
    /// Applies only when `ticket` is the pending one; the reply lands on the session
    /// that originated the request, whatever is active now.
    pub fn resolve_pending(
        &mut self,
        ticket: ReplyTicket,
        now_unix_seconds: u64,
    ) -> Option<DeliveredReply> {
        if self.pending.as_ref().is_none_or(|pending| pending.ticket != ticket) {
            return None;
        }
        let pending = self.pending.take()?;

        let plan = classify(&pending.prompt);
        let message = ChatMessage::assistant(plan.content(), plan.has_charts(), now_unix_seconds);
        let message_id = message.id;
        let session = self.session_mut(pending.session_id)?;
        session.append(message);

        Some(DeliveredReply {
            session_id: pending.session_id,
            message_id,
            plan,
        })
    }

    /// Drops the in-flight reply so a late completion becomes a no-op.
    pub fn cancel_pending(&mut self) -> Option<PendingReply> {
        self.pending.take()
    }

    fn active_target_index(&self) -> Option<usize> {
        let active = self.active_session_id?;
        self.sessions.iter().position(|session| session.id == active)
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    fn mint_ticket(&mut self) -> ReplyTicket {
        self.next_ticket = self.next_ticket.saturating_add(1);
        ReplyTicket::new(self.next_ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::reply::TRENDS_REPLY;
    use crate::types::{DEFAULT_SESSION_TITLE, MessageRole};

    #[test]
    fn create_session_prepends_and_activates() {
        let mut store = SessionStore::new();
        let first = store.create_session(10);
        let second = store.create_session(20);

        let ids: Vec<_> = store.sessions().iter().map(|session| session.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(store.active_session_id(), Some(second));
        assert_eq!(store.sessions()[0].title, DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn send_without_active_session_creates_exactly_one() {
        let mut store = SessionStore::new();
        let prompt = "Please summarise every incident we logged in the last quarter";
        let receipt = store.begin_send(prompt, 5).expect("send accepted");

        assert!(receipt.created_session);
        assert_eq!(store.sessions().len(), 1);
        let session = store.active_session().expect("active session");
        assert_eq!(session.id, receipt.session_id);
        assert_eq!(session.title, prompt.chars().take(50).collect::<String>());
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].content, prompt);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert!(store.is_pending());
    }

    #[test]
    fn pending_gate_rejects_second_send_without_mutation() {
        let mut store = SessionStore::new();
        store.begin_send("hello", 1).expect("first send accepted");
        let before = store.clone();

        let error = store.begin_send("world", 2).expect_err("second send rejected");
        assert!(matches!(error, SessionError::ReplyPending { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn blank_content_is_rejected() {
        let mut store = SessionStore::new();
        let error = store.begin_send("   \n", 1).expect_err("blank rejected");
        assert!(matches!(error, SessionError::EmptyMessage { .. }));
        assert!(store.sessions().is_empty());
        assert!(!store.is_pending());
    }

    #[test]
    fn reply_lands_on_originating_session() {
        let mut store = SessionStore::new();
        let session_a = store.create_session(1);
        let receipt = store.begin_send("Show me incident trends", 2).expect("accepted");
        let session_b = store.create_session(3);
        assert_eq!(store.active_session_id(), Some(session_b));

        let delivered = store
            .resolve_pending(receipt.ticket, 4)
            .expect("ticket matches");
        assert_eq!(delivered.session_id, session_a);
        assert_eq!(store.active_session_id(), Some(session_b));
        assert!(!store.is_pending());

        let a = store.session(session_a).expect("session a");
        assert_eq!(a.messages.len(), 2);
        assert_eq!(a.messages[1].content, TRENDS_REPLY);
        assert!(store.session(session_b).expect("session b").is_empty());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut store = SessionStore::new();
        let receipt = store.begin_send("hello", 1).expect("accepted");
        store.cancel_pending();
        let before = store.clone();

        assert!(store.resolve_pending(receipt.ticket, 2).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn tickets_are_never_reused() {
        let mut store = SessionStore::new();
        let first = store.begin_send("one", 1).expect("accepted");
        store.resolve_pending(first.ticket, 2).expect("delivered");
        let second = store.begin_send("two", 3).expect("accepted");
        assert_ne!(first.ticket, second.ticket);
        assert!(store.resolve_pending(first.ticket, 4).is_none());
    }

    #[test]
    fn title_is_frozen_after_first_message() {
        let mut store = SessionStore::new();
        let receipt = store.begin_send("original title", 1).expect("accepted");
        store.resolve_pending(receipt.ticket, 2).expect("delivered");
        store.begin_send("another prompt", 3).expect("accepted");

        assert_eq!(store.active_session().expect("active").title, "original title");
    }

    #[test]
    fn unknown_session_selection_is_rejected() {
        let mut store = SessionStore::new();
        let known = store.create_session(1);
        let error = store
            .select_session(SessionId::new_v7())
            .expect_err("unknown id rejected");

        assert!(matches!(error, SessionError::UnknownSession { .. }));
        assert_eq!(store.active_session_id(), Some(known));
    }
}
