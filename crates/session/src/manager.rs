use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use snafu::ResultExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::{RuntimeUnavailableSnafu, SessionResult};
use super::ids::{ReplyTicket, SessionId};
use super::store::{SendReceipt, SessionStore};
use super::types::unix_now_seconds;

pub const DEFAULT_REPLY_LATENCY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Simulated delay between an accepted send and its assistant reply.
    pub reply_latency: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            reply_latency: DEFAULT_REPLY_LATENCY,
        }
    }
}

impl ManagerConfig {
    pub fn with_reply_latency(mut self, reply_latency: Duration) -> Self {
        self.reply_latency = reply_latency;
        self
    }
}

/// Authoritative store plus the channel observers read snapshots from.
struct SharedState {
    store: Mutex<SessionStore>,
    published: watch::Sender<SessionStore>,
}

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, store: &SessionStore) {
        self.published.send_replace(store.clone());
    }

    fn deliver(&self, ticket: ReplyTicket) {
        let mut store = self.lock();
        match store.resolve_pending(ticket, unix_now_seconds()) {
            Some(delivered) => {
                tracing::info!(
                    session_id = %delivered.session_id,
                    message_id = %delivered.message_id,
                    plan = delivered.plan.name(),
                    "delivered simulated reply"
                );
                self.publish(&store);
            }
            None => {
                tracing::debug!(%ticket, "dropping stale reply completion");
            }
        }
    }
}

/// Scheduled reply; dropping it cancels the timer.
struct ReplyTask {
    ticket: ReplyTicket,
    handle: JoinHandle<()>,
}

impl Drop for ReplyTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Single writer for one dashboard's chat state.
///
/// Every mutation goes through these operations; the presentation layer reads
/// snapshots via [`SessionManager::subscribe`] or [`SessionManager::read`].
/// Dropping the manager cancels any pending reply.
pub struct SessionManager {
    shared: Arc<SharedState>,
    runtime: Handle,
    config: ManagerConfig,
    reply_task: Option<ReplyTask>,
}

impl SessionManager {
    pub fn new(config: ManagerConfig, runtime: Handle) -> Self {
        let store = SessionStore::new();
        let (published, _) = watch::channel(store.clone());

        Self {
            shared: Arc::new(SharedState {
                store: Mutex::new(store),
                published,
            }),
            runtime,
            config,
            reply_task: None,
        }
    }

    /// Builds a manager on the ambient tokio runtime.
    pub fn for_current_runtime(config: ManagerConfig) -> SessionResult<Self> {
        let runtime = Handle::try_current().context(RuntimeUnavailableSnafu {
            stage: "session-manager-current-runtime",
        })?;
        Ok(Self::new(config, runtime))
    }

    pub fn config(&self) -> ManagerConfig {
        self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStore> {
        self.shared.published.subscribe()
    }

    pub fn snapshot(&self) -> SessionStore {
        self.shared.lock().clone()
    }

    pub fn read<R>(&self, reader: impl FnOnce(&SessionStore) -> R) -> R {
        reader(&self.shared.lock())
    }

    pub fn is_pending(&self) -> bool {
        self.read(SessionStore::is_pending)
    }

    pub fn create_session(&mut self) -> SessionId {
        let mut store = self.shared.lock();
        let session_id = store.create_session(unix_now_seconds());
        self.shared.publish(&store);
        tracing::info!(%session_id, "created chat session");
        session_id
    }

    pub fn select_session(&mut self, id: SessionId) -> SessionResult<()> {
        let mut store = self.shared.lock();
        if let Err(error) = store.select_session(id) {
            tracing::warn!(%id, "ignoring selection of unknown session");
            return Err(error);
        }
        self.shared.publish(&store);
        Ok(())
    }

    /// Appends the user message now and schedules the assistant reply.
    ///
    /// Rejected sends (blank content, reply already pending) leave the store untouched.
    pub fn send_message(&mut self, content: &str) -> SessionResult<SendReceipt> {
        let receipt = {
            let mut store = self.shared.lock();
            let receipt = match store.begin_send(content, unix_now_seconds()) {
                Ok(receipt) => receipt,
                Err(error) => {
                    tracing::warn!("rejected send: {error}");
                    return Err(error);
                }
            };
            self.shared.publish(&store);
            receipt
        };

        tracing::info!(
            session_id = %receipt.session_id,
            ticket = %receipt.ticket,
            created_session = receipt.created_session,
            "accepted user message"
        );
        self.schedule_reply(receipt.ticket);
        Ok(receipt)
    }

    /// Cancels the pending reply. No state changes are published afterwards for it.
    pub fn shutdown(&mut self) {
        let cancelled = self.shared.lock().cancel_pending();
        if let Some(task) = self.reply_task.take() {
            tracing::debug!(ticket = %task.ticket, "cancelling reply timer");
        }
        if let Some(pending) = cancelled {
            tracing::info!(
                session_id = %pending.session_id,
                ticket = %pending.ticket,
                "discarded pending reply on teardown"
            );
        }
    }

    fn schedule_reply(&mut self, ticket: ReplyTicket) {
        let shared = Arc::clone(&self.shared);
        let latency = self.config.reply_latency;
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            shared.deliver(ticket);
        });

        // Replacing a finished task is harmless; a live one cannot exist while the gate holds.
        self.reply_task = Some(ReplyTask { ticket, handle });
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::reply::TOP_ISSUES_REPLY;
    use crate::types::MessageRole;

    fn manager() -> SessionManager {
        SessionManager::for_current_runtime(ManagerConfig::default()).expect("inside runtime")
    }

    async fn wait_for_reply() {
        tokio::time::sleep(DEFAULT_REPLY_LATENCY + Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn chart_prompt_end_to_end() {
        let mut manager = manager();
        let prompt = "Give SDM PIE chart and bar graph for last annual maintenance";
        manager.send_message(prompt).expect("send accepted");
        wait_for_reply().await;

        let store = manager.snapshot();
        assert_eq!(store.sessions().len(), 1);
        let messages = &store.sessions()[0].messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, prompt);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(messages[1].has_charts);
        assert_eq!(messages[1].content, "");
        assert!(!store.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_full_latency() {
        let mut manager = manager();
        manager.send_message("hello").expect("send accepted");

        tokio::time::sleep(DEFAULT_REPLY_LATENCY - Duration::from_millis(1)).await;
        assert!(manager.is_pending());
        assert_eq!(manager.read(|store| store.sessions()[0].messages.len()), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!manager.is_pending());
        assert_eq!(manager.read(|store| store.sessions()[0].messages.len()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_send_is_rejected_while_pending() {
        let mut manager = manager();
        manager.send_message("hello").expect("send accepted");
        let error = manager.send_message("world").expect_err("gate holds");
        assert!(matches!(error, SessionError::ReplyPending { .. }));

        let contents = manager.read(|store| {
            store.sessions()[0]
                .messages
                .iter()
                .map(|message| message.content.clone())
                .collect::<Vec<_>>()
        });
        assert_eq!(contents, vec!["hello".to_string()]);

        wait_for_reply().await;
        manager.send_message("world").expect("gate released");
    }

    #[tokio::test(start_paused = true)]
    async fn reply_follows_originating_session_across_navigation() {
        let mut manager = manager();
        let session_a = manager.create_session();
        manager.send_message("What are the top issues?").expect("accepted");
        let session_b = manager.create_session();
        manager.select_session(session_b).expect("known session");

        wait_for_reply().await;

        let store = manager.snapshot();
        assert_eq!(store.active_session_id(), Some(session_b));
        let a = store.session(session_a).expect("session a");
        assert_eq!(a.messages.len(), 2);
        assert_eq!(a.messages[1].content, TOP_ISSUES_REPLY);
        assert!(store.session(session_b).expect("session b").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn observers_see_user_message_then_reply() {
        let mut manager = manager();
        let mut updates = manager.subscribe();
        manager.send_message("Show me incident trends").expect("accepted");

        updates.changed().await.expect("sender alive");
        assert!(updates.borrow_and_update().is_pending());

        updates.changed().await.expect("sender alive");
        let store = updates.borrow_and_update();
        assert!(!store.is_pending());
        assert_eq!(store.sessions()[0].messages.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_pending_reply() {
        let mut manager = manager();
        manager.send_message("hello").expect("accepted");
        manager.shutdown();
        wait_for_reply().await;

        let store = manager.snapshot();
        assert!(!store.is_pending());
        assert_eq!(store.sessions()[0].messages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_manager_stops_all_updates() {
        let mut manager = manager();
        let mut updates = manager.subscribe();
        manager.send_message("hello").expect("accepted");
        let _ = updates.borrow_and_update();

        drop(manager);
        wait_for_reply().await;

        assert!(!updates.has_changed().unwrap_or(false));
        assert_eq!(updates.borrow().sessions()[0].messages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_latency_is_honoured() {
        let config = ManagerConfig::default().with_reply_latency(Duration::from_millis(10));
        let mut manager = SessionManager::for_current_runtime(config).expect("inside runtime");
        manager.send_message("hello").expect("accepted");

        tokio::time::sleep(Duration::from_millis(11)).await;
        assert!(!manager.is_pending());
    }

    #[test]
    fn construction_outside_runtime_is_reported() {
        let error = SessionManager::for_current_runtime(ManagerConfig::default())
            .err()
            .expect("no runtime in plain test");
        assert!(matches!(error, SessionError::RuntimeUnavailable { .. }));
    }
}
