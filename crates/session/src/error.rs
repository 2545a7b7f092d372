use snafu::Snafu;

use crate::ids::SessionId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("session id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: uuid::Error,
    },
    #[snafu(display("message content is empty after trimming"))]
    EmptyMessage { stage: &'static str },
    #[snafu(display("a reply for session '{session_id}' is still pending"))]
    ReplyPending {
        stage: &'static str,
        session_id: SessionId,
    },
    #[snafu(display("session '{id}' does not exist"))]
    UnknownSession { stage: &'static str, id: SessionId },
    #[snafu(display("no tokio runtime is available to schedule replies"))]
    RuntimeUnavailable {
        stage: &'static str,
        source: tokio::runtime::TryCurrentError,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
