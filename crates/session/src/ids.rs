use std::fmt;
use std::str::FromStr;

use snafu::ResultExt;
use uuid::Uuid;

use super::error::{InvalidIdSnafu, SessionError, SessionResult};

// UUIDv7 keeps ids unique and ordered by creation time without a shared counter.
macro_rules! define_session_id {
    ($name:ident, $id_type:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new(raw: Uuid) -> Self {
                Self(raw)
            }

            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn parse(raw: &str) -> SessionResult<Self> {
                let parsed = Uuid::parse_str(raw).context(InvalidIdSnafu {
                    stage: "parse-session-id",
                    id_type: $id_type,
                    raw: raw.to_string(),
                })?;
                Ok(Self(parsed))
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = SessionError;

            fn from_str(raw: &str) -> SessionResult<Self> {
                Self::parse(raw)
            }
        }
    };
}

define_session_id!(SessionId, "session-id");
define_session_id!(MessageId, "message-id");

/// Routing key for one in-flight simulated reply.
///
/// Tickets are minted from a per-store counter and never reused, so a completion
/// that outlives its reply (teardown, superseded send) can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyTicket(pub u64);

impl ReplyTicket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ReplyTicket {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "reply-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_survives_display_and_parse() {
        let id = SessionId::new_v7();
        let parsed: SessionId = id.to_string().parse().expect("valid uuid text");
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_id_reports_id_type() {
        let error = MessageId::parse("not-a-valid-uuid").expect_err("must reject");
        match error {
            SessionError::InvalidId { id_type, raw, .. } => {
                assert_eq!(id_type, "message-id");
                assert_eq!(raw, "not-a-valid-uuid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn v7_ids_are_distinct() {
        let first = SessionId::new_v7();
        let second = SessionId::new_v7();
        assert_ne!(first, second);
    }
}
