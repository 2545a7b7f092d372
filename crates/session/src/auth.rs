use snafu::{Snafu, ensure};

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum LoginError {
    #[snafu(display("Please enter both username and password"))]
    MissingCredentials { stage: &'static str },
    #[snafu(display("Invalid credentials"))]
    Rejected { stage: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn {
        username: String,
    },
}

/// Mock authentication: any non-empty username and password pair is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    state: AuthState,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            tracing::warn!("login refused: missing credentials");
            return false;
        }

        tracing::info!(username, "signed in");
        self.state = AuthState::SignedIn {
            username: username.to_string(),
        };
        true
    }

    pub fn logout(&mut self) {
        if let AuthState::SignedIn { username } = &self.state {
            tracing::info!(username = username.as_str(), "signed out");
        }
        self.state = AuthState::SignedOut;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::SignedIn { .. })
    }

    /// Signed-in username, or an empty string.
    pub fn username(&self) -> &str {
        match &self.state {
            AuthState::SignedIn { username } => username,
            AuthState::SignedOut => "",
        }
    }
}

/// Form-level login used by the sign-in view.
///
/// Blank fields are reported before [`AuthSession::login`] is attempted.
pub fn validate_credentials(
    auth: &mut AuthSession,
    username: &str,
    password: &str,
) -> Result<(), LoginError> {
    ensure!(
        !username.is_empty() && !password.is_empty(),
        MissingCredentialsSnafu {
            stage: "validate-credentials-fields",
        }
    );
    ensure!(
        auth.login(username, password),
        RejectedSnafu {
            stage: "validate-credentials-login",
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let mut auth = AuthSession::new();
        assert!(!auth.login("", "secret"));
        assert!(!auth.login("alice", ""));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.username(), "");

        assert!(auth.login("alice", "secret"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.username(), "alice");
    }

    #[test]
    fn logout_clears_username() {
        let mut auth = AuthSession::new();
        auth.login("alice", "secret");
        auth.logout();
        assert!(!auth.is_authenticated());
        assert_eq!(auth.username(), "");
        assert_eq!(auth.state(), &AuthState::SignedOut);
    }

    #[test]
    fn form_validation_uses_user_facing_messages() {
        let mut auth = AuthSession::new();
        let error = validate_credentials(&mut auth, "alice", "").expect_err("blank password");
        assert_eq!(error.to_string(), "Please enter both username and password");
        assert!(!auth.is_authenticated());

        validate_credentials(&mut auth, "alice", "secret").expect("accepted");
        assert_eq!(auth.username(), "alice");
    }
}
