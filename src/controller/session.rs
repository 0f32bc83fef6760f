//! Sign-in state
//!
//! `SessionController` keeps `Authenticated` in step with the vault: it is
//! entered only after a token has been stored, and `sign_out` always lands
//! in `Unauthenticated` even when the stored blob cannot be deleted.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::core::outcome::{failure_message, Outcome};
use crate::core::repository::SessionRepository;
use crate::error::{GhviewError, Result};

const SIGN_IN_FAILED: &str = "Sign-in failed";
const VIEWER_FAILED: &str = "Failed to load account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initial,
    Loading,
    Unauthenticated,
    Authenticated,
    Error(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// What the last sign-in tried, for `retry`
#[derive(Clone)]
enum Attempt {
    Code(String),
    Token(SecretString),
}

pub struct SessionController {
    repository: Arc<SessionRepository>,
    state: watch::Sender<SessionState>,
    last_attempt: Option<Attempt>,
}

impl SessionController {
    /// Create the controller and restore any stored session
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        let (state, _) = watch::channel(SessionState::Initial);
        let mut controller = Self {
            repository,
            state,
            last_attempt: None,
        };
        controller.restore();
        controller
    }

    fn restore(&mut self) {
        self.set(SessionState::Loading);
        let restored = if self.repository.current_token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        tracing::debug!(state = ?restored, "restored session");
        self.set(restored);
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Exchange an OAuth authorization code and store the resulting token
    pub async fn sign_in(&mut self, code: &str) -> SessionState {
        self.attempt(Attempt::Code(code.trim().to_string())).await
    }

    /// Validate and store a personal access token
    pub async fn sign_in_with_token(&mut self, token: &str) -> SessionState {
        self.attempt(Attempt::Token(SecretString::from(token.trim().to_string())))
            .await
    }

    /// Repeat the last sign-in attempt
    ///
    /// Only meaningful from `Error`; otherwise the current state is returned
    /// unchanged.
    pub async fn retry(&mut self) -> SessionState {
        let attempt = match (self.state(), self.last_attempt.clone()) {
            (SessionState::Error(_), Some(attempt)) => attempt,
            (state, _) => return state,
        };
        self.attempt(attempt).await
    }

    /// Forget the stored token
    pub fn sign_out(&mut self) -> SessionState {
        self.set(SessionState::Loading);
        self.repository.forget_token();
        self.last_attempt = None;
        self.set(SessionState::Unauthenticated);
        self.state()
    }

    /// Login of the signed-in account
    pub async fn viewer(&self) -> Outcome<String> {
        Outcome::from_result(self.repository.current_user().await, VIEWER_FAILED)
    }

    async fn attempt(&mut self, attempt: Attempt) -> SessionState {
        self.last_attempt = Some(attempt.clone());
        self.set(SessionState::Loading);

        match self.authenticate(&attempt).await {
            Ok(()) => {
                tracing::info!("signed in");
                self.set(SessionState::Authenticated);
            }
            Err(e) => {
                tracing::warn!("sign-in failed: {}", e);
                self.set(SessionState::Error(failure_message(&e, SIGN_IN_FAILED)));
            }
        }
        self.state()
    }

    async fn authenticate(&self, attempt: &Attempt) -> Result<()> {
        let token = match attempt {
            Attempt::Code(code) => {
                if code.is_empty() {
                    return Err(GhviewError::InvalidInput(
                        "Authorization code must not be empty".to_string(),
                    ));
                }
                self.repository.exchange_code(code).await?.access_token
            }
            Attempt::Token(token) => {
                if token.expose_secret().is_empty() {
                    return Err(GhviewError::InvalidInput(
                        "Token must not be empty".to_string(),
                    ));
                }
                self.repository.validate_token(token).await?;
                token.clone()
            }
        };

        self.repository.store_token(token.expose_secret())
    }

    fn set(&self, state: SessionState) {
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::core::credentials::CredentialVault;
    use crate::core::keys::EphemeralKeyProvider;
    use crate::core::slot::{MemorySlot, SecretSlot};
    use crate::github::auth::{OAuthApp, TokenGrant};
    use crate::github::gateway::MockRemoteGateway;
    use crate::github::models::UserDto;

    fn oauth_app() -> OAuthApp {
        OAuthApp {
            client_id: "Iv1.test".to_string(),
            client_secret: SecretString::from("shh".to_string()),
            redirect_uri: "http://127.0.0.1:8765/callback".to_string(),
        }
    }

    fn grant(token: &str) -> TokenGrant {
        TokenGrant {
            access_token: SecretString::from(token.to_string()),
            token_type: "bearer".to_string(),
            scope: "repo".to_string(),
        }
    }

    fn repository(gateway: MockRemoteGateway, slot: impl SecretSlot + 'static) -> Arc<SessionRepository> {
        let vault = CredentialVault::new(slot, EphemeralKeyProvider::new());
        Arc::new(SessionRepository::new(Arc::new(gateway), vault).with_oauth(Some(oauth_app())))
    }

    /// Slot whose delete always fails
    struct StuckSlot(MemorySlot);

    impl SecretSlot for StuckSlot {
        fn read(&self) -> io::Result<Option<Vec<u8>>> {
            self.0.read()
        }

        fn write(&self, blob: &[u8]) -> io::Result<()> {
            self.0.write(blob)
        }

        fn remove(&self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_starts_unauthenticated_without_token() {
        let controller = SessionController::new(repository(MockRemoteGateway::new(), MemorySlot::new()));
        assert_eq!(controller.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_restores_stored_session() {
        let repository = repository(MockRemoteGateway::new(), MemorySlot::new());
        repository.store_token("tok-1").unwrap();

        let controller = SessionController::new(repository);
        assert!(controller.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_stores_token() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_exchange_code_for_token()
            .withf(|app, code| app.client_id == "Iv1.test" && code == "abc123")
            .times(1)
            .returning(|_, _| Ok(grant("gho_token")));

        let repository = repository(gateway, MemorySlot::new());
        let mut controller = SessionController::new(repository.clone());

        let state = controller.sign_in(" abc123 ").await;
        assert_eq!(state, SessionState::Authenticated);
        assert_eq!(
            repository.current_token().unwrap().expose_secret(),
            "gho_token"
        );
    }

    #[tokio::test]
    async fn test_failed_sign_in_is_error_without_token() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_exchange_code_for_token().returning(|_, _| {
            Err(GhviewError::AuthenticationFailed(
                "The authorization code is incorrect or expired.".to_string(),
            ))
        });

        let repository = repository(gateway, MemorySlot::new());
        let mut controller = SessionController::new(repository.clone());

        let state = controller.sign_in("stale").await;
        assert!(matches!(state, SessionState::Error(ref m) if m.contains("incorrect or expired")));
        assert!(repository.current_token().is_none());
    }

    #[tokio::test]
    async fn test_retry_repeats_last_code() {
        let mut calls = 0;
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_exchange_code_for_token()
            .withf(|_, code| code == "abc")
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Err(GhviewError::Custom("network down".to_string()))
                } else {
                    Ok(grant("gho_token"))
                }
            });

        let mut controller = SessionController::new(repository(gateway, MemorySlot::new()));
        assert_eq!(
            controller.sign_in("abc").await,
            SessionState::Error("network down".to_string())
        );
        assert_eq!(controller.retry().await, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_retry_outside_error_is_noop() {
        let mut controller = SessionController::new(repository(MockRemoteGateway::new(), MemorySlot::new()));
        assert_eq!(controller.retry().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected_locally() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_exchange_code_for_token().never();

        let mut controller = SessionController::new(repository(gateway, MemorySlot::new()));
        let state = controller.sign_in("   ").await;
        assert!(matches!(state, SessionState::Error(_)));
    }

    #[tokio::test]
    async fn test_personal_token_is_validated_before_storing() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_current_user()
            .withf(|token| {
                token.as_ref().map(|t| t.expose_secret().to_string()) == Some("ghp_pat".to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(UserDto {
                    id: 1,
                    login: "octo".to_string(),
                    avatar_url: String::new(),
                })
            });

        let repository = repository(gateway, MemorySlot::new());
        let mut controller = SessionController::new(repository.clone());

        assert_eq!(
            controller.sign_in_with_token("ghp_pat").await,
            SessionState::Authenticated
        );
        assert!(repository.current_token().is_some());
    }

    #[tokio::test]
    async fn test_rejected_personal_token_is_not_stored() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_current_user().returning(|_| {
            Err(crate::github::error_handler::classify_message(
                Some(401),
                "Bad credentials",
            ))
        });

        let repository = repository(gateway, MemorySlot::new());
        let mut controller = SessionController::new(repository.clone());

        let state = controller.sign_in_with_token("ghp_wrong").await;
        assert!(matches!(state, SessionState::Error(_)));
        assert!(repository.current_token().is_none());
    }

    #[test]
    fn test_sign_out_survives_failing_delete() {
        let repository = repository(MockRemoteGateway::new(), StuckSlot(MemorySlot::new()));
        repository.store_token("tok-1").unwrap();

        let mut controller = SessionController::new(repository.clone());
        assert!(controller.state().is_authenticated());

        assert_eq!(controller.sign_out(), SessionState::Unauthenticated);
        assert!(repository.current_token().is_none());
    }

    #[test]
    fn test_sign_out_notifies_subscribers() {
        let repository = repository(MockRemoteGateway::new(), MemorySlot::new());
        repository.store_token("tok-1").unwrap();

        let mut controller = SessionController::new(repository);
        let mut rx = controller.subscribe();
        controller.sign_out();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Unauthenticated);
    }
}
