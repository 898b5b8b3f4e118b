//! Staff Sessions
//!
//! In-memory token store behind the staff dashboard methods. Tokens
//! live until logout or daemon restart.

use printlab_core::application::Session;
use printlab_core::error::{AppError, Result};
use printlab_core::port::TokenProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

const SESSION_TOKEN_LENGTH: usize = 32;

pub struct SessionManager {
    tokens: RwLock<HashMap<String, String>>,
    token_provider: Arc<dyn TokenProvider>,
    staff_password: String,
}

impl SessionManager {
    pub fn new(token_provider: Arc<dyn TokenProvider>, staff_password: String) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            token_provider,
            staff_password,
        }
    }

    /// Exchange the shared staff password for a session token.
    pub async fn login(&self, password: &str, staff_name: &str) -> Result<String> {
        if password != self.staff_password {
            return Err(AppError::Unauthorized("invalid password".to_string()));
        }

        let token = self.token_provider.generate(SESSION_TOKEN_LENGTH);
        self.tokens
            .write()
            .await
            .insert(token.clone(), staff_name.to_string());

        info!(staff = %staff_name, "staff session opened");
        Ok(token)
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    /// Resolve a session token to a caller identity.
    pub async fn resolve(&self, token: &str) -> Result<Session> {
        match self.tokens.read().await.get(token) {
            Some(name) => Ok(Session::staff(name.clone())),
            None => Err(AppError::Unauthorized(
                "invalid or expired session".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printlab_core::port::HexTokenProvider;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(HexTokenProvider), "secret".to_string())
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let sessions = manager();

        let token = sessions.login("secret", "jordan").await.unwrap();
        let session = sessions.resolve(&token).await.unwrap();
        assert_eq!(session.require_staff().unwrap(), "jordan");
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let sessions = manager();

        let err = sessions.login("nope", "jordan").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_logout_invalidates_the_token() {
        let sessions = manager();

        let token = sessions.login("secret", "jordan").await.unwrap();
        assert!(sessions.logout(&token).await);
        assert!(sessions.resolve(&token).await.is_err());
        assert!(!sessions.logout(&token).await);
    }
}
