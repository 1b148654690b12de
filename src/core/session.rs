//! Authenticated session state.
//!
//! The token and user info live in a [`KeyValueCollection`] and are read
//! every time they are needed, so a logout (or an expired entry) takes
//! effect on the very next request.

use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const TOKEN_KEY: &str = "u-token";
const USER_KEY: &str = "u-info";

/// Lifetime of a login.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueCollection>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueCollection>) -> Self {
        Self { store }
    }

    pub async fn login(&self, user: &User, token: &str) -> Result<()> {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(SESSION_TTL).context("Invalid session lifetime")?;
        let stored = SessionUser {
            user: user.clone(),
            expires_at,
        };
        let payload = serde_json::to_vec(&stored).context("Failed to serialize user")?;

        self.store.put(USER_KEY, &payload, Some(SESSION_TTL)).await;
        self.store
            .put(TOKEN_KEY, token.as_bytes(), Some(SESSION_TTL))
            .await;
        info!(email = %user.email, "Logged in");
        Ok(())
    }

    pub async fn logout(&self) {
        self.store.remove(USER_KEY).await;
        self.store.remove(TOKEN_KEY).await;
        info!("Logged out");
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        let raw = self.store.get(USER_KEY).await?;
        match serde_json::from_slice(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Discarding unreadable session user");
                None
            }
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .await
            .and_then(|raw| String::from_utf8(raw).ok())
            .filter(|token| !token.is_empty())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;

    fn user() -> User {
        User {
            id: 1,
            name: "Síndico".to_string(),
            email: "sindico@example.com".to_string(),
            role: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let session = Session::new(Arc::new(MemoryCollection::new()));
        assert!(!session.is_authenticated().await);
        assert!(session.current_user().await.is_none());

        session.login(&user(), "abc123").await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(session.token().await.as_deref(), Some("abc123"));
        let current = session.current_user().await.unwrap();
        assert_eq!(current.user, user());
        assert!(current.expires_at > Utc::now());

        session.logout().await;
        assert!(!session.is_authenticated().await);
        assert!(session.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_sharing_a_store_see_the_same_state() {
        let store: Arc<dyn KeyValueCollection> = Arc::new(MemoryCollection::new());
        let first = Session::new(Arc::clone(&store));
        let second = Session::new(store);

        first.login(&user(), "tok").await.unwrap();
        assert_eq!(second.token().await.as_deref(), Some("tok"));

        second.logout().await;
        assert!(first.token().await.is_none());
    }
}
