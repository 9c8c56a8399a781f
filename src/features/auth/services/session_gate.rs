use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::clients::AuthProvider;
use crate::features::auth::model::{AuthenticatedUser, Session};

/// Per-session state held outside the gate, released when a session closes
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn session_closed(&self, id: Uuid);
}

/// Server-side registry of browser sessions.
///
/// Each session id owns a watch channel: subscribers see sign-in state changes,
/// including the final `None` on sign-out or expiry. Observers are told about every
/// close, whichever path caused it.
pub struct SessionGate {
    provider: Arc<dyn AuthProvider>,
    sessions: RwLock<HashMap<Uuid, watch::Sender<Option<Session>>>>,
    observers: Vec<Arc<dyn SessionObserver>>,
    config: SessionConfig,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn AuthProvider>, config: SessionConfig) -> Self {
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
            observers: Vec::new(),
            config,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Check credentials with the provider and open a new session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Uuid, Session)> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let session = self.provider.sign_in_with_password(email, password).await?;
        self.prune_expired().await;
        let id = Uuid::new_v4();
        let (sender, _) = watch::channel(Some(session.clone()));
        self.sessions.write().await.insert(id, sender);

        tracing::info!("Session opened for user {}", session.user.user_id);
        Ok((id, session))
    }

    /// The live session for an id. An expired session is closed on access.
    pub async fn current(&self, id: Uuid) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            let session = sessions.get(&id)?.borrow().clone()?;
            if !session.is_expired(Utc::now()) {
                return Some(session);
            }
        }

        tracing::info!("Session {} expired", id);
        self.close(id).await;
        None
    }

    pub async fn is_authenticated(&self, id: Uuid) -> bool {
        self.current(id).await.is_some()
    }

    /// Receive sign-in state changes for a session
    pub async fn subscribe(&self, id: Uuid) -> Option<watch::Receiver<Option<Session>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|sender| sender.subscribe())
    }

    /// End a session locally and revoke its token with the provider.
    ///
    /// The local session is cleared even when the provider call fails.
    pub async fn sign_out(&self, id: Uuid) {
        let Some(session) = self.close(id).await else {
            return;
        };

        if let Err(e) = self.provider.sign_out(&session.access_token).await {
            tracing::warn!(
                "Provider sign-out failed for user {}: {}",
                session.user.user_id,
                e
            );
        }
        tracing::info!("Session closed for user {}", session.user.user_id);
    }

    /// Resolve a bearer token issued by the provider
    pub async fn resolve_bearer(&self, access_token: &str) -> Result<AuthenticatedUser> {
        self.provider.get_user(access_token).await
    }

    /// Revoke a bearer token held by an API client
    pub async fn revoke_bearer(&self, access_token: &str) -> Result<()> {
        self.provider.sign_out(access_token).await
    }

    /// Close every expired session. Returns how many were dropped.
    pub async fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut expired = Vec::new();
        self.sessions.write().await.retain(|id, sender| {
            let live = sender
                .borrow()
                .as_ref()
                .is_some_and(|session| !session.is_expired(now));
            if !live {
                sender.send_replace(None);
                expired.push(*id);
            }
            live
        });

        for id in &expired {
            self.notify_closed(*id).await;
        }
        if !expired.is_empty() {
            tracing::info!("Pruned {} expired sessions", expired.len());
        }
        expired.len()
    }

    /// Publish `None` to subscribers, drop the session and release observer state
    async fn close(&self, id: Uuid) -> Option<Session> {
        let sender = self.sessions.write().await.remove(&id)?;
        let session = sender.send_replace(None);
        self.notify_closed(id).await;
        session
    }

    async fn notify_closed(&self, id: Uuid) {
        for observer in &self.observers {
            observer.session_closed(id).await;
        }
    }

    // =========================================================================
    // Cookies
    // =========================================================================

    /// Session id carried by the request's cookie, if any
    pub fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.config.cookie_name)
            .and_then(|(_, value)| Uuid::parse_str(value).ok())
    }

    pub fn session_cookie(&self, id: Uuid) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
            self.config.cookie_name,
            id,
            self.secure_attribute()
        )
    }

    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.config.cookie_name,
            self.secure_attribute()
        )
    }

    fn secure_attribute(&self) -> &'static str {
        if self.config.cookie_secure {
            "; Secure"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        session_gate, FakeAuthProvider, AGENT_EMAIL, AGENT_NAME, AGENT_PASSWORD,
    };
    use axum::http::HeaderValue;
    use chrono::Duration;
    use tokio::sync::Mutex;
    use tokio_test::assert_ok;

    #[derive(Default)]
    struct ClosedSessions(Mutex<Vec<Uuid>>);

    #[async_trait]
    impl SessionObserver for ClosedSessions {
        async fn session_closed(&self, id: Uuid) {
            self.0.lock().await.push(id);
        }
    }

    fn observed_gate(provider: Arc<FakeAuthProvider>) -> (SessionGate, Arc<ClosedSessions>) {
        let closed = Arc::new(ClosedSessions::default());
        let gate = SessionGate::new(provider, SessionConfig::default())
            .with_observer(Arc::clone(&closed) as Arc<dyn SessionObserver>);
        (gate, closed)
    }

    #[tokio::test]
    async fn test_sign_in_opens_a_session() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);

        let (id, session) = assert_ok!(gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await);

        assert_eq!(session.user.display_name, AGENT_NAME);
        assert!(gate.is_authenticated(id).await);
        assert_eq!(gate.current(id).await, Some(session));
    }

    #[tokio::test]
    async fn test_wrong_credentials_are_rejected() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);

        assert!(matches!(
            gate.sign_in(AGENT_EMAIL, "wrong").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            gate.sign_in("  ", "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_authenticated() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);

        assert!(!gate.is_authenticated(Uuid::new_v4()).await);
        assert!(gate.subscribe(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_notifies_subscribers_and_revokes_token() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);
        let (id, session) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();
        let mut receiver = gate.subscribe(id).await.unwrap();

        gate.sign_out(id).await;

        assert_ok!(receiver.changed().await);
        assert!(receiver.borrow().is_none());
        assert!(!gate.is_authenticated(id).await);
        assert_eq!(provider.signed_out_tokens(), vec![session.access_token]);
    }

    #[tokio::test]
    async fn test_sign_out_clears_locally_when_provider_fails() {
        let provider = Arc::new(FakeAuthProvider::default());
        provider.fail_sign_out(true);
        let gate = session_gate(&provider);
        let (id, _) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();

        gate.sign_out(id).await;

        assert!(!gate.is_authenticated(id).await);
    }

    #[tokio::test]
    async fn test_expired_session_is_closed_on_access() {
        let provider = Arc::new(FakeAuthProvider::with_ttl(Duration::seconds(-1)));
        let gate = session_gate(&provider);
        let (id, _) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();
        let mut receiver = gate.subscribe(id).await.unwrap();

        assert!(gate.current(id).await.is_none());
        assert_ok!(receiver.changed().await);
        assert!(receiver.borrow().is_none());
        assert!(gate.subscribe(id).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_do_not_accumulate() {
        let provider = Arc::new(FakeAuthProvider::with_ttl(Duration::seconds(-1)));
        let (gate, closed) = observed_gate(provider);

        let mut ids = Vec::new();
        for _ in 0..50 {
            let (id, _) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();
            ids.push(id);
        }
        // Each sign-in drops the sessions that expired before it
        assert_eq!(gate.sessions.read().await.len(), 1);

        assert_eq!(gate.prune_expired().await, 1);
        assert_eq!(gate.sessions.read().await.len(), 0);

        let mut released = closed.0.lock().await.clone();
        released.sort();
        ids.sort();
        assert_eq!(released, ids);
    }

    #[tokio::test]
    async fn test_prune_keeps_live_sessions() {
        let provider = Arc::new(FakeAuthProvider::default());
        let (gate, closed) = observed_gate(provider);
        let (id, _) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();

        assert_eq!(gate.prune_expired().await, 0);
        assert!(gate.is_authenticated(id).await);
        assert!(closed.0.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_observers_hear_every_close() {
        let provider = Arc::new(FakeAuthProvider::default());
        let (gate, closed) = observed_gate(Arc::clone(&provider));
        let (signed_out, _) = gate.sign_in(AGENT_EMAIL, AGENT_PASSWORD).await.unwrap();
        gate.sign_out(signed_out).await;

        let expiring = Arc::new(FakeAuthProvider::with_ttl(Duration::seconds(-1)));
        let (expiring_gate, expired_closed) = observed_gate(expiring);
        let (expired, _) = expiring_gate
            .sign_in(AGENT_EMAIL, AGENT_PASSWORD)
            .await
            .unwrap();
        assert!(expiring_gate.current(expired).await.is_none());

        assert_eq!(*closed.0.lock().await, vec![signed_out]);
        assert_eq!(*expired_closed.0.lock().await, vec![expired]);
    }

    #[tokio::test]
    async fn test_bearer_tokens_resolve_through_provider() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);
        let token = provider.issue_token();

        let user = gate.resolve_bearer(&token).await.unwrap();
        assert_eq!(user.email, AGENT_EMAIL);
        assert!(gate.resolve_bearer("token-unknown").await.is_err());
    }

    #[test]
    fn test_session_id_is_read_from_cookie_header() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);
        let id = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; geotran_session={}", id)).unwrap(),
        );
        assert_eq!(gate.session_id(&headers), Some(id));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("geotran_session=not-a-uuid"),
        );
        assert_eq!(gate.session_id(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let provider = Arc::new(FakeAuthProvider::default());
        let gate = session_gate(&provider);
        let id = Uuid::new_v4();

        let cookie = gate.session_cookie(id);
        assert!(cookie.starts_with(&format!("geotran_session={};", id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        assert!(gate.clear_cookie().contains("Max-Age=0"));
    }
}
