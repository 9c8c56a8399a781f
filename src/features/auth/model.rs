use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The agent behind a session or bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    /// Name recorded as the responsible agent on submitted reports
    pub display_name: String,
}

/// Tokens issued by the hosted auth provider for one sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthenticatedUser,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Browser session resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub session: Session,
}

/// Key used to order dashboard fetches per requester.
///
/// Browser sessions use the session id; bearer callers use their user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Viewer(pub String);

impl Viewer {
    pub fn for_session(id: Uuid) -> Self {
        Self(format!("session:{}", id))
    }

    pub fn for_user(user: &AuthenticatedUser) -> Self {
        Self(format!("user:{}", user.user_id))
    }
}
