use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::{AuthenticatedUser, Session};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Tokens for API clients; browsers use the session cookie set alongside
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthenticatedUser,
}

impl From<Session> for LoginResponseDto {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "bearer".to_string(),
            expires_at: session.expires_at,
            user: session.user,
        }
    }
}

/// Current sign-in state as seen by the session gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusDto {
    pub authenticated: bool,
    pub user: Option<AuthenticatedUser>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Option<Session>> for SessionStatusDto {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => Self {
                authenticated: true,
                user: Some(session.user),
                expires_at: Some(session.expires_at),
            },
            None => Self {
                authenticated: false,
                user: None,
                expires_at: None,
            },
        }
    }
}
