use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::core::config::AuthProviderConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Session};

/// Credential check and token lifecycle against the hosted auth provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Resolve the user owning an access token
    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// User object returned by the provider
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl ProviderUser {
    fn into_user(self) -> AuthenticatedUser {
        let email = self.email.unwrap_or_default();
        let display_name = ["full_name", "name"]
            .iter()
            .find_map(|key| self.user_metadata.get(key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        AuthenticatedUser {
            user_id: self.id,
            email,
            display_name,
        }
    }
}

/// Token response of the password grant
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    user: ProviderUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            user: self.user.into_user(),
        }
    }
}

/// Provider error body; older and newer API versions use different field names
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl ProviderErrorResponse {
    fn parse(body: &str) -> String {
        let parsed: Self = serde_json::from_str(body).unwrap_or_default();
        parsed
            .msg
            .or(parsed.error_description)
            .unwrap_or_else(|| body.to_string())
    }
}

/// Client for a GoTrue-compatible hosted auth REST API
pub struct HostedAuthClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    pub fn new(config: &AuthProviderConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn unavailable(e: reqwest::Error) -> AppError {
        tracing::error!("Auth provider request failed: {}", e);
        AppError::ExternalServiceError("Authentication service unavailable".to_string())
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/token?grant_type=password", self.base_url);

        tracing::debug!("Signing in with password: {}", email);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Self::unavailable)?;

        let status = response.status();
        if status.is_success() {
            let token = response.json::<TokenResponse>().await.map_err(|e| {
                tracing::error!("Failed to parse token response: {}", e);
                AppError::ExternalServiceError("Invalid authentication response".to_string())
            })?;
            return Ok(token.into_session());
        }

        let body = response.text().await.unwrap_or_default();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            tracing::info!(
                "Sign-in rejected for {}: {}",
                email,
                ProviderErrorResponse::parse(&body)
            );
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        tracing::error!("Auth provider error: HTTP {} - {}", status, body);
        Err(AppError::ExternalServiceError(format!(
            "Auth provider error: HTTP {}",
            status
        )))
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser> {
        let url = format!("{}/user", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::unavailable)?;

        let status = response.status();
        if status.is_success() {
            let user = response.json::<ProviderUser>().await.map_err(|e| {
                tracing::error!("Failed to parse user response: {}", e);
                AppError::ExternalServiceError("Invalid authentication response".to_string())
            })?;
            return Ok(user.into_user());
        }

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Auth provider error: HTTP {} - {}", status, body);
        Err(AppError::ExternalServiceError(format!(
            "Auth provider error: HTTP {}",
            status
        )))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::unavailable)?;

        let status = response.status();
        // A token the provider no longer knows is already signed out
        if status.is_success()
            || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND)
        {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Auth provider sign-out failed: HTTP {} - {}", status, body);
        Err(AppError::ExternalServiceError(format!(
            "Auth provider error: HTTP {}",
            status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_becomes_session() {
        let token: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "def",
            "user": {
                "id": "6f1c",
                "email": "agente@geotran.test",
                "user_metadata": { "full_name": "Sgt. Almeida" }
            }
        }))
        .unwrap();

        let session = token.into_session();
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token.as_deref(), Some("def"));
        assert_eq!(session.user.display_name, "Sgt. Almeida");
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn test_display_name_falls_back_to_email_local_part() {
        let user: ProviderUser = serde_json::from_value(serde_json::json!({
            "id": "6f1c",
            "email": "cabo.lima@geotran.test",
            "user_metadata": { "full_name": "  " }
        }))
        .unwrap();

        assert_eq!(user.into_user().display_name, "cabo.lima");
    }

    #[test]
    fn test_provider_error_message_variants() {
        assert_eq!(
            ProviderErrorResponse::parse(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            ProviderErrorResponse::parse(r#"{"code":400,"msg":"Email not confirmed"}"#),
            "Email not confirmed"
        );
        assert_eq!(ProviderErrorResponse::parse("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn test_silent_provider_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = HostedAuthClient::new(&AuthProviderConfig {
            url: format!("http://{}", addr),
            api_key: "anon".to_string(),
            request_timeout: std::time::Duration::from_millis(200),
        })
        .unwrap();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.sign_in_with_password("agente@geotran.test", "senha"),
        )
        .await
        .expect("client timeout should fire first");

        assert!(matches!(outcome, Err(AppError::ExternalServiceError(_))));
    }
}
