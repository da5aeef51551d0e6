//! Authentication Module
//!
//! Bearer token extraction plus an `AuthProvider` trait that delegates
//! sign-up/sign-in/sign-out and token validation to the external identity
//! provider. Tokens are forwarded verbatim; no local decoding is performed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::storage::supabase::SupabaseClient;

/// Credentials for authentication
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token (if provided)
    pub bearer_token: Option<String>,
}

impl Credentials {
    /// Create new credentials
    pub fn new(bearer_token: Option<String>) -> Self {
        Self { bearer_token }
    }

    /// Try to extract credentials from Authorization header
    pub fn from_authorization_header(auth_header: Option<&str>) -> Self {
        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                Self::new(Some(header[7..].to_string()))
            }
            _ => Self::new(None),
        }
    }

    /// Require a bearer token or fail with an authentication error
    pub fn require_bearer(&self) -> Result<&str> {
        self.bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("Invalid authorization header".to_string()))
    }
}

/// Authenticated user identity as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-issued user ID
    pub id: String,
    /// Email address
    pub email: Option<String>,
    /// Username from user metadata
    pub username: Option<String>,
}

/// Session issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Access token for subsequent requests
    pub access_token: String,
    /// Token type, always "bearer"
    pub token_type: String,
    /// The authenticated user
    pub user: AuthUser,
}

/// Identity provider delegation trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new user account
    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<AuthSession>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Revoke the given token
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Validate a token and return the authenticated user
    async fn get_user(&self, token: &str) -> Result<AuthUser>;
}

/// Supabase (GoTrue) backed auth provider
#[derive(Clone)]
pub struct SupabaseAuthProvider {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuthProvider {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn parse_user(value: &Value) -> Result<AuthUser> {
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))?;

        let email = value
            .get("email")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let username = value
            .get("user_metadata")
            .and_then(|m| m.get("username"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(AuthUser {
            id: id.to_string(),
            email,
            username,
        })
    }

    fn parse_session(value: &Value) -> Result<AuthSession> {
        let access_token = value
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::Authentication("Identity provider returned no session".to_string())
            })?;

        let user = value
            .get("user")
            .map(Self::parse_user)
            .transpose()?
            .ok_or_else(|| {
                AppError::Authentication("Identity provider returned no user".to_string())
            })?;

        Ok(AuthSession {
            access_token: access_token.to_string(),
            token_type: "bearer".to_string(),
            user,
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<AuthSession> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "username": username },
        });

        let response = self.client.auth_post("signup", None, Some(&body)).await?;
        Self::parse_session(&response)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .auth_post("token?grant_type=password", None, Some(&body))
            .await
            .map_err(|e| match e {
                // 不区分「账号不存在」与「密码错误」
                AppError::Authentication(_) => {
                    AppError::Authentication("Invalid email or password".to_string())
                }
                other => other,
            })?;
        Self::parse_session(&response)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        self.client.auth_post("logout", Some(token), None).await?;
        Ok(())
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .auth_get("user", token)
            .await
            .map_err(|e| match e {
                AppError::Authentication(_) => {
                    AppError::Authentication("Invalid token".to_string())
                }
                other => other,
            })?;
        Self::parse_user(&response)
    }
}
