//! Security Middleware Module
//!
//! Provides Axum middleware for authentication and security headers.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::result::Result as StdResult;

use crate::api::app_state::AppState;
use crate::error::AppError;
use crate::security::auth::{AuthUser, Credentials};

/// Extension trait for reading the authenticated user from request extensions
pub trait RequestAuthExt {
    fn auth_user(&self) -> Option<&AuthUser>;
    fn set_auth_user(&mut self, user: AuthUser);
}

impl RequestAuthExt for Request<Body> {
    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions().get::<AuthUser>()
    }

    fn set_auth_user(&mut self, user: AuthUser) {
        self.extensions_mut().insert(user);
    }
}

/// Authentication middleware
///
/// Extracts the bearer token, forwards it verbatim to the identity
/// provider, and injects the resolved `AuthUser` into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> StdResult<Response, AppError> {
    let credentials = extract_credentials(&req);
    let token = credentials.require_bearer()?;

    let user = state.auth_provider.get_user(token).await?;
    req.set_auth_user(user);

    Ok(next.run(req).await)
}

/// Extract credentials from request headers
fn extract_credentials(req: &Request<Body>) -> Credentials {
    let auth_header = req.headers().get(header::AUTHORIZATION);

    if let Some(auth) = auth_header {
        if let Ok(auth_str) = auth.to_str() {
            return Credentials::from_authorization_header(Some(auth_str));
        }
    }

    Credentials::new(None)
}

/// Security headers middleware
pub async fn security_headers_middleware(
    req: Request<Body>,
    next: Next,
) -> StdResult<Response, std::convert::Infallible> {
    let mut response = next.run(req).await;

    response
        .headers_mut()
        .insert("X-Content-Type-Options", "nosniff".parse().unwrap());

    response
        .headers_mut()
        .insert("X-Frame-Options", "DENY".parse().unwrap());

    response
        .headers_mut()
        .insert("X-XSS-Protection", "1; mode=block".parse().unwrap());

    response.headers_mut().insert(
        "Referrer-Policy",
        "strict-origin-when-cross-origin".parse().unwrap(),
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_extract_credentials_bearer() {
        let req = HttpRequest::builder()
            .header("Authorization", "Bearer tok-1")
            .body(Body::empty())
            .unwrap();

        let creds = extract_credentials(&req);
        assert_eq!(creds.bearer_token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_extract_credentials_missing_header() {
        let req = HttpRequest::builder().body(Body::empty()).unwrap();
        let creds = extract_credentials(&req);
        assert!(creds.bearer_token.is_none());
    }

    #[test]
    fn test_auth_user_extension_roundtrip() {
        let mut req = HttpRequest::builder().body(Body::empty()).unwrap();
        assert!(req.auth_user().is_none());

        req.set_auth_user(AuthUser {
            id: "user-1".to_string(),
            email: None,
            username: None,
        });

        assert_eq!(req.auth_user().unwrap().id, "user-1");
    }
}
