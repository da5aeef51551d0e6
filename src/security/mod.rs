//! Security Module
//!
//! Provides security features for the XwanAI API:
//! - Bearer credential extraction
//! - Identity delegation to the external auth provider
//! - Request validation
//! - Security middleware

pub mod auth;
pub mod middleware;
pub mod validation;

pub use auth::{AuthProvider, AuthSession, AuthUser, Credentials, SupabaseAuthProvider};
pub use validation::{RequestValidator, ValidationError};
