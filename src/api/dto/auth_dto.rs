//! 认证 DTO
//!
//! 定义注册、登录、登出相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::security::auth::{AuthSession, AuthUser};

/// 注册请求
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// 邮箱
    pub email: String,
    /// 密码（至少 8 位）
    pub password: String,
    /// 用户名（3-50 位）
    pub username: String,
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// 邮箱
    pub email: String,
    /// 密码
    pub password: String,
}

/// 令牌响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// 访问令牌
    pub access_token: String,
    /// 令牌类型
    pub token_type: String,
    /// 用户 ID
    pub user_id: String,
}

impl From<AuthSession> for TokenResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            token_type: session.token_type,
            user_id: session.user.id,
        }
    }
}

/// 当前用户响应
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// 用户 ID
    pub id: String,
    /// 邮箱
    pub email: Option<String>,
    /// 用户名
    pub username: Option<String>,
}

impl From<AuthUser> for UserResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
        }
    }
}

/// 登出响应
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// 消息
    pub message: String,
}
