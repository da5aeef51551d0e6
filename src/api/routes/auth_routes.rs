//! Auth Routes
//!
//! 定义认证相关的 API 路由。注册/登录/登出本身不要求已认证身份，
//! `/auth/me` 挂在受保护路由组。

use crate::api::handlers::auth_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建无需认证的路由器
pub fn create_public_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// 创建受保护的路由器
pub fn create_protected_auth_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}
