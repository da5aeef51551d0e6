//! Character Routes
//!
//! 定义角色相关的 API 路由。角色广场与角色详情公开可读，
//! 创建/列表/修改/删除要求已认证身份。

use crate::api::handlers::character_handler::*;
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::app_state::AppState;

/// 创建无需认证的路由器
pub fn create_public_character_router() -> Router<AppState> {
    Router::new()
        .route("/character/public", get(public_characters))
        .route("/character/:id", get(get_character))
}

/// 创建受保护的路由器
pub fn create_protected_character_router() -> Router<AppState> {
    Router::new()
        .route("/character/create", post(create_character))
        .route("/character/my-characters", get(my_characters))
        .route("/character/:id", patch(update_character))
        .route("/character/:id", delete(delete_character))
}
