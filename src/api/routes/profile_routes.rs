//! Profile Routes
//!
//! 定义八字档案相关的 API 路由，全部要求已认证身份。

use crate::api::handlers::profile_handler::*;
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::app_state::AppState;

/// 创建档案路由器
pub fn create_profile_router() -> Router<AppState> {
    Router::new()
        .route("/profile/bazi", post(create_profile))
        .route("/profile/bazi/me", get(get_my_profile))
        .route("/profile/bazi/me", delete(delete_my_profile))
}
