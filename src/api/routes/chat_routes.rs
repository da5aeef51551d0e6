//! Chat Routes
//!
//! 定义对话相关的 API 路由，全部要求已认证身份。

use crate::api::handlers::chat_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建对话路由器
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/chat/send", post(send_message))
        .route("/chat/conversation/:character_id", get(get_conversation))
        .route("/chat/my-conversations", get(my_conversations))
}
