//! 对话 DTO
//!
//! 定义消息发送与会话查询相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::conversation::{ChatMessage, Conversation};

/// 发送消息请求
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// 目标角色 ID
    pub character_id: String,
    /// 消息内容（1-2000 位）
    pub message: String,
}

/// 消息响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    /// 消息 ID
    pub id: String,
    /// 会话 ID
    pub conversation_id: String,
    /// 角色 ID
    pub character_id: String,
    /// 用户 ID
    pub user_id: String,
    /// 用户消息
    pub message: String,
    /// 角色回复
    pub response: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl From<&ChatMessage> for ChatMessageResponse {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            character_id: message.character_id.clone(),
            user_id: message.user_id.clone(),
            message: message.message.clone(),
            response: message.response.clone(),
            created_at: message.created_at,
        }
    }
}

/// 会话响应（含全部消息）
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    /// 会话 ID（无会话时为空字符串）
    pub id: String,
    /// 角色 ID
    pub character_id: String,
    /// 用户 ID
    pub user_id: String,
    /// 消息列表（时间正序）
    pub messages: Vec<ChatMessageResponse>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后活跃时间
    pub updated_at: DateTime<Utc>,
}

impl ConversationResponse {
    /// 由会话与消息构建响应
    pub fn new(conversation: &Conversation, messages: &[ChatMessage]) -> Self {
        Self {
            id: conversation.id.clone(),
            character_id: conversation.character_id.clone(),
            user_id: conversation.user_id.clone(),
            messages: messages.iter().map(Into::into).collect(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }

    /// 尚无会话时的空响应
    pub fn empty(character_id: &str, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            character_id: character_id.to_string(),
            user_id: user_id.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 会话摘要
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummaryResponse {
    /// 会话 ID
    pub id: String,
    /// 角色 ID
    pub character_id: String,
    /// 用户 ID
    pub user_id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后活跃时间
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationSummaryResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.clone(),
            character_id: conversation.character_id.clone(),
            user_id: conversation.user_id.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

/// 会话列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    /// 会话列表（最近活跃优先）
    pub conversations: Vec<ConversationSummaryResponse>,
}
