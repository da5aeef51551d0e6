//! 会话与消息数据模型
//!
//! 会话以 (角色, 用户) 为键，首条消息发送时惰性创建；
//! 消息为追加写入，创建后不可变。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 会话实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// 会话唯一标识
    pub id: String,

    /// 角色标识
    pub character_id: String,

    /// 用户标识
    pub user_id: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后活跃时间
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// 创建新会话
    pub fn new(character_id: &str, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            character_id: character_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 更新最后活跃时间
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 消息实体：一次用户提问与角色回复
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 消息唯一标识
    pub id: String,

    /// 所属会话标识
    pub conversation_id: String,

    /// 角色标识
    pub character_id: String,

    /// 用户标识
    pub user_id: String,

    /// 用户消息内容
    pub message: String,

    /// 角色回复内容
    pub response: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// 创建新消息
    pub fn new(
        conversation_id: &str,
        character_id: &str,
        user_id: &str,
        message: &str,
        response: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            character_id: character_id.to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_creation() {
        let conversation = Conversation::new("char_1", "user_1");
        assert_eq!(conversation.character_id, "char_1");
        assert_eq!(conversation.user_id, "user_1");
        assert!(!conversation.id.is_empty());
    }

    #[test]
    fn test_message_creation() {
        let message = ChatMessage::new("conv_1", "char_1", "user_1", "你好", "你好呀！");
        assert_eq!(message.conversation_id, "conv_1");
        assert_eq!(message.message, "你好");
        assert_eq!(message.response, "你好呀！");
    }
}
