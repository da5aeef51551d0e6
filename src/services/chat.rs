//! 对话服务
//!
//! 组装角色人设与有界历史窗口为单次补全请求，持久化每轮交换。
//! 生成失败以固定兜底文案掩盖，不重试、不向上传播。

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::llm::{GenerationService, LlmMessage};
use crate::models::character::Character;
use crate::models::conversation::{ChatMessage, Conversation};
use crate::storage::repository::{
    CharacterRepository, ConversationRepository, MessageRepository,
};

/// 每次取回的历史消息上限
const HISTORY_FETCH_LIMIT: usize = 20;

/// 进入提示词的历史轮次上限
const PROMPT_HISTORY_TURNS: usize = 10;

/// 对话中途生成失败的兜底回复
const CHAT_FALLBACK_REPLY: &str = "抱歉，我现在有些困惑，能再说一遍吗？";

/// 对话补全参数
const CHAT_MAX_TOKENS: u32 = 500;
const CHAT_TEMPERATURE: f64 = 0.9;

/// 对话服务 trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// 发送一条消息并取得角色回复
    async fn send(&self, user_id: &str, character_id: &str, message: &str) -> Result<ChatMessage>;

    /// 获取与某角色的完整会话历史；无会话时返回 None
    async fn get_conversation(
        &self,
        user_id: &str,
        character_id: &str,
    ) -> Result<Option<(Conversation, Vec<ChatMessage>)>>;

    /// 列出用户的全部会话（最近活跃优先）
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>>;
}

/// 角色人设系统提示词
pub fn build_persona_prompt(character: &Character) -> String {
    format!(
        "你是{}。你的性格特征：{}\n\n\
         你的命理特征：\n\
         - 八字：{}\n\
         - 日主：{}\n\
         - 主要元素：{}\n\n\
         请以这个角色的身份回复用户。保持性格一致，回复自然流畅（中文），不要过于生硬或说教。",
        character.character_name,
        character.chart.personality_summary,
        character.chart.bazi_string,
        character.chart.day_master,
        character.chart.primary_element,
    )
}

/// 组装一次补全请求的消息列表
///
/// 历史按时间正序进入，最多取尾部 [`PROMPT_HISTORY_TURNS`] 轮。
pub fn build_chat_messages(
    character: &Character,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<LlmMessage> {
    let mut messages = vec![LlmMessage::system(build_persona_prompt(character))];

    let start = history.len().saturating_sub(PROMPT_HISTORY_TURNS);
    for exchange in &history[start..] {
        messages.push(LlmMessage::user(exchange.message.clone()));
        messages.push(LlmMessage::assistant(exchange.response.clone()));
    }

    messages.push(LlmMessage::user(user_message.to_string()));
    messages
}

/// 对话服务实现
pub struct ChatServiceImpl {
    character_repository: Arc<dyn CharacterRepository>,
    conversation_repository: Arc<dyn ConversationRepository>,
    message_repository: Arc<dyn MessageRepository>,
    generation: Arc<dyn GenerationService>,
}

impl ChatServiceImpl {
    /// 创建新的服务实例
    pub fn new(
        character_repository: Arc<dyn CharacterRepository>,
        conversation_repository: Arc<dyn ConversationRepository>,
        message_repository: Arc<dyn MessageRepository>,
        generation: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            character_repository,
            conversation_repository,
            message_repository,
            generation,
        }
    }

    /// 获取或惰性创建 (角色, 用户) 会话
    async fn get_or_create_conversation(
        &self,
        character_id: &str,
        user_id: &str,
    ) -> Result<Conversation> {
        if let Some(conversation) = self
            .conversation_repository
            .get_by_character_and_user(character_id, user_id)
            .await?
        {
            return Ok(conversation);
        }

        let conversation = Conversation::new(character_id, user_id);
        self.conversation_repository.create(&conversation).await
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn send(&self, user_id: &str, character_id: &str, message: &str) -> Result<ChatMessage> {
        let mut character = self
            .character_repository
            .get_by_id(character_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character not found: {}", character_id)))?;

        if !character.is_reachable_by(user_id) {
            return Err(AppError::Authorization(
                "This character is private".to_string(),
            ));
        }

        let conversation = self.get_or_create_conversation(character_id, user_id).await?;

        let history = self
            .message_repository
            .list_recent(&conversation.id, HISTORY_FETCH_LIMIT)
            .await?;

        let messages = build_chat_messages(&character, &history, message);

        let response = match self
            .generation
            .complete(&messages, CHAT_MAX_TOKENS, CHAT_TEMPERATURE)
            .await
        {
            Ok(reply) if !reply.is_empty() => reply,
            Ok(_) => CHAT_FALLBACK_REPLY.to_string(),
            Err(e) => {
                tracing::warn!("Generation failed for character {}: {}", character_id, e);
                CHAT_FALLBACK_REPLY.to_string()
            }
        };

        let exchange = ChatMessage::new(&conversation.id, character_id, user_id, message, &response);
        let exchange = self.message_repository.create(&exchange).await?;

        // 互动计数为读取后写回，并发下可能丢失更新，计数场景可接受
        character.record_interaction();
        self.character_repository
            .update(character_id, &character)
            .await?;

        self.conversation_repository.touch(&conversation.id).await?;

        Ok(exchange)
    }

    async fn get_conversation(
        &self,
        user_id: &str,
        character_id: &str,
    ) -> Result<Option<(Conversation, Vec<ChatMessage>)>> {
        let conversation = match self
            .conversation_repository
            .get_by_character_and_user(character_id, user_id)
            .await?
        {
            Some(conversation) => conversation,
            None => return Ok(None),
        };

        let messages = self
            .message_repository
            .list_by_conversation(&conversation.id)
            .await?;

        Ok(Some((conversation, messages)))
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        self.conversation_repository.list_by_user(user_id).await
    }
}

/// 创建对话服务
pub fn create_chat_service(
    character_repository: Arc<dyn CharacterRepository>,
    conversation_repository: Arc<dyn ConversationRepository>,
    message_repository: Arc<dyn MessageRepository>,
    generation: Arc<dyn GenerationService>,
) -> Box<dyn ChatService> {
    Box::new(ChatServiceImpl::new(
        character_repository,
        conversation_repository,
        message_repository,
        generation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bazi::{BirthMoment, Gender};
    use crate::llm::{MockGenerationService, Role};
    use crate::models::character::{CreationMode, VisibilityStatus};
    use crate::storage::repository::{
        MockCharacterRepository, MockConversationRepository, MockMessageRepository,
    };

    fn sample_character(creator_id: &str, visibility: VisibilityStatus) -> Character {
        let moment = BirthMoment::new(1995, 3, 20, 10, 0, Gender::Female);
        let mut character = Character::new(
            creator_id,
            "林若雪",
            CreationMode::Original,
            &moment,
            visibility,
        );
        // 私有角色默认解锁，这里显式关闭以测试可达性闸门
        character.deep_dialogue_unlocked = false;
        character
    }

    fn exchange(index: usize) -> ChatMessage {
        ChatMessage::new(
            "conv_1",
            "char_1",
            "user_1",
            &format!("问题{}", index),
            &format!("回答{}", index),
        )
    }

    #[test]
    fn test_persona_prompt_contains_chart_facts() {
        let character = sample_character("creator_1", VisibilityStatus::Public);
        let prompt = build_persona_prompt(&character);

        assert!(prompt.contains("林若雪"));
        assert!(prompt.contains(&character.chart.bazi_string));
        assert!(prompt.contains(&character.chart.day_master));
    }

    #[test]
    fn test_chat_messages_window_is_bounded() {
        let character = sample_character("creator_1", VisibilityStatus::Public);
        let history: Vec<ChatMessage> = (0..15).map(exchange).collect();

        let messages = build_chat_messages(&character, &history, "现在呢？");

        // 1 条 system + 10 轮历史 × 2 + 1 条新消息
        assert_eq!(messages.len(), 1 + PROMPT_HISTORY_TURNS * 2 + 1);
        assert_eq!(messages[0].role, Role::System);
        // 窗口取的是尾部：第一轮进入提示词的历史是「问题5」
        assert_eq!(messages[1].content, "问题5");
        assert_eq!(messages.last().unwrap().content, "现在呢？");
    }

    #[test]
    fn test_chat_messages_with_short_history() {
        let character = sample_character("creator_1", VisibilityStatus::Public);
        let history: Vec<ChatMessage> = (0..2).map(exchange).collect();

        let messages = build_chat_messages(&character, &history, "你好");
        assert_eq!(messages.len(), 1 + 2 * 2 + 1);
    }

    #[tokio::test]
    async fn test_send_rejects_private_character_for_stranger() {
        let mut characters = MockCharacterRepository::new();
        characters
            .expect_get_by_id()
            .returning(|_| Ok(Some(sample_character("creator_1", VisibilityStatus::Private))));

        let service = ChatServiceImpl::new(
            Arc::new(characters),
            Arc::new(MockConversationRepository::new()),
            Arc::new(MockMessageRepository::new()),
            Arc::new(MockGenerationService::new()),
        );

        let result = service.send("stranger", "char_1", "你好").await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_send_unknown_character_is_not_found() {
        let mut characters = MockCharacterRepository::new();
        characters.expect_get_by_id().returning(|_| Ok(None));

        let service = ChatServiceImpl::new(
            Arc::new(characters),
            Arc::new(MockConversationRepository::new()),
            Arc::new(MockMessageRepository::new()),
            Arc::new(MockGenerationService::new()),
        );

        let result = service.send("user_1", "missing", "你好").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_send_persists_exchange_and_bumps_counter() {
        let mut characters = MockCharacterRepository::new();
        characters
            .expect_get_by_id()
            .returning(|_| Ok(Some(sample_character("creator_1", VisibilityStatus::Public))));
        characters
            .expect_update()
            .withf(|_, character| character.interaction_count == 1)
            .returning(|_, c| Ok(Some(c.clone())));

        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_get_by_character_and_user()
            .returning(|_, _| Ok(None));
        conversations
            .expect_create()
            .returning(|c| Ok(c.clone()));
        conversations.expect_touch().returning(|_| Ok(()));

        let mut messages = MockMessageRepository::new();
        messages.expect_list_recent().returning(|_, _| Ok(vec![]));
        messages.expect_create().returning(|m| Ok(m.clone()));

        let mut generation = MockGenerationService::new();
        generation
            .expect_complete()
            .returning(|_, _, _| Ok("初次见面！".to_string()));

        let service = ChatServiceImpl::new(
            Arc::new(characters),
            Arc::new(conversations),
            Arc::new(messages),
            Arc::new(generation),
        );

        let exchange = service.send("user_1", "char_1", "你好").await.unwrap();
        assert_eq!(exchange.message, "你好");
        assert_eq!(exchange.response, "初次见面！");
    }

    #[tokio::test]
    async fn test_send_masks_generation_failure_with_fallback() {
        let mut characters = MockCharacterRepository::new();
        characters
            .expect_get_by_id()
            .returning(|_| Ok(Some(sample_character("creator_1", VisibilityStatus::Public))));
        characters
            .expect_update()
            .returning(|_, c| Ok(Some(c.clone())));

        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_get_by_character_and_user()
            .returning(|_, _| Ok(Some(Conversation::new("char_1", "user_1"))));
        conversations.expect_touch().returning(|_| Ok(()));

        let mut messages = MockMessageRepository::new();
        messages.expect_list_recent().returning(|_, _| Ok(vec![]));
        messages.expect_create().returning(|m| Ok(m.clone()));

        let mut generation = MockGenerationService::new();
        generation
            .expect_complete()
            .returning(|_, _, _| Err(AppError::Generation("timeout".to_string())));

        let service = ChatServiceImpl::new(
            Arc::new(characters),
            Arc::new(conversations),
            Arc::new(messages),
            Arc::new(generation),
        );

        let exchange = service.send("user_1", "char_1", "你好").await.unwrap();
        assert_eq!(exchange.response, CHAT_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_get_conversation_absent_returns_none() {
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_get_by_character_and_user()
            .returning(|_, _| Ok(None));

        let service = ChatServiceImpl::new(
            Arc::new(MockCharacterRepository::new()),
            Arc::new(conversations),
            Arc::new(MockMessageRepository::new()),
            Arc::new(MockGenerationService::new()),
        );

        let result = service.get_conversation("user_1", "char_1").await.unwrap();
        assert!(result.is_none());
    }
}
