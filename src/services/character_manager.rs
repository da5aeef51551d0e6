//! 角色服务
//!
//! 提供角色的创建、查询、更新与删除，以及创建者/公开两种列表视图。
//! 创建时排盘一次；未提供开场白时调用生成服务补一条。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bazi::BirthMoment;
use crate::error::{AppError, Result};
use crate::llm::{GenerationService, LlmMessage};
use crate::models::character::{Character, CreationMode, VisibilityStatus};
use crate::storage::repository::CharacterRepository;

/// 开场白生成参数（与对话补全不同的调用点）
const GREETING_MAX_TOKENS: u32 = 150;
const GREETING_TEMPERATURE: f64 = 0.8;

/// 分页参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// 页码（从 1 开始）
    pub page: usize,
    /// 每页数量
    pub page_size: usize,
}

impl Pagination {
    /// 创建新分页参数
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// 计算偏移量
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// 检查分页参数是否有效
    pub fn is_valid(&self) -> bool {
        self.page > 0 && self.page_size > 0 && self.page_size <= 100
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// 创建角色的输入
#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub character_name: String,
    pub creation_mode: CreationMode,
    pub description: Option<String>,
    pub moment: BirthMoment,
    pub greeting_message: Option<String>,
    pub personality_traits: Vec<String>,
    pub tags: Vec<String>,
    pub visibility_status: VisibilityStatus,
}

/// 角色更新字段（全部可选）
#[derive(Debug, Clone, Default)]
pub struct CharacterUpdates {
    pub character_name: Option<String>,
    pub description: Option<String>,
    pub greeting_message: Option<String>,
    pub personality_traits: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub visibility_status: Option<VisibilityStatus>,
    pub avatar_url: Option<String>,
}

/// 角色服务 trait
#[async_trait]
pub trait CharacterService: Send + Sync {
    /// 创建角色
    async fn create(&self, creator_id: &str, request: NewCharacter) -> Result<Character>;

    /// 根据 ID 获取角色
    async fn get_by_id(&self, id: &str) -> Result<Option<Character>>;

    /// 列出创建者的角色与总数
    async fn list_by_creator(
        &self,
        creator_id: &str,
        pagination: Pagination,
    ) -> Result<(Vec<Character>, u64)>;

    /// 列出公开角色与总数
    async fn list_public(&self, pagination: Pagination) -> Result<(Vec<Character>, u64)>;

    /// 更新角色（仅创建者）
    async fn update(
        &self,
        requester_id: &str,
        id: &str,
        updates: CharacterUpdates,
    ) -> Result<Character>;

    /// 删除角色（仅创建者）
    async fn delete(&self, requester_id: &str, id: &str) -> Result<()>;
}

/// 角色服务实现
pub struct CharacterServiceImpl {
    repository: Arc<dyn CharacterRepository>,
    generation: Arc<dyn GenerationService>,
}

impl CharacterServiceImpl {
    /// 创建新的服务实例
    pub fn new(
        repository: Arc<dyn CharacterRepository>,
        generation: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            repository,
            generation,
        }
    }

    /// 生成开场白；生成服务失败时使用固定兜底文案
    async fn generate_greeting(&self, character: &Character) -> String {
        let prompt = format!(
            "You are {}, a character with the following traits:\n\
             Personality: {}\n\
             BaZi (命理): {}\n\n\
             Generate a warm, character-appropriate greeting message (in Chinese, \
             max 100 characters) that reflects your personality.\n\
             Do not include any explanation, just the greeting itself.",
            character.character_name,
            character.chart.personality_summary,
            character.chart.bazi_string,
        );

        let messages = vec![
            LlmMessage::system("You are a helpful character creator assistant."),
            LlmMessage::user(prompt),
        ];

        match self
            .generation
            .complete(&messages, GREETING_MAX_TOKENS, GREETING_TEMPERATURE)
            .await
        {
            Ok(greeting) if !greeting.is_empty() => greeting,
            Ok(_) | Err(_) => {
                tracing::warn!(
                    "Greeting generation failed for character {}, using fallback",
                    character.character_name
                );
                format!("你好，我是{}，很高兴认识你！", character.character_name)
            }
        }
    }

    /// 获取角色并校验归属
    async fn get_owned(&self, requester_id: &str, id: &str) -> Result<Character> {
        let character = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character not found: {}", id)))?;

        if !character.is_owned_by(requester_id) {
            return Err(AppError::Authorization(
                "You don't have permission to modify this character".to_string(),
            ));
        }

        Ok(character)
    }
}

#[async_trait]
impl CharacterService for CharacterServiceImpl {
    async fn create(&self, creator_id: &str, request: NewCharacter) -> Result<Character> {
        request.moment.validate()?;

        let mut character = Character::new(
            creator_id,
            &request.character_name,
            request.creation_mode,
            &request.moment,
            request.visibility_status,
        );
        character.description = request.description;
        character.personality_traits = request.personality_traits;
        character.tags = request.tags;

        character.greeting_message = match request.greeting_message {
            Some(greeting) => Some(greeting),
            None => Some(self.generate_greeting(&character).await),
        };

        tracing::info!(
            "Creating character '{}' for user {}",
            character.character_name,
            creator_id
        );
        self.repository.create(&character).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Character>> {
        self.repository.get_by_id(id).await
    }

    async fn list_by_creator(
        &self,
        creator_id: &str,
        pagination: Pagination,
    ) -> Result<(Vec<Character>, u64)> {
        let characters = self
            .repository
            .list_by_creator(creator_id, pagination.page_size, pagination.offset())
            .await?;
        let total = self.repository.count_by_creator(creator_id).await?;
        Ok((characters, total))
    }

    async fn list_public(&self, pagination: Pagination) -> Result<(Vec<Character>, u64)> {
        let characters = self
            .repository
            .list_public(pagination.page_size, pagination.offset())
            .await?;
        let total = self.repository.count_public().await?;
        Ok((characters, total))
    }

    async fn update(
        &self,
        requester_id: &str,
        id: &str,
        updates: CharacterUpdates,
    ) -> Result<Character> {
        let mut character = self.get_owned(requester_id, id).await?;

        if let Some(name) = updates.character_name {
            character.character_name = name;
        }
        if let Some(description) = updates.description {
            character.description = Some(description);
        }
        if let Some(greeting) = updates.greeting_message {
            character.greeting_message = Some(greeting);
        }
        if let Some(traits) = updates.personality_traits {
            character.personality_traits = traits;
        }
        if let Some(tags) = updates.tags {
            character.tags = tags;
        }
        if let Some(visibility) = updates.visibility_status {
            character.visibility_status = visibility;
        }
        if let Some(avatar_url) = updates.avatar_url {
            character.avatar_url = Some(avatar_url);
        }

        character.touch();

        self.repository
            .update(id, &character)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character not found: {}", id)))
    }

    async fn delete(&self, requester_id: &str, id: &str) -> Result<()> {
        self.get_owned(requester_id, id).await?;
        self.repository.delete(id).await?;
        Ok(())
    }
}

/// 创建角色服务
pub fn create_character_service(
    repository: Arc<dyn CharacterRepository>,
    generation: Arc<dyn GenerationService>,
) -> Box<dyn CharacterService> {
    Box::new(CharacterServiceImpl::new(repository, generation))
}
