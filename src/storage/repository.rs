//! 仓储层
//!
//! 定义各实体的仓储 trait 并提供基于 Supabase REST 的实现。
//! 写入顺序完全由外部存储仲裁，仓储自身不持有任何可变状态。

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::bazi_profile::BaziProfile;
use crate::models::character::Character;
use crate::models::conversation::{ChatMessage, Conversation};
use crate::models::user::UserRecord;
use crate::storage::supabase::{SupabaseClient, TableQuery};

const USER_TABLE: &str = "users";
const PROFILE_TABLE: &str = "bazi_profiles";
const CHARACTER_TABLE: &str = "characters";
const CONVERSATION_TABLE: &str = "conversations";
const MESSAGE_TABLE: &str = "chat_messages";

/// 公开可见性取值（public 与 synced 均出现在角色广场）
const PUBLIC_VISIBILITIES: [&str; 2] = ["public", "synced"];

/// 用户镜像仓储 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 注册后写入用户镜像行
    async fn create(&self, user: &UserRecord) -> Result<UserRecord>;
}

/// 八字档案仓储 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// 创建档案
    async fn create(&self, profile: &BaziProfile) -> Result<BaziProfile>;

    /// 根据用户 ID 获取档案
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<BaziProfile>>;

    /// 删除用户档案
    async fn delete_by_user_id(&self, user_id: &str) -> Result<bool>;
}

/// 角色仓储 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// 创建角色
    async fn create(&self, character: &Character) -> Result<Character>;

    /// 根据 ID 获取角色
    async fn get_by_id(&self, id: &str) -> Result<Option<Character>>;

    /// 更新角色
    async fn update(&self, id: &str, character: &Character) -> Result<Option<Character>>;

    /// 删除角色
    async fn delete(&self, id: &str) -> Result<bool>;

    /// 按创建者列出角色
    async fn list_by_creator(
        &self,
        creator_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Character>>;

    /// 按创建者统计数量
    async fn count_by_creator(&self, creator_id: &str) -> Result<u64>;

    /// 列出公开角色
    async fn list_public(&self, limit: usize, offset: usize) -> Result<Vec<Character>>;

    /// 统计公开角色数量
    async fn count_public(&self) -> Result<u64>;
}

/// 会话仓储 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// 创建会话
    async fn create(&self, conversation: &Conversation) -> Result<Conversation>;

    /// 根据 (角色, 用户) 获取会话
    async fn get_by_character_and_user(
        &self,
        character_id: &str,
        user_id: &str,
    ) -> Result<Option<Conversation>>;

    /// 更新会话最后活跃时间
    async fn touch(&self, id: &str) -> Result<()>;

    /// 按用户列出会话（最近活跃优先）
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>>;
}

/// 消息仓储 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 追加一条消息
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage>;

    /// 按会话列出全部消息（时间正序）
    async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<ChatMessage>>;

    /// 获取会话尾部最近的 limit 条消息（时间正序返回）
    async fn list_recent(&self, conversation_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;
}

/// 解析单行结果
fn parse_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>> {
    match rows.into_iter().next() {
        Some(row) => {
            let entity = serde_json::from_value(row)
                .map_err(|e| AppError::Database(format!("Failed to deserialize row: {}", e)))?;
            Ok(Some(entity))
        }
        None => Ok(None),
    }
}

/// 解析多行结果，跳过无法反序列化的行
fn parse_all<T: DeserializeOwned>(rows: Vec<Value>) -> Vec<T> {
    let mut entities = Vec::new();
    for row in rows {
        match serde_json::from_value(row) {
            Ok(entity) => entities.push(entity),
            Err(e) => tracing::warn!("Failed to deserialize row: {}", e),
        }
    }
    entities
}

/// 用户镜像仓储实现
#[derive(Clone)]
pub struct SupabaseUserRepository {
    client: SupabaseClient,
}

impl SupabaseUserRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for SupabaseUserRepository {
    async fn create(&self, user: &UserRecord) -> Result<UserRecord> {
        let row = serde_json::to_value(user)?;
        let rows = self.client.insert(USER_TABLE, &row).await?;

        parse_first(rows)?
            .ok_or_else(|| AppError::Database(format!("Failed to create user: {}", user.id)))
    }
}

/// 八字档案仓储实现
#[derive(Clone)]
pub struct SupabaseProfileRepository {
    client: SupabaseClient,
}

impl SupabaseProfileRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn create(&self, profile: &BaziProfile) -> Result<BaziProfile> {
        let row = serde_json::to_value(profile)?;
        let rows = self.client.insert(PROFILE_TABLE, &row).await?;

        parse_first(rows)?.ok_or_else(|| {
            AppError::Database(format!("Failed to create profile: {}", profile.id))
        })
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<BaziProfile>> {
        let query = TableQuery::new().eq("user_id", user_id).limit(1);
        let rows = self.client.select(PROFILE_TABLE, &query).await?;
        parse_first(rows)
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<bool> {
        let query = TableQuery::new().eq("user_id", user_id);
        let deleted = self.client.delete(PROFILE_TABLE, &query).await?;
        Ok(!deleted.is_empty())
    }
}

/// 角色仓储实现
#[derive(Clone)]
pub struct SupabaseCharacterRepository {
    client: SupabaseClient,
}

impl SupabaseCharacterRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CharacterRepository for SupabaseCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character> {
        let row = serde_json::to_value(character)?;
        let rows = self.client.insert(CHARACTER_TABLE, &row).await?;

        parse_first(rows)?.ok_or_else(|| {
            AppError::Database(format!("Failed to create character: {}", character.id))
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Character>> {
        let query = TableQuery::new().eq("id", id).limit(1);
        let rows = self.client.select(CHARACTER_TABLE, &query).await?;
        parse_first(rows)
    }

    async fn update(&self, id: &str, character: &Character) -> Result<Option<Character>> {
        let patch = serde_json::to_value(character)?;
        let query = TableQuery::new().eq("id", id);
        let rows = self.client.update(CHARACTER_TABLE, &query, &patch).await?;
        parse_first(rows)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let query = TableQuery::new().eq("id", id);
        let deleted = self.client.delete(CHARACTER_TABLE, &query).await?;
        Ok(!deleted.is_empty())
    }

    async fn list_by_creator(
        &self,
        creator_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Character>> {
        let query = TableQuery::new()
            .eq("creator_id", creator_id)
            .order("created_at.desc")
            .limit(limit)
            .offset(offset);
        let rows = self.client.select(CHARACTER_TABLE, &query).await?;
        Ok(parse_all(rows))
    }

    async fn count_by_creator(&self, creator_id: &str) -> Result<u64> {
        let query = TableQuery::new().eq("creator_id", creator_id);
        self.client.count(CHARACTER_TABLE, &query).await
    }

    async fn list_public(&self, limit: usize, offset: usize) -> Result<Vec<Character>> {
        let query = TableQuery::new()
            .any_of("visibility_status", &PUBLIC_VISIBILITIES)
            .order("created_at.desc")
            .limit(limit)
            .offset(offset);
        let rows = self.client.select(CHARACTER_TABLE, &query).await?;
        Ok(parse_all(rows))
    }

    async fn count_public(&self) -> Result<u64> {
        let query = TableQuery::new().any_of("visibility_status", &PUBLIC_VISIBILITIES);
        self.client.count(CHARACTER_TABLE, &query).await
    }
}

/// 会话仓储实现
#[derive(Clone)]
pub struct SupabaseConversationRepository {
    client: SupabaseClient,
}

impl SupabaseConversationRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConversationRepository for SupabaseConversationRepository {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation> {
        let row = serde_json::to_value(conversation)?;
        let rows = self.client.insert(CONVERSATION_TABLE, &row).await?;

        parse_first(rows)?.ok_or_else(|| {
            AppError::Database(format!("Failed to create conversation: {}", conversation.id))
        })
    }

    async fn get_by_character_and_user(
        &self,
        character_id: &str,
        user_id: &str,
    ) -> Result<Option<Conversation>> {
        let query = TableQuery::new()
            .eq("character_id", character_id)
            .eq("user_id", user_id)
            .limit(1);
        let rows = self.client.select(CONVERSATION_TABLE, &query).await?;
        parse_first(rows)
    }

    async fn touch(&self, id: &str) -> Result<()> {
        let patch = serde_json::json!({
            "updated_at": chrono::Utc::now(),
        });
        let query = TableQuery::new().eq("id", id);
        self.client.update(CONVERSATION_TABLE, &query, &patch).await?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let query = TableQuery::new()
            .eq("user_id", user_id)
            .order("updated_at.desc");
        let rows = self.client.select(CONVERSATION_TABLE, &query).await?;
        Ok(parse_all(rows))
    }
}

/// 消息仓储实现
#[derive(Clone)]
pub struct SupabaseMessageRepository {
    client: SupabaseClient,
}

impl SupabaseMessageRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageRepository for SupabaseMessageRepository {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage> {
        let row = serde_json::to_value(message)?;
        let rows = self.client.insert(MESSAGE_TABLE, &row).await?;

        parse_first(rows)?.ok_or_else(|| {
            AppError::Database(format!("Failed to create message: {}", message.id))
        })
    }

    async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let query = TableQuery::new()
            .eq("conversation_id", conversation_id)
            .order("created_at.asc");
        let rows = self.client.select(MESSAGE_TABLE, &query).await?;
        Ok(parse_all(rows))
    }

    async fn list_recent(&self, conversation_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let query = TableQuery::new()
            .eq("conversation_id", conversation_id)
            .order("created_at.desc")
            .limit(limit);
        let rows = self.client.select(MESSAGE_TABLE, &query).await?;

        let mut messages: Vec<ChatMessage> = parse_all(rows);
        messages.reverse();
        Ok(messages)
    }
}
