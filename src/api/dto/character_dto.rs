//! 角色 DTO
//!
//! 定义角色相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::profile_dto::PillarResponse;
use crate::bazi::{BirthMoment, Gender};
use crate::models::character::{Character, CreationMode, VisibilityStatus};

/// 创建角色时未提供出生时刻的缺省值（正午）
const DEFAULT_BIRTH_HOUR: u32 = 12;
const DEFAULT_BIRTH_MINUTE: u32 = 0;

/// 创建角色请求
#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    /// 角色名称（1-100 位）
    pub character_name: String,
    /// 创建模式
    pub creation_mode: CreationMode,
    /// 角色描述（最长 2000 位）
    #[serde(default)]
    pub description: Option<String>,

    /// === 出生信息 ===
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    /// 出生小时，缺省取正午
    #[serde(default)]
    pub birth_hour: Option<u32>,
    /// 出生分钟
    #[serde(default)]
    pub birth_minute: Option<u32>,
    #[serde(default)]
    pub gender: Gender,

    /// 开场白（最长 500 位，缺省自动生成）
    #[serde(default)]
    pub greeting_message: Option<String>,
    /// 性格特征标签
    #[serde(default)]
    pub personality_traits: Vec<String>,
    /// 分类标签
    #[serde(default)]
    pub tags: Vec<String>,

    /// 可见性状态
    #[serde(default)]
    pub visibility_status: VisibilityStatus,
}

impl CreateCharacterRequest {
    /// 提取出生时间（小时/分钟缺省补齐）
    pub fn birth_moment(&self) -> BirthMoment {
        BirthMoment::new(
            self.birth_year,
            self.birth_month,
            self.birth_day,
            self.birth_hour.unwrap_or(DEFAULT_BIRTH_HOUR),
            self.birth_minute.unwrap_or(DEFAULT_BIRTH_MINUTE),
            self.gender,
        )
    }
}

/// 更新角色请求
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateCharacterRequest {
    pub character_name: Option<String>,
    pub description: Option<String>,
    pub greeting_message: Option<String>,
    pub personality_traits: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub visibility_status: Option<VisibilityStatus>,
    pub avatar_url: Option<String>,
}

/// 角色内嵌的命盘响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterChartResponse {
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    pub gender: Gender,

    pub year_pillar: PillarResponse,
    pub month_pillar: PillarResponse,
    pub day_pillar: PillarResponse,
    pub hour_pillar: PillarResponse,

    pub day_master: String,
    pub bazi_string: String,
    pub primary_element: String,
    pub personality_summary: String,
}

/// 角色响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterResponse {
    /// 角色 ID
    pub id: String,
    /// 创建者 ID
    pub creator_id: String,
    /// 角色名称
    pub character_name: String,
    /// 创建模式
    pub creation_mode: CreationMode,
    /// 角色描述
    pub description: Option<String>,

    /// 命盘
    pub bazi_profile: CharacterChartResponse,

    /// 开场白
    pub greeting_message: Option<String>,
    /// 性格特征标签
    pub personality_traits: Vec<String>,
    /// 分类标签
    pub tags: Vec<String>,

    /// 互动次数
    pub interaction_count: u64,
    /// 收藏次数
    pub favorite_count: u64,

    /// 可见性状态
    pub visibility_status: VisibilityStatus,
    /// 深度对话解锁
    pub deep_dialogue_unlocked: bool,

    /// 头像地址
    pub avatar_url: Option<String>,

    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl From<&Character> for CharacterResponse {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            creator_id: character.creator_id.clone(),
            character_name: character.character_name.clone(),
            creation_mode: character.creation_mode,
            description: character.description.clone(),
            bazi_profile: CharacterChartResponse {
                birth_year: character.birth_year,
                birth_month: character.birth_month,
                birth_day: character.birth_day,
                birth_hour: character.birth_hour,
                birth_minute: character.birth_minute,
                gender: character.gender,
                year_pillar: (&character.chart.year_pillar).into(),
                month_pillar: (&character.chart.month_pillar).into(),
                day_pillar: (&character.chart.day_pillar).into(),
                hour_pillar: (&character.chart.hour_pillar).into(),
                day_master: character.chart.day_master.clone(),
                bazi_string: character.chart.bazi_string.clone(),
                primary_element: character.chart.primary_element.as_str().to_string(),
                personality_summary: character.chart.personality_summary.clone(),
            },
            greeting_message: character.greeting_message.clone(),
            personality_traits: character.personality_traits.clone(),
            tags: character.tags.clone(),
            interaction_count: character.interaction_count,
            favorite_count: character.favorite_count,
            visibility_status: character.visibility_status,
            deep_dialogue_unlocked: character.deep_dialogue_unlocked,
            avatar_url: character.avatar_url.clone(),
            created_at: character.created_at,
            updated_at: character.updated_at,
        }
    }
}

impl CharacterResponse {
    /// 公开视图：对非创建者隐藏深度对话解锁状态
    pub fn masked_for_public(mut self) -> Self {
        self.deep_dialogue_unlocked = false;
        self
    }
}

/// 角色列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterListResponse {
    /// 角色列表
    pub characters: Vec<CharacterResponse>,
    /// 总数
    pub total: u64,
    /// 当前页
    pub page: usize,
    /// 每页数量
    pub page_size: usize,
}

/// 删除角色响应
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCharacterResponse {
    /// 角色 ID
    pub id: String,
    /// 消息
    pub message: String,
}
