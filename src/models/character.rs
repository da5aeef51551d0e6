//! 角色数据模型
//!
//! 角色由创建者给定的出生时间排盘生成，承载展示元数据、
//! 可见性状态与互动统计。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bazi::{BaziChart, BirthMoment, Gender, compute_chart};

/// 可见性状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityStatus {
    /// 仅创建者可见
    #[default]
    Private,
    /// 公开到角色广场
    Public,
    /// 公开且同步更新
    Synced,
}

impl VisibilityStatus {
    /// 是否出现在公开列表中
    pub fn is_public(&self) -> bool {
        matches!(self, VisibilityStatus::Public | VisibilityStatus::Synced)
    }
}

/// 创建模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMode {
    /// 真实人物
    RealPerson,
    /// 原创角色
    Original,
    /// 概念角色
    Concept,
    /// 虚拟 IP
    VirtualIp,
}

/// 角色实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// 角色唯一标识
    pub id: String,

    /// 创建者用户标识
    pub creator_id: String,

    /// 角色名称
    pub character_name: String,

    /// 创建模式
    pub creation_mode: CreationMode,

    /// 角色描述
    pub description: Option<String>,

    /// === 出生信息 ===
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    pub gender: Gender,

    /// === 排盘结果 ===
    pub chart: BaziChart,

    /// === 互动设定 ===
    /// 开场白
    pub greeting_message: Option<String>,

    /// 性格特征标签
    pub personality_traits: Vec<String>,

    /// 分类标签
    pub tags: Vec<String>,

    /// === 统计 ===
    pub interaction_count: u64,
    pub favorite_count: u64,

    /// === 可见性 ===
    pub visibility_status: VisibilityStatus,

    /// 深度对话解锁：允许非创建者与非私有角色对话
    pub deep_dialogue_unlocked: bool,

    /// 头像地址
    pub avatar_url: Option<String>,

    /// === 元数据 ===
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// 创建新角色（排盘一次）
    pub fn new(
        creator_id: &str,
        character_name: &str,
        creation_mode: CreationMode,
        moment: &BirthMoment,
        visibility_status: VisibilityStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            creator_id: creator_id.to_string(),
            character_name: character_name.to_string(),
            creation_mode,
            description: None,
            birth_year: moment.year,
            birth_month: moment.month,
            birth_day: moment.day,
            birth_hour: moment.hour,
            birth_minute: moment.minute,
            gender: moment.gender,
            chart: compute_chart(moment),
            greeting_message: None,
            personality_traits: Vec::new(),
            tags: Vec::new(),
            interaction_count: 0,
            favorite_count: 0,
            visibility_status,
            // 私有与同步模式在创建时即解锁深度对话
            deep_dialogue_unlocked: matches!(
                visibility_status,
                VisibilityStatus::Private | VisibilityStatus::Synced
            ),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否由指定用户创建
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// 指定用户是否可与该角色对话
    ///
    /// 创建者、解锁深度对话或非私有角色均可对话。
    pub fn is_reachable_by(&self, user_id: &str) -> bool {
        self.is_owned_by(user_id)
            || self.deep_dialogue_unlocked
            || self.visibility_status != VisibilityStatus::Private
    }

    /// 记录一次互动
    pub fn record_interaction(&mut self) {
        self.interaction_count += 1;
        self.touch();
    }

    /// 更新最后修改时间
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_character(visibility: VisibilityStatus) -> Character {
        let moment = BirthMoment::new(1995, 3, 20, 10, 0, Gender::Female);
        Character::new("creator_1", "林若雪", CreationMode::Original, &moment, visibility)
    }

    #[test]
    fn test_character_creation() {
        let character = sample_character(VisibilityStatus::Private);
        assert_eq!(character.creator_id, "creator_1");
        assert_eq!(character.character_name, "林若雪");
        assert_eq!(character.interaction_count, 0);
        assert_eq!(character.chart.bazi_string.split(' ').count(), 4);
    }

    #[test]
    fn test_deep_dialogue_unlock_rules() {
        assert!(sample_character(VisibilityStatus::Private).deep_dialogue_unlocked);
        assert!(sample_character(VisibilityStatus::Synced).deep_dialogue_unlocked);
        assert!(!sample_character(VisibilityStatus::Public).deep_dialogue_unlocked);
    }

    #[test]
    fn test_reachability_gate() {
        let mut character = sample_character(VisibilityStatus::Private);
        character.deep_dialogue_unlocked = false;

        // 私有且未解锁：仅创建者可达
        assert!(character.is_reachable_by("creator_1"));
        assert!(!character.is_reachable_by("stranger"));

        // 解锁后任何人可达
        character.deep_dialogue_unlocked = true;
        assert!(character.is_reachable_by("stranger"));

        // 公开角色任何人可达
        let mut public_character = sample_character(VisibilityStatus::Public);
        public_character.deep_dialogue_unlocked = false;
        assert!(public_character.is_reachable_by("stranger"));
    }

    #[test]
    fn test_record_interaction() {
        let mut character = sample_character(VisibilityStatus::Public);
        let before = character.updated_at;
        character.record_interaction();
        assert_eq!(character.interaction_count, 1);
        assert!(character.updated_at >= before);
    }

    #[test]
    fn test_visibility_is_public() {
        assert!(!VisibilityStatus::Private.is_public());
        assert!(VisibilityStatus::Public.is_public());
        assert!(VisibilityStatus::Synced.is_public());
    }
}
