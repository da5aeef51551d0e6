//! 档案 DTO
//!
//! 定义八字档案相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bazi::{BirthMoment, Gender, Pillar};
use crate::models::bazi_profile::BaziProfile;

/// 创建档案请求
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    pub gender: Gender,
    /// 出生地点
    #[serde(default)]
    pub birth_location: Option<String>,
    /// 经度
    #[serde(default)]
    pub longitude: Option<f64>,
    /// 纬度
    #[serde(default)]
    pub latitude: Option<f64>,
    /// 真太阳时修正（当前接受但不生效）
    #[serde(default = "default_true")]
    pub use_true_solar_time: bool,
}

fn default_true() -> bool {
    true
}

impl CreateProfileRequest {
    /// 提取出生时间
    pub fn birth_moment(&self) -> BirthMoment {
        BirthMoment::new(
            self.birth_year,
            self.birth_month,
            self.birth_day,
            self.birth_hour,
            self.birth_minute,
            self.gender,
        )
    }
}

/// 单柱响应
#[derive(Debug, Serialize, Deserialize)]
pub struct PillarResponse {
    /// 天干
    pub stem: String,
    /// 地支
    pub branch: String,
    /// 藏干
    pub hidden_stems: Vec<String>,
    /// 十神
    pub ten_god: String,
}

impl From<&Pillar> for PillarResponse {
    fn from(pillar: &Pillar) -> Self {
        Self {
            stem: pillar.stem.clone(),
            branch: pillar.branch.clone(),
            hidden_stems: pillar.hidden_stems.clone(),
            ten_god: pillar.ten_god.clone(),
        }
    }
}

/// 档案响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// 档案 ID
    pub id: String,
    /// 用户 ID
    pub user_id: String,

    /// === 出生信息 ===
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    pub gender: Gender,

    /// === 四柱 ===
    pub year_pillar: PillarResponse,
    pub month_pillar: PillarResponse,
    pub day_pillar: PillarResponse,
    pub hour_pillar: PillarResponse,

    /// 日主
    pub day_master: String,
    /// 四柱干支组合
    pub bazi_string: String,
    /// 日主五行
    pub primary_element: String,
    /// 性格摘要
    pub personality_summary: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl From<&BaziProfile> for ProfileResponse {
    fn from(profile: &BaziProfile) -> Self {
        Self {
            id: profile.id.clone(),
            user_id: profile.user_id.clone(),
            birth_year: profile.birth_year,
            birth_month: profile.birth_month,
            birth_day: profile.birth_day,
            birth_hour: profile.birth_hour,
            birth_minute: profile.birth_minute,
            gender: profile.gender,
            year_pillar: (&profile.chart.year_pillar).into(),
            month_pillar: (&profile.chart.month_pillar).into(),
            day_pillar: (&profile.chart.day_pillar).into(),
            hour_pillar: (&profile.chart.hour_pillar).into(),
            day_master: profile.chart.day_master.clone(),
            bazi_string: profile.chart.bazi_string.clone(),
            primary_element: profile.chart.primary_element.as_str().to_string(),
            personality_summary: profile.chart.personality_summary.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// 删除档案响应
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteProfileResponse {
    /// 消息
    pub message: String,
}
