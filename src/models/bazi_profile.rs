//! 用户八字档案数据模型
//!
//! 每位用户最多持有一份档案，保存原始出生信息与排盘结果。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bazi::{BaziChart, BirthMoment, Gender, compute_chart};

/// 用户八字档案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaziProfile {
    /// 档案唯一标识
    pub id: String,

    /// 所属用户标识
    pub user_id: String,

    /// === 出生信息 ===
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub birth_hour: u32,
    pub birth_minute: u32,
    pub gender: Gender,

    /// 出生地点（可选）
    pub birth_location: Option<String>,

    /// 经度（可选，真太阳时修正预留）
    pub longitude: Option<f64>,

    /// 纬度（可选）
    pub latitude: Option<f64>,

    /// === 排盘结果 ===
    pub chart: BaziChart,

    /// === 元数据 ===
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaziProfile {
    /// 由出生时间创建档案（排盘一次）
    pub fn new(user_id: &str, moment: &BirthMoment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            birth_year: moment.year,
            birth_month: moment.month,
            birth_day: moment.day,
            birth_hour: moment.hour,
            birth_minute: moment.minute,
            gender: moment.gender,
            birth_location: None,
            longitude: None,
            latitude: None,
            chart: compute_chart(moment),
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置出生地点信息
    pub fn with_location(
        mut self,
        location: Option<String>,
        longitude: Option<f64>,
        latitude: Option<f64>,
    ) -> Self {
        self.birth_location = location;
        self.longitude = longitude;
        self.latitude = latitude;
        self
    }

    /// 更新最后修改时间
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
