//! 八字排盘模块
//!
//! 将出生时间映射为四柱（年/月/日/时）的天干、地支、藏干与十神，
//! 并派生日主、五行属性与性格摘要。
//!
//! 排盘为简化算法：日柱不按真实历法推算，月柱亦未考虑节气换月，
//! 输出仅用于角色设定，不可用于命理排盘。
//! TODO: 接入真实农历历法与真太阳时修正（需要经纬度）。

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// 天干
pub const HEAVENLY_STEMS: [&str; 10] = [
    "甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸",
];

/// 地支
pub const EARTHLY_BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

/// 十神
///
/// 顺序成对：同五行、我生、我克、克我、生我，每对先同性后异性。
pub const TEN_GODS: [&str; 10] = [
    "比肩", "劫财", "食神", "伤官", "偏财", "正财", "七杀", "正官", "偏印", "正印",
];

/// 日柱天干的固定标记
pub const DAY_MASTER_LABEL: &str = "日主";

/// 地支藏干（简化表）
const HIDDEN_STEMS_MAP: [&[&str]; 12] = [
    &["癸"],             // 子
    &["己", "癸", "辛"], // 丑
    &["甲", "丙", "戊"], // 寅
    &["乙"],             // 卯
    &["戊", "乙", "癸"], // 辰
    &["丙", "戊", "庚"], // 巳
    &["丁", "己"],       // 午
    &["己", "丁", "乙"], // 未
    &["庚", "壬", "戊"], // 申
    &["辛"],             // 酉
    &["戊", "辛", "丁"], // 戌
    &["壬", "甲"],       // 亥
];

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

/// 五行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "水")]
    Water,
}

impl Element {
    /// 按相生顺序的索引（木生火，火生土，土生金，金生水，水生木）
    fn index(self) -> usize {
        match self {
            Element::Wood => 0,
            Element::Fire => 1,
            Element::Earth => 2,
            Element::Metal => 3,
            Element::Water => 4,
        }
    }

    fn from_index(index: usize) -> Self {
        match index % 5 {
            0 => Element::Wood,
            1 => Element::Fire,
            2 => Element::Earth,
            3 => Element::Metal,
            _ => Element::Water,
        }
    }

    /// 天干对应的五行（甲乙木、丙丁火、戊己土、庚辛金、壬癸水）
    pub fn from_stem_index(stem_index: usize) -> Self {
        Self::from_index((stem_index % 10) / 2)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// 按日主五行生成的性格摘要
    pub fn personality_summary(&self) -> &'static str {
        match self {
            Element::Wood => "性格积极上进，富有创造力，善于沟通。像树木一样充满生机，向往自由与成长。",
            Element::Fire => "热情开朗，充满活力，具有领导魅力。像火焰一样照亮他人，富有感染力。",
            Element::Earth => "稳重踏实，值得信赖，具有包容心。像大地一样厚德载物，沉稳可靠。",
            Element::Metal => "果断刚毅，原则性强，追求完美。像金属一样坚硬，有主见且执行力强。",
            Element::Water => "聪慧灵活，适应力强，富有智慧。像水一样灵动，善于变通与思考。",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 出生时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthMoment {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub gender: Gender,
}

impl BirthMoment {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, gender: Gender) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            gender,
        }
    }

    /// 校验出生时间范围
    pub fn validate(&self) -> Result<()> {
        if !(1900..=2100).contains(&self.year) {
            return Err(AppError::Validation(
                "birth_year must be within [1900, 2100]".to_string(),
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(AppError::Validation(
                "birth_month must be within [1, 12]".to_string(),
            ));
        }
        if !(1..=31).contains(&self.day) {
            return Err(AppError::Validation(
                "birth_day must be within [1, 31]".to_string(),
            ));
        }
        if self.hour > 23 {
            return Err(AppError::Validation(
                "birth_hour must be within [0, 23]".to_string(),
            ));
        }
        if self.minute > 59 {
            return Err(AppError::Validation(
                "birth_minute must be within [0, 59]".to_string(),
            ));
        }
        Ok(())
    }
}

/// 单柱：天干、地支、藏干与十神
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    /// 天干
    pub stem: String,
    /// 地支
    pub branch: String,
    /// 藏干
    pub hidden_stems: Vec<String>,
    /// 十神（日柱为「日主」）
    pub ten_god: String,
}

impl Pillar {
    fn new(stem_index: usize, branch_index: usize, ten_god: &str) -> Self {
        Self {
            stem: HEAVENLY_STEMS[stem_index].to_string(),
            branch: EARTHLY_BRANCHES[branch_index].to_string(),
            hidden_stems: HIDDEN_STEMS_MAP[branch_index]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ten_god: ten_god.to_string(),
        }
    }
}

/// 完整命盘
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaziChart {
    pub year_pillar: Pillar,
    pub month_pillar: Pillar,
    pub day_pillar: Pillar,
    pub hour_pillar: Pillar,
    /// 日主（日柱天干）
    pub day_master: String,
    /// 四柱干支组合，如「庚子 戊寅 甲子 辛未」
    pub bazi_string: String,
    /// 日主五行
    pub primary_element: Element,
    /// 性格摘要
    pub personality_summary: String,
}

/// 十神推导
///
/// 由日主天干与目标天干的五行生克关系加阴阳异同确定，十种结果
/// 与 [`TEN_GODS`] 顺序一一对应。
fn ten_god(day_stem_index: usize, stem_index: usize) -> &'static str {
    let day_element = Element::from_stem_index(day_stem_index).index();
    let other_element = Element::from_stem_index(stem_index).index();

    // 0 同我，1 我生，2 我克，3 克我，4 生我
    let relation = (other_element + 5 - day_element) % 5;
    let same_polarity = day_stem_index % 2 == stem_index % 2;

    TEN_GODS[relation * 2 + if same_polarity { 0 } else { 1 }]
}

/// 排盘
///
/// 确定性映射：相同输入产生逐字段相同的命盘。
pub fn compute_chart(moment: &BirthMoment) -> BaziChart {
    let year = moment.year as i64;
    let month = moment.month as i64;
    let day = moment.day as i64;
    let hour = moment.hour as i64;

    // 年柱
    let year_stem = (year - 4).rem_euclid(10) as usize;
    let year_branch = (year - 4).rem_euclid(12) as usize;

    // 月柱（简化：未按节气换月）
    let month_stem = (year_stem as i64 * 2 + month).rem_euclid(10) as usize;
    let month_branch = (month + 1).rem_euclid(12) as usize;

    // 日柱（占位算法，非真实历法）
    let day_stem = (year + month + day).rem_euclid(10) as usize;
    let day_branch = (year + month + day).rem_euclid(12) as usize;

    // 时柱
    let hour_branch = ((hour + 1) / 2).rem_euclid(12) as usize;
    let hour_stem = (day_stem as i64 * 2 + hour_branch as i64).rem_euclid(10) as usize;

    let primary_element = Element::from_stem_index(day_stem);

    let bazi_string = format!(
        "{}{} {}{} {}{} {}{}",
        HEAVENLY_STEMS[year_stem],
        EARTHLY_BRANCHES[year_branch],
        HEAVENLY_STEMS[month_stem],
        EARTHLY_BRANCHES[month_branch],
        HEAVENLY_STEMS[day_stem],
        EARTHLY_BRANCHES[day_branch],
        HEAVENLY_STEMS[hour_stem],
        EARTHLY_BRANCHES[hour_branch],
    );

    BaziChart {
        year_pillar: Pillar::new(year_stem, year_branch, ten_god(day_stem, year_stem)),
        month_pillar: Pillar::new(month_stem, month_branch, ten_god(day_stem, month_stem)),
        day_pillar: Pillar::new(day_stem, day_branch, DAY_MASTER_LABEL),
        hour_pillar: Pillar::new(hour_stem, hour_branch, ten_god(day_stem, hour_stem)),
        day_master: HEAVENLY_STEMS[day_stem].to_string(),
        bazi_string,
        primary_element,
        personality_summary: primary_element.personality_summary().to_string(),
    }
}
