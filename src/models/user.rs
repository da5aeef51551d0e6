//! 用户数据模型
//!
//! 账号本体由外部身份服务托管，此处仅为业务侧的用户镜像行。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户镜像记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// 身份服务下发的用户 ID
    pub id: String,

    /// 邮箱
    pub email: String,

    /// 用户名
    pub username: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// 创建新用户镜像
    pub fn new(id: &str, email: &str, username: &str) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        }
    }
}
