//! 核心数据模型模块
//!
//! 定义 XwanAI 的核心数据结构：UserRecord, BaziProfile, Character,
//! Conversation, ChatMessage。

pub mod bazi_profile;
pub mod character;
pub mod conversation;
pub mod user;

pub use bazi_profile::*;
pub use character::*;
pub use conversation::*;
pub use user::*;
