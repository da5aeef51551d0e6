//! XwanAI - AI 角色创建与互动平台后端
//!
//! 用户注册后由出生时间排出八字档案，创建可对话的 AI 角色，
//! 并通过外部大模型接口与角色进行多轮文本对话。

pub mod api;
pub mod bazi;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;
