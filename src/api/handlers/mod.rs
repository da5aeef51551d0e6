//! 处理器模块

pub mod auth_handler;
pub mod character_handler;
pub mod chat_handler;
pub mod profile_handler;
