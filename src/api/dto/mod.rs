//! DTO 模块
//!
//! 定义各领域的请求和响应数据结构。

pub mod auth_dto;
pub mod character_dto;
pub mod chat_dto;
pub mod profile_dto;
