//! 路由模块

pub mod auth_routes;
pub mod character_routes;
pub mod chat_routes;
pub mod profile_routes;
