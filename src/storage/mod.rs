//! 存储层模块
//!
//! 通过 Supabase REST 接口提供数据持久化服务，外部存储是唯一事实来源。

pub mod repository;
pub mod supabase;

pub use supabase::{SupabaseClient, TableQuery};
