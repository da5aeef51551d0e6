use crate::config::config::{AppConfig, GenerationConfig, SupabaseConfig};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索路径：
    /// 1. ./config.toml
    /// 2. 环境变量
    pub fn load() -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("XWANAI_").split("_").global());

        figment.extract()
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("XWANAI_").split("_").global());

        figment.extract()
    }

    /// 加载 Supabase 配置
    pub fn load_supabase_config() -> Result<SupabaseConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("XWANAI_SUPABASE_").split("_").global());

        figment.extract()
    }

    /// 加载文本生成服务配置
    pub fn load_generation_config() -> Result<GenerationConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("XWANAI_GENERATION_").split("_").global());

        figment.extract()
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.supabase.url.is_empty() {
            return Err(ConfigValidationError::MissingSupabaseUrl);
        }

        if config.generation.model.is_empty() {
            return Err(ConfigValidationError::MissingGenerationModel);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("Supabase 连接 URL 未配置")]
    MissingSupabaseUrl,

    #[error("生成模型名称未配置")]
    MissingGenerationModel,

    #[error("配置路径无效: {0}")]
    InvalidPath(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}
