use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supabase 配置（身份认证 + 数据存储）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupabaseConfig {
    /// 项目地址，例如 https://xyzcompany.supabase.co
    pub url: String,
    /// 匿名密钥（前端级别权限）
    pub anon_key: String,
    /// 服务密钥（服务端行级权限）
    pub service_key: String,
    /// 请求超时（秒）
    pub request_timeout: u64,
}

/// 文本生成服务配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerationConfig {
    /// API 密钥
    pub api_key: String,
    /// API 地址
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 回复最大 Token 数
    pub max_tokens: u32,
    /// 采样温度
    pub temperature: f64,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// CORS 允许的来源
    pub cors_origins: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件路径
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Supabase 配置
    pub supabase: SupabaseConfig,
    /// 文本生成服务配置
    pub generation: GenerationConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// 安全配置
    pub security: SecurityConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            supabase: SupabaseConfig {
                url: "http://localhost:54321".into(),
                anon_key: "dev-anon-key".into(),
                service_key: "dev-service-key".into(),
                request_timeout: 30,
            },
            generation: GenerationConfig {
                api_key: "dev-openai-key".into(),
                base_url: "https://api.openai.com/v1".into(),
                model: "gpt-3.5-turbo".into(),
                request_timeout: 60,
                max_tokens: 500,
                temperature: 0.9,
            },
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8000,
                request_timeout: 30,
                max_request_size: 2 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".into(),
                    "http://127.0.0.1:3000".into(),
                    "http://localhost:3001".into(),
                    "http://127.0.0.1:3001".into(),
                ],
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: true,
                log_dir: Some(PathBuf::from("./logs")),
            },
            app_name: "xwanai".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.security.cors_origins.clear();
        config
    }
}
