//! 文本生成客户端模块
//!
//! 封装 OpenAI 风格的 chat completions 接口：输入角色标注的消息列表，
//! 返回单条补全文本。无重试、无流式，失败语义由上层决定。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::config::GenerationConfig;
use crate::error::{AppError, Result};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 角色标注消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: Role,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 文本生成服务 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// 发起一次补全调用
    async fn complete(
        &self,
        messages: &[LlmMessage],
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String>;
}

/// OpenAI chat completions 实现
#[derive(Clone)]
pub struct OpenAiCompletion {
    http: reqwest::Client,
    config: GenerationConfig,
}

impl OpenAiCompletion {
    /// 创建新客户端
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let timeout = if config.request_timeout > 0 {
            config.request_timeout
        } else {
            60
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationService for OpenAiCompletion {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Generation service error: {} {}", status, error_text);
            return Err(AppError::Generation(format!(
                "Generation service returned {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse response: {}", e)))?;

        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AppError::Generation("Empty completion".to_string()))?;

        Ok(content.trim().to_string())
    }
}

/// 创建文本生成服务
pub fn create_generation_service(config: GenerationConfig) -> Result<Box<dyn GenerationService>> {
    Ok(Box::new(OpenAiCompletion::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = LlmMessage::system("你是角色扮演助手");
        assert_eq!(msg.role, Role::System);

        let msg = LlmMessage::user("你好");
        assert_eq!(msg.role, Role::User);

        let msg = LlmMessage::assistant("你好呀");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_role_serialization() {
        let msg = LlmMessage::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn test_completions_url() {
        let mut config = GenerationConfig::default();
        config.base_url = "https://api.openai.com/v1/".into();
        config.request_timeout = 5;
        let client = OpenAiCompletion::new(config).unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
