//! Supabase REST 客户端
//!
//! 封装 PostgREST 行级 CRUD 与 GoTrue 认证两组接口。
//! 服务端统一使用 service key 访问数据接口；认证接口按调用方
//! 传入的用户令牌转发，令牌校验完全委托给 Supabase。

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::config::config::SupabaseConfig;
use crate::error::{AppError, Result};

/// PostgREST 查询参数
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 等值过滤：`col = value`
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// 集合过滤：`col IN (…)`
    pub fn any_of(mut self, column: &str, values: &[&str]) -> Self {
        self.filters
            .push((column.to_string(), format!("in.({})", values.join(","))));
        self
    }

    /// 排序，例如 `created_at.desc`
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 拼接查询字符串
    fn to_query_string(&self) -> String {
        let mut parts = vec!["select=*".to_string()];
        for (column, predicate) in &self.filters {
            parts.push(format!(
                "{}={}",
                column,
                urlencoding::encode(predicate).into_owned()
            ));
        }
        if let Some(order) = &self.order {
            parts.push(format!("order={}", order));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset={}", offset));
        }
        parts.join("&")
    }
}

/// Supabase REST 客户端
#[derive(Clone)]
pub struct SupabaseClient {
    /// HTTP 客户端
    http: reqwest::Client,
    /// 连接配置
    config: SupabaseConfig,
}

impl SupabaseClient {
    /// 创建新客户端
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let timeout = if config.request_timeout > 0 {
            config.request_timeout
        } else {
            30
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url.trim_end_matches('/'), path)
    }

    // === PostgREST 数据接口 ===

    /// 插入一行，返回插入后的完整行
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>> {
        let response = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("HTTP request failed: {}", e)))?;

        Self::parse_rows(response).await
    }

    /// 条件查询
    pub async fn select(&self, table: &str, query: &TableQuery) -> Result<Vec<Value>> {
        let url = format!("{}?{}", self.rest_url(table), query.to_query_string());

        tracing::debug!("Executing select: {}", url);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("HTTP request failed: {}", e)))?;

        Self::parse_rows(response).await
    }

    /// 条件计数（通过 Content-Range 响应头）
    pub async fn count(&self, table: &str, query: &TableQuery) -> Result<u64> {
        let url = format!("{}?{}", self.rest_url(table), query.to_query_string());

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| AppError::Database(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!("Supabase error: {}", error_text)));
        }

        // Content-Range: "0-0/42" 或 "*/42"
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(total)
    }

    /// 条件更新，返回更新后的行
    pub async fn update(&self, table: &str, query: &TableQuery, patch: &Value) -> Result<Vec<Value>> {
        let url = format!("{}?{}", self.rest_url(table), query.to_query_string());

        let response = self
            .http
            .patch(&url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("HTTP request failed: {}", e)))?;

        Self::parse_rows(response).await
    }

    /// 条件删除，返回被删除的行
    pub async fn delete(&self, table: &str, query: &TableQuery) -> Result<Vec<Value>> {
        let url = format!("{}?{}", self.rest_url(table), query.to_query_string());

        let response = self
            .http
            .delete(&url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| AppError::Database(format!("HTTP request failed: {}", e)))?;

        Self::parse_rows(response).await
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<Value>> {
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!("Supabase error: {}", error_text)));
        }

        let response_text = response.text().await.unwrap_or_default();
        if response_text.is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&response_text)
            .map_err(|e| AppError::Database(format!("Failed to parse response: {}", e)))
    }

    // === GoTrue 认证接口 ===

    /// 认证接口 POST；令牌缺省时使用匿名密钥
    pub async fn auth_post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .post(self.auth_url(path))
            .header("apikey", &self.config.anon_key);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        } else {
            request = request.json(&serde_json::json!({}));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Auth request failed: {}", e)))?;

        Self::parse_auth_response(response).await
    }

    /// 认证接口 GET（携带用户令牌）
    pub async fn auth_get(&self, path: &str, token: &str) -> Result<Value> {
        let response = self
            .http
            .get(self.auth_url(path))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Auth request failed: {}", e)))?;

        Self::parse_auth_response(response).await
    }

    async fn parse_auth_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            if body.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body)
                .map_err(|e| AppError::Upstream(format!("Failed to parse auth response: {}", e)));
        }

        // GoTrue 将凭证错误报告为 4xx；不向调用方泄露上游详情
        if status.is_client_error() {
            tracing::debug!("Auth provider rejected request: {} {}", status, body);
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        Err(AppError::Upstream(format!("Auth provider error: {}", status)))
    }
}
