// End-to-end flow tests against faked upstreams
//
// Supabase (GoTrue + PostgREST) and the generation service are stood up as
// wiremock servers; the full axum router runs in-process. Covers the
// register -> profile -> character -> chat scenario.

use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request as WiremockRequest, Respond, ResponseTemplate};

use xwanai::api::{self, app_state::AppState};
use xwanai::config::config::{GenerationConfig, SupabaseConfig};
use xwanai::llm::create_generation_service;
use xwanai::security::auth::SupabaseAuthProvider;
use xwanai::services::{create_character_service, create_chat_service, create_profile_service};
use xwanai::storage::repository::{
    SupabaseCharacterRepository, SupabaseConversationRepository, SupabaseMessageRepository,
    SupabaseProfileRepository, SupabaseUserRepository,
};
use xwanai::storage::supabase::SupabaseClient;

/// 单表的内存镜像：INSERT 追加、SELECT 返回全部、PATCH 合并进首行
#[derive(Clone, Default)]
struct TableMock {
    rows: Arc<Mutex<Vec<Value>>>,
}

impl TableMock {
    fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }
}

struct InsertResponder(TableMock);

impl Respond for InsertResponder {
    fn respond(&self, request: &WiremockRequest) -> ResponseTemplate {
        let row: Value = serde_json::from_slice(&request.body).unwrap();
        self.0.rows.lock().unwrap().push(row.clone());
        ResponseTemplate::new(201).set_body_json(json!([row]))
    }
}

struct SelectResponder(TableMock);

impl Respond for SelectResponder {
    fn respond(&self, _request: &WiremockRequest) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!(self.0.rows()))
    }
}

struct UpdateResponder(TableMock);

impl Respond for UpdateResponder {
    fn respond(&self, request: &WiremockRequest) -> ResponseTemplate {
        let patch: Value = serde_json::from_slice(&request.body).unwrap();
        let mut rows = self.0.rows.lock().unwrap();
        if let Some(row) = rows.first_mut() {
            if let (Some(row_map), Some(patch_map)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in patch_map {
                    row_map.insert(key.clone(), value.clone());
                }
            }
            let updated = row.clone();
            return ResponseTemplate::new(200).set_body_json(json!([updated]));
        }
        ResponseTemplate::new(200).set_body_json(json!([]))
    }
}

struct DeleteResponder(TableMock);

impl Respond for DeleteResponder {
    fn respond(&self, _request: &WiremockRequest) -> ResponseTemplate {
        let mut rows = self.0.rows.lock().unwrap();
        let deleted: Vec<Value> = rows.drain(..).collect();
        ResponseTemplate::new(200).set_body_json(json!(deleted))
    }
}

struct Upstreams {
    supabase: MockServer,
    openai: MockServer,
    users: TableMock,
    profiles: TableMock,
    characters: TableMock,
    conversations: TableMock,
    messages: TableMock,
}

async fn mount_table(server: &MockServer, table: &str, mock: &TableMock) {
    let table_path = format!("/rest/v1/{}", table);
    Mock::given(method("POST"))
        .and(path(table_path.clone()))
        .respond_with(InsertResponder(mock.clone()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(table_path.clone()))
        .respond_with(SelectResponder(mock.clone()))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(table_path.clone()))
        .respond_with(UpdateResponder(mock.clone()))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(table_path))
        .respond_with(DeleteResponder(mock.clone()))
        .mount(server)
        .await;
}

async fn start_upstreams(reply_text: &str) -> Upstreams {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    let session = json!({
        "access_token": "token-user-1",
        "token_type": "bearer",
        "user": {
            "id": "user-1",
            "email": "tester@example.com",
            "user_metadata": { "username": "tester" },
        },
    });

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session.clone()))
        .mount(&supabase)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session.clone()))
        .mount(&supabase)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session["user"].clone()))
        .mount(&supabase)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": reply_text } }
            ],
        })))
        .mount(&openai)
        .await;

    let upstreams = Upstreams {
        users: TableMock::new(),
        profiles: TableMock::new(),
        characters: TableMock::new(),
        conversations: TableMock::new(),
        messages: TableMock::new(),
        supabase,
        openai,
    };

    mount_table(&upstreams.supabase, "users", &upstreams.users).await;
    mount_table(&upstreams.supabase, "bazi_profiles", &upstreams.profiles).await;
    mount_table(&upstreams.supabase, "characters", &upstreams.characters).await;
    mount_table(&upstreams.supabase, "conversations", &upstreams.conversations).await;
    mount_table(&upstreams.supabase, "chat_messages", &upstreams.messages).await;

    upstreams
}

fn build_router(upstreams: &Upstreams) -> axum::Router {
    let supabase = SupabaseClient::new(SupabaseConfig {
        url: upstreams.supabase.uri(),
        anon_key: "anon-key".into(),
        service_key: "service-key".into(),
        request_timeout: 5,
    })
    .unwrap();

    let generation_config = GenerationConfig {
        api_key: "test-key".into(),
        base_url: format!("{}/v1", upstreams.openai.uri()),
        model: "gpt-3.5-turbo".into(),
        request_timeout: 5,
        max_tokens: 500,
        temperature: 0.9,
    };
    let generation: Arc<dyn xwanai::llm::GenerationService> =
        Arc::from(create_generation_service(generation_config).unwrap());

    let profile_repository = Arc::new(SupabaseProfileRepository::new(supabase.clone()));
    let character_repository = Arc::new(SupabaseCharacterRepository::new(supabase.clone()));
    let conversation_repository = Arc::new(SupabaseConversationRepository::new(supabase.clone()));
    let message_repository = Arc::new(SupabaseMessageRepository::new(supabase.clone()));

    let state = AppState::new(
        supabase.clone(),
        Box::new(SupabaseUserRepository::new(supabase.clone())),
        create_profile_service(profile_repository),
        create_character_service(character_repository.clone(), generation.clone()),
        create_chat_service(
            character_repository,
            conversation_repository,
            message_repository,
            generation,
        ),
        Box::new(SupabaseAuthProvider::new(Arc::new(supabase))),
    );

    api::create_router(state, &[])
}

async fn send_json(
    router: &axum::Router,
    method_name: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method_name).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn full_flow_register_profile_character_chat() {
    let upstreams = start_upstreams("很高兴见到你！今天想聊点什么？").await;
    let router = build_router(&upstreams);

    // 1. 注册
    let (status, token_body) = send_json(
        &router,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "tester@example.com",
            "password": "test-password-123",
            "username": "tester",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = token_body["access_token"].as_str().unwrap().to_string();

    // 2. 创建八字档案 (2000-01-15 14:30 男)
    let (status, profile) = send_json(
        &router,
        "POST",
        "/api/v1/profile/bazi",
        Some(&token),
        Some(json!({
            "birth_year": 2000,
            "birth_month": 1,
            "birth_day": 15,
            "birth_hour": 14,
            "birth_minute": 30,
            "gender": "male",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bazi_string = profile["bazi_string"].as_str().unwrap();
    assert_eq!(bazi_string.split(' ').count(), 4);
    assert_eq!(profile["day_pillar"]["ten_god"], "日主");

    // 3. 创建角色 (1995-03-20 10:00 女)
    let (status, character) = send_json(
        &router,
        "POST",
        "/api/v1/character/create",
        Some(&token),
        Some(json!({
            "character_name": "林若雪",
            "creation_mode": "original",
            "description": "一位来自江南的温柔女子",
            "birth_year": 1995,
            "birth_month": 3,
            "birth_day": 20,
            "birth_hour": 10,
            "birth_minute": 0,
            "gender": "female",
            "visibility_status": "private",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let character_id = character["id"].as_str().unwrap().to_string();
    // 未提供开场白时由生成服务补齐
    assert!(!character["greeting_message"].as_str().unwrap().is_empty());
    assert_eq!(character["deep_dialogue_unlocked"], true);

    // 4. 发送消息
    let (status, exchange) = send_json(
        &router,
        "POST",
        "/api/v1/chat/send",
        Some(&token),
        Some(json!({
            "character_id": character_id,
            "message": "Hello!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exchange["message"], "Hello!");
    assert_eq!(exchange["response"], "很高兴见到你！今天想聊点什么？");

    // 互动计数被写回为 1
    let characters = upstreams.characters.rows();
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0]["interaction_count"], 1);

    // 5. 会话历史包含这轮交换
    let uri = format!("/api/v1/chat/conversation/{}", character_id);
    let (status, conversation) = send_json(&router, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = conversation["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["message"], "Hello!");
}

#[tokio::test]
async fn chat_falls_back_when_generation_fails() {
    let upstreams = start_upstreams("unused").await;

    // 生成服务改挂 500
    upstreams.openai.reset().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstreams.openai)
        .await;

    let router = build_router(&upstreams);

    // 直接创建角色（开场白显式给出，避开生成调用）
    let (status, character) = send_json(
        &router,
        "POST",
        "/api/v1/character/create",
        Some("token-user-1"),
        Some(json!({
            "character_name": "阿土",
            "creation_mode": "concept",
            "birth_year": 1990,
            "birth_month": 6,
            "birth_day": 1,
            "gender": "other",
            "greeting_message": "哈喽。",
            "visibility_status": "public",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let character_id = character["id"].as_str().unwrap().to_string();
    assert_eq!(character["greeting_message"], "哈喽。");

    // 生成失败由固定兜底文案掩盖，请求仍成功
    let (status, exchange) = send_json(
        &router,
        "POST",
        "/api/v1/chat/send",
        Some("token-user-1"),
        Some(json!({
            "character_id": character_id,
            "message": "在吗？",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exchange["response"], "抱歉，我现在有些困惑，能再说一遍吗？");
}

#[tokio::test]
async fn deleting_own_character_makes_it_unreachable() {
    let upstreams = start_upstreams("你好").await;
    let router = build_router(&upstreams);

    let (status, character) = send_json(
        &router,
        "POST",
        "/api/v1/character/create",
        Some("token-user-1"),
        Some(json!({
            "character_name": "短命角色",
            "creation_mode": "original",
            "birth_year": 1980,
            "birth_month": 2,
            "birth_day": 29,
            "gender": "male",
            "greeting_message": "……",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let character_id = character["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/character/{}", character_id);
    let (status, _) = send_json(&router, "DELETE", &uri, Some("token-user-1"), None).await;
    assert_eq!(status, StatusCode::OK);

    // 删除后按 ID 查询报 404
    let (status, _) = send_json(&router, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let upstreams = start_upstreams("你好").await;
    let router = build_router(&upstreams);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "tester@example.com",
            "password": "test-password-123",
            "username": "tester",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 用户镜像行已写入
    assert_eq!(upstreams.users.rows().len(), 1);

    let (status, body) = send_json(
        &router,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": "tester@example.com",
            "password": "test-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user_id"], "user-1");
}
