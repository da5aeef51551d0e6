use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, info};

use crate::{
    api::{app_state::AppState, dto::auth_dto::*},
    error::AppError,
    models::user::UserRecord,
    security::auth::{AuthUser, Credentials},
    security::validation::validators,
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Registering new user: {}", request.username);

    let validator = crate::security::validation::RequestValidator::new();
    validator.validate_email("email", &request.email)?;
    validators::validate_password(&request.password)?;
    validators::validate_username(&request.username)?;

    let session = state
        .auth_provider
        .sign_up(&request.email, &request.password, &request.username)
        .await?;

    // 镜像行写入失败不回滚身份服务账号
    let user = UserRecord::new(&session.user.id, &request.email, &request.username);
    state.user_repository.create(&user).await?;

    info!("User registered: {}", session.user.id);
    Ok((StatusCode::CREATED, Json(TokenResponse::from(session))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt: {}", request.email);

    let session = state
        .auth_provider
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse::from(session)))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let credentials = Credentials::from_authorization_header(auth_header);
    let token = credentials.require_bearer()?;

    state.auth_provider.sign_out(token).await?;

    Ok(Json(LogoutResponse {
        message: "Successfully logged out".to_string(),
    }))
}

pub async fn me(Extension(user): Extension<AuthUser>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse::from(user)))
}
