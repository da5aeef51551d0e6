use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::profile_dto::*},
    error::AppError,
    security::auth::AuthUser,
    services::profile_manager::NewProfile,
};

pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating BaZi profile for user {}", user.id);

    let new_profile = NewProfile {
        moment: request.birth_moment(),
        birth_location: request.birth_location.clone(),
        longitude: request.longitude,
        latitude: request.latitude,
    };

    let profile = state.profile_service.create(&user.id, new_profile).await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
}

pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Fetching BaZi profile for user {}", user.id);

    let profile = state
        .profile_service
        .get_by_user(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("BaZi profile not found".to_string()))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

pub async fn delete_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Deleting BaZi profile for user {}", user.id);

    state.profile_service.delete_by_user(&user.id).await?;

    Ok(Json(DeleteProfileResponse {
        message: "BaZi profile deleted successfully".to_string(),
    }))
}
