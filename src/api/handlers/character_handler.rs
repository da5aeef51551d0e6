use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::character_dto::*},
    error::AppError,
    security::auth::AuthUser,
    security::validation::{RequestValidator, validators},
    services::character_manager::{CharacterUpdates, NewCharacter, Pagination},
};

#[derive(Debug, Deserialize, Default)]
pub struct ListCharactersParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListCharactersParams {
    /// 解析分页并校验边界：page >= 1, page_size ∈ [1, 100]
    fn pagination(&self) -> Result<Pagination, AppError> {
        let pagination = Pagination::new(self.page.unwrap_or(1), self.page_size.unwrap_or(20));
        RequestValidator::new().validate_pagination(pagination.page, pagination.page_size)?;
        Ok(pagination)
    }
}

pub async fn create_character(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating character '{}' for user {}", request.character_name, user.id);

    validators::validate_character_name(&request.character_name)?;
    if let Some(description) = &request.description {
        RequestValidator::new().validate_length("description", description, None, Some(2000))?;
    }
    if let Some(greeting) = &request.greeting_message {
        RequestValidator::new().validate_length("greeting_message", greeting, None, Some(500))?;
    }

    let new_character = NewCharacter {
        character_name: request.character_name.clone(),
        creation_mode: request.creation_mode,
        description: request.description.clone(),
        moment: request.birth_moment(),
        greeting_message: request.greeting_message.clone(),
        personality_traits: request.personality_traits.clone(),
        tags: request.tags.clone(),
        visibility_status: request.visibility_status,
    };

    let character = state
        .character_service
        .create(&user.id, new_character)
        .await?;

    Ok((StatusCode::CREATED, Json(CharacterResponse::from(&character))))
}

pub async fn my_characters(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListCharactersParams>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Listing characters for user {}: page={:?}, page_size={:?}",
        user.id, params.page, params.page_size
    );

    let pagination = params.pagination()?;
    let (characters, total) = state
        .character_service
        .list_by_creator(&user.id, pagination)
        .await?;

    let response = CharacterListResponse {
        characters: characters.iter().map(CharacterResponse::from).collect(),
        total,
        page: pagination.page,
        page_size: pagination.page_size,
    };

    Ok(Json(response))
}

pub async fn public_characters(
    State(state): State<AppState>,
    Query(params): Query<ListCharactersParams>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Listing public characters: page={:?}, page_size={:?}",
        params.page, params.page_size
    );

    let pagination = params.pagination()?;
    let (characters, total) = state.character_service.list_public(pagination).await?;

    let response = CharacterListResponse {
        characters: characters
            .iter()
            .map(|c| CharacterResponse::from(c).masked_for_public())
            .collect(),
        total,
        page: pagination.page,
        page_size: pagination.page_size,
    };

    Ok(Json(response))
}

pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting character: {}", id);

    let character = state
        .character_service
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Character not found".to_string()))?;

    Ok(Json(CharacterResponse::from(&character)))
}

pub async fn update_character(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCharacterRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Updating character {} by user {}", id, user.id);

    if let Some(name) = &request.character_name {
        validators::validate_character_name(name)?;
    }
    if let Some(description) = &request.description {
        RequestValidator::new().validate_length("description", description, None, Some(2000))?;
    }
    if let Some(greeting) = &request.greeting_message {
        RequestValidator::new().validate_length("greeting_message", greeting, None, Some(500))?;
    }

    let updates = CharacterUpdates {
        character_name: request.character_name,
        description: request.description,
        greeting_message: request.greeting_message,
        personality_traits: request.personality_traits,
        tags: request.tags,
        visibility_status: request.visibility_status,
        avatar_url: request.avatar_url,
    };

    let character = state.character_service.update(&user.id, &id, updates).await?;

    Ok(Json(CharacterResponse::from(&character)))
}

pub async fn delete_character(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Deleting character {} by user {}", id, user.id);

    state.character_service.delete(&user.id, &id).await?;

    Ok(Json(DeleteCharacterResponse {
        id,
        message: "Character deleted successfully".to_string(),
    }))
}
