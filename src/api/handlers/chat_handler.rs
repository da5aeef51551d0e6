use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
    security::auth::AuthUser,
    security::validation::validators,
};

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "User {} sending message to character {}",
        user.id, request.character_id
    );

    validators::validate_chat_message(&request.message)?;

    let exchange = state
        .chat_service
        .send(&user.id, &request.character_id, &request.message)
        .await?;

    Ok(Json(ChatMessageResponse::from(&exchange)))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(character_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Fetching conversation between user {} and character {}",
        user.id, character_id
    );

    let response = match state
        .chat_service
        .get_conversation(&user.id, &character_id)
        .await?
    {
        Some((conversation, messages)) => ConversationResponse::new(&conversation, &messages),
        None => ConversationResponse::empty(&character_id, &user.id),
    };

    Ok(Json(response))
}

pub async fn my_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Listing conversations for user {}", user.id);

    let conversations = state.chat_service.list_conversations(&user.id).await?;

    Ok(Json(ConversationListResponse {
        conversations: conversations.iter().map(Into::into).collect(),
    }))
}
