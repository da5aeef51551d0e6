use std::sync::Arc;

use crate::security::auth::AuthProvider;
use crate::services::character_manager::CharacterService;
use crate::services::chat::ChatService;
use crate::services::profile_manager::ProfileService;
use crate::storage::repository::UserRepository;
use crate::storage::supabase::SupabaseClient;

/// Application state containing all shared services and collaborators
#[derive(Clone)]
pub struct AppState {
    /// Supabase REST client (store + identity)
    pub supabase: SupabaseClient,
    /// User mirror repository
    pub user_repository: Arc<dyn UserRepository>,
    /// Profile service for BaZi profile business logic
    pub profile_service: Arc<dyn ProfileService>,
    /// Character service for character business logic
    pub character_service: Arc<dyn CharacterService>,
    /// Chat service for conversation orchestration
    pub chat_service: Arc<dyn ChatService>,
    /// Identity provider delegation
    pub auth_provider: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("supabase", &"SupabaseClient")
            .field("user_repository", &"Arc<dyn UserRepository>")
            .field("profile_service", &"Arc<dyn ProfileService>")
            .field("character_service", &"Arc<dyn CharacterService>")
            .field("chat_service", &"Arc<dyn ChatService>")
            .field("auth_provider", &"Arc<dyn AuthProvider>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        supabase: SupabaseClient,
        user_repository: Box<dyn UserRepository>,
        profile_service: Box<dyn ProfileService>,
        character_service: Box<dyn CharacterService>,
        chat_service: Box<dyn ChatService>,
        auth_provider: Box<dyn AuthProvider>,
    ) -> Self {
        Self {
            supabase,
            user_repository: Arc::from(user_repository),
            profile_service: Arc::from(profile_service),
            character_service: Arc::from(character_service),
            chat_service: Arc::from(chat_service),
            auth_provider: Arc::from(auth_provider),
        }
    }
}
